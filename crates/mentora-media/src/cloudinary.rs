//! Cloudinary-compatible HTTP object store
//!
//! Every request is a multipart POST signed with SHA-256 over the sorted
//! request parameters followed by the API secret.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use mentora_core::types::MediaConfig;

use crate::credentials::Credentials;
use crate::error::{MediaError, Result};
use crate::store::{ObjectStore, UploadRequest, UploadedAsset};

/// Object store speaking the Cloudinary upload API
pub struct CloudinaryStore {
    client: reqwest::Client,
    credentials: Credentials,
    api_base_url: String,
    resource_type: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    bytes: u64,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(credentials: Credentials, config: &MediaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mentora/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            credentials,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            resource_type: config.resource_type.clone(),
        })
    }

    /// Build from config, failing when a credential is missing
    pub fn from_config(config: &MediaConfig) -> Result<Self> {
        Self::new(Credentials::from_config(config)?, config)
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base_url,
            self.credentials.cloud_name(),
            self.resource_type,
            action
        )
    }

    /// Form carrying `params` plus timestamp, api key and signature
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Form {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = sign_params(&params, self.credentials.api_secret());

        let mut form = Form::new();
        for (key, value) in params {
            form = form.text(key, value);
        }
        form.text("api_key", self.credentials.api_key().to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }

    async fn post(&self, action: &str, form: Form) -> Result<reqwest::Response> {
        let url = self.endpoint(action);
        debug!(url = %url, "posting to storage API");

        let response = self.client.post(&url).multipart(form).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(MediaError::Api { status, message })
    }
}

/// Sign request parameters: `sha256("k1=v1&k2=v2..." + secret)`, keys sorted
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    fn name(&self) -> &str {
        "cloudinary"
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadedAsset> {
        let mut file = Part::bytes(request.bytes.clone()).file_name(request.filename.clone());
        if let Some(content_type) = &request.content_type {
            file = file.mime_str(content_type)?;
        }

        let form = self
            .signed_form(vec![("public_id", request.public_id.clone())])
            .part("file", file);

        let uploaded: UploadResponse = self.post("upload", form).await?.json().await?;
        Ok(UploadedAsset {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            bytes: uploaded.bytes,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        let form = self.signed_form(vec![("public_id", public_id.to_string())]);
        let destroyed: DestroyResponse = self.post("destroy", form).await?.json().await?;

        match destroyed.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(MediaError::NotFound {
                public_id: public_id.to_string(),
            }),
            other => Err(MediaError::Api {
                status: 200,
                message: format!("unexpected destroy result '{}'", other),
            }),
        }
    }
}
