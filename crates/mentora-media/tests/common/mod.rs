//! Shared test infrastructure for mentora-media tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mentora_core::types::{MediaConfig, RetryPolicy};
use mentora_media::{
    Credentials, MediaError, ObjectStore, Result, UploadRequest, UploadService, UploadedAsset,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLOUD: &str = "demo";
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(180);

/// What the scripted store does on one upload call
pub enum Step {
    Succeed,
    Fail(MediaError),
    /// Never answer within any reasonable timeout
    Hang,
}

/// Object store replaying scripted steps; succeeds once the script runs out
#[derive(Default)]
pub struct ScriptedStore {
    steps: Mutex<VecDeque<Step>>,
    uploads: AtomicU32,
    deletes: Mutex<Vec<String>>,
    requests: Mutex<Vec<UploadRequest>>,
}

impl ScriptedStore {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            ..Self::default()
        }
    }

    /// Hang on the first `n` uploads
    pub fn hanging(n: usize) -> Self {
        Self::new((0..n).map(|_| Step::Hang).collect())
    }

    pub fn uploads(&self) -> u32 {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<UploadRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ObjectStore for ScriptedStore {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadedAsset> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Succeed);
        match step {
            Step::Succeed => Ok(UploadedAsset {
                url: format!(
                    "https://res.cloudinary.com/{}/image/upload/v1/{}.png",
                    CLOUD, request.public_id
                ),
                public_id: request.public_id.clone(),
                bytes: request.bytes.len() as u64,
            }),
            Step::Fail(err) => Err(err),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(MediaError::Http("woke up".into()))
            }
        }
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Service over a scripted store with the production upload policy
pub fn scripted_service(store: Arc<ScriptedStore>) -> UploadService<Arc<ScriptedStore>> {
    UploadService::new(
        Ok(store),
        RetryPolicy::linear(3, 1000),
        UPLOAD_TIMEOUT,
        "mentora",
    )
}

pub fn media_config(server: &MockServer) -> MediaConfig {
    MediaConfig {
        cloud_name: Some(CLOUD.into()),
        api_key: Some("123456789".into()),
        api_secret: Some("abcd".into()),
        api_base_url: server.uri(),
        ..MediaConfig::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials::new(CLOUD, "123456789", "abcd")
}

pub fn upload_path() -> String {
    format!("/v1_1/{}/image/upload", CLOUD)
}

pub fn destroy_path() -> String {
    format!("/v1_1/{}/image/destroy", CLOUD)
}

/// Mount an upload endpoint answering like the real API
pub async fn mock_upload_success(server: &MockServer, public_id: &str) {
    Mock::given(method("POST"))
        .and(path(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "public_id": public_id,
            "secure_url": format!("https://res.cloudinary.com/{}/image/upload/v1712345678/{}.png", CLOUD, public_id),
            "bytes": 4,
            "format": "png"
        })))
        .mount(server)
        .await;
}

/// Mount an upload endpoint failing with 500 `fail_count` times first
pub async fn mock_flaky_upload(server: &MockServer, fail_count: u64, public_id: &str) {
    Mock::given(method("POST"))
        .and(path(upload_path()))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "message": "Internal Server Error" }
        })))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    mock_upload_success(server, public_id).await;
}

pub async fn mock_destroy(server: &MockServer, result: &str) {
    Mock::given(method("POST"))
        .and(path(destroy_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": result })))
        .mount(server)
        .await;
}
