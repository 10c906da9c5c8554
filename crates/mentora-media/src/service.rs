//! Upload service
//!
//! Each upload attempt races the store against a timeout. Every failure,
//! timeouts included, is retried under the `media-upload` policy. When the
//! attempts run out, the caller gets `UploadFailed` with the attempt count.
//!
//! A service built without credentials stays usable as a value but fails every
//! call with the construction error, without touching the store.

use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use mentora_core::retry::{AlwaysRetry, RetryError, RetryExecutor, RetryExecutorBuilder, TracingObserver};
use mentora_core::types::{policy_names, RetryPolicy, RuntimeConfig};

use crate::cloudinary::CloudinaryStore;
use crate::error::{MediaError, Result};
use crate::locator::public_id_from_url;
use crate::store::{ObjectStore, UploadRequest, UploadedAsset};

/// Per-upload options
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Original file name; defaults to the generated id
    pub filename: Option<String>,
    /// Folder override; defaults to the configured folder
    pub folder: Option<String>,
    pub content_type: Option<String>,
}

pub struct UploadService<S> {
    store: std::result::Result<S, MediaError>,
    executor: RetryExecutor<AlwaysRetry, TracingObserver>,
    timeout: Duration,
    default_folder: String,
}

impl<S: ObjectStore> UploadService<S> {
    /// Wrap a store, or the error that prevented building one
    pub fn new(
        store: std::result::Result<S, MediaError>,
        policy: RetryPolicy,
        timeout: Duration,
        default_folder: impl Into<String>,
    ) -> Self {
        if let Err(err) = &store {
            warn!(error = %err, "media uploads disabled");
        }

        Self {
            store,
            executor: RetryExecutorBuilder::new()
                .with_policy(policy)
                .with_observer(TracingObserver::new(policy_names::MEDIA_UPLOAD))
                .build(),
            timeout,
            default_folder: default_folder.into(),
        }
    }

    /// Whether the service has a usable store
    pub fn is_configured(&self) -> bool {
        self.store.is_ok()
    }

    fn store(&self) -> Result<&S> {
        self.store.as_ref().map_err(Clone::clone)
    }

    /// Upload `bytes` under a fresh public id and return the stored asset
    pub async fn upload(&self, bytes: Vec<u8>, options: UploadOptions) -> Result<UploadedAsset> {
        let store = self.store()?;

        let id = Uuid::new_v4().to_string();
        let folder = options
            .folder
            .as_deref()
            .unwrap_or(&self.default_folder)
            .trim_matches('/');
        let public_id = if folder.is_empty() {
            id.clone()
        } else {
            format!("{}/{}", folder, id)
        };

        let request = UploadRequest {
            public_id,
            filename: options.filename.unwrap_or(id),
            content_type: options.content_type,
            bytes,
        };

        let request = &request;
        let timeout = self.timeout;
        let result = self
            .executor
            .execute(|| async move {
                match tokio::time::timeout(timeout, store.upload(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(MediaError::Timeout { after: timeout }),
                }
            })
            .await;

        match result {
            Ok(asset) => {
                info!(store = store.name(), public_id = %asset.public_id, bytes = asset.bytes, "upload complete");
                Ok(asset)
            }
            Err(RetryError::Exhausted {
                attempts, source, ..
            }) => Err(MediaError::UploadFailed {
                attempts,
                message: source.to_string(),
            }),
            Err(err) => Err(err.into_source()),
        }
    }

    /// Delete the object behind a delivery URL
    ///
    /// Single attempt; a missing object surfaces as `NotFound`.
    pub async fn delete(&self, locator: &str) -> Result<()> {
        let store = self.store()?;
        let public_id = public_id_from_url(locator)?;

        store.delete(&public_id).await?;
        info!(store = store.name(), public_id = %public_id, "deleted stored object");
        Ok(())
    }
}

impl UploadService<CloudinaryStore> {
    /// Build from runtime config; missing credentials disable the service
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(
            CloudinaryStore::from_config(&config.media),
            config.retry_policies.policy_for(policy_names::MEDIA_UPLOAD),
            Duration::from_secs(config.media.upload_timeout_secs),
            config.media.default_folder.clone(),
        )
    }
}
