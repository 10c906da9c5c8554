//! Object store abstraction

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// A file to store under a chosen public id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Id the object is stored under, folder included (`mentora/7f3c...`)
    pub public_id: String,
    /// Original file name, sent along with the bytes
    pub filename: String,
    /// MIME type, when known
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Public delivery URL
    pub url: String,
    pub public_id: String,
    /// Stored size in bytes
    pub bytes: u64,
}

/// Remote storage backend
///
/// Implementations perform exactly one request per call; timeouts and
/// retries belong to `UploadService`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Store the request's bytes and return the public locator
    async fn upload(&self, request: &UploadRequest) -> Result<UploadedAsset>;

    /// Remove a stored object by public id
    async fn delete(&self, public_id: &str) -> Result<()>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadedAsset> {
        (**self).upload(request).await
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        (**self).delete(public_id).await
    }
}
