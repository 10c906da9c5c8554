//! Error types for media storage

use std::time::Duration;
use thiserror::Error;

/// Result type alias for media operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Errors raised by the upload service and object stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// A storage credential is not configured
    #[error("media storage is not configured: missing {field}")]
    MissingCredential { field: &'static str },

    /// A single storage request exceeded its time limit
    #[error("storage request timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    /// Every upload attempt failed
    #[error("upload failed after {attempts} attempts: {message}")]
    UploadFailed { attempts: u32, message: String },

    /// The request could not be sent or its response not read
    #[error("storage request failed: {0}")]
    Http(String),

    /// The storage API answered with an error
    #[error("storage API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The object to delete does not exist
    #[error("no stored object with id '{public_id}'")]
    NotFound { public_id: String },

    /// A delivery URL did not name a stored object
    #[error("invalid media locator '{0}'")]
    InvalidLocator(String),
}

impl MediaError {
    /// Whether this is a configuration problem rather than a storage failure
    pub fn is_configuration(&self) -> bool {
        matches!(self, MediaError::MissingCredential { .. })
    }
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        MediaError::Http(err.to_string())
    }
}
