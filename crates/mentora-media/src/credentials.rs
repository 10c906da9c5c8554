//! Storage account credentials

use std::fmt;

use mentora_core::types::MediaConfig;

use crate::error::{MediaError, Result};

/// Account name and signing key pair for the object store
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Read credentials from config, naming the first one that is missing
    ///
    /// Blank values count as missing.
    pub fn from_config(config: &MediaConfig) -> Result<Self> {
        Ok(Self {
            cloud_name: required(&config.cloud_name, "cloud-name")?,
            api_key: required(&config.api_key, "api-key")?,
            api_secret: required(&config.api_secret, "api-secret")?,
        })
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(MediaError::MissingCredential { field }),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}
