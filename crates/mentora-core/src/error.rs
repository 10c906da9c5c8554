//! Error types for mentora-core

use thiserror::Error;

/// Result type alias using mentora-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Mentora
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value or format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A retry policy failed validation
    #[error("Invalid retry policy '{name}': {reason}")]
    InvalidRetryPolicy { name: String, reason: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid retry policy error
    pub fn invalid_retry_policy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRetryPolicy {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
