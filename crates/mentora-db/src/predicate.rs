//! Transient error classification

use mentora_core::retry::RetryPredicate;
use mentora_core::types::DatabaseConfig;

use crate::error::DbError;

/// Treats errors carrying a known transient code as retryable
///
/// A code matches when it equals the error's driver code, or when it appears
/// in the error message (drivers often only embed `ECONNRESET` and friends in
/// their text). `NotConnected` is always transient; URL problems never are.
#[derive(Debug, Clone)]
pub struct TransientCodePredicate {
    codes: Vec<String>,
}

impl TransientCodePredicate {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| c.into().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Build from the configured transient code list
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(config.transient_codes.iter().cloned())
    }

    /// Configured codes, upper-cased
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_transient(&self, error: &DbError) -> bool {
        match error {
            DbError::NotConnected => true,
            DbError::MissingUrl | DbError::InvalidUrl(_) => false,
            DbError::Connection { code, message } | DbError::Query { code, message } => {
                if let Some(code) = code {
                    if self.codes.iter().any(|c| c.eq_ignore_ascii_case(code)) {
                        return true;
                    }
                }
                let message = message.to_ascii_uppercase();
                self.codes.iter().any(|c| message.contains(c.as_str()))
            }
        }
    }
}

impl RetryPredicate<DbError> for TransientCodePredicate {
    fn should_retry(&self, error: &DbError) -> bool {
        self.is_transient(error)
    }
}
