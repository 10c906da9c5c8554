//! Error types for database access

use std::io;
use thiserror::Error;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors raised by a `DatabaseClient` or the supervisor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// Establishing or keeping the connection failed
    #[error("{}", coded(.code, "connection error", .message))]
    Connection {
        code: Option<String>,
        message: String,
    },

    /// A statement reached the server and failed there
    #[error("{}", coded(.code, "query error", .message))]
    Query {
        code: Option<String>,
        message: String,
    },

    /// No live connection is held
    #[error("not connected to the database")]
    NotConnected,

    /// The database URL is not configured
    #[error("database URL is not configured (set DATABASE_URL or database.url)")]
    MissingUrl,

    /// The database URL could not be understood
    #[error("invalid database URL: {0}")]
    InvalidUrl(String),
}

fn coded(code: &Option<String>, kind: &str, message: &str) -> String {
    match code {
        Some(code) => format!("{} [{}]: {}", kind, code, message),
        None => format!("{}: {}", kind, message),
    }
}

impl DbError {
    /// Create a connection error with an optional driver code
    pub fn connection(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Connection {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create a query error with an optional driver code
    pub fn query(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Query {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Map a socket error onto the connection error vocabulary
    ///
    /// Well-known kinds get their errno-style code; anything else raised while
    /// reaching the server is reported as `P1001` (server unreachable).
    pub fn from_io(err: &io::Error, context: &str) -> Self {
        let code = match err.kind() {
            io::ErrorKind::ConnectionRefused => "ECONNREFUSED",
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => "ECONNRESET",
            io::ErrorKind::TimedOut => "ETIMEDOUT",
            io::ErrorKind::BrokenPipe => "EPIPE",
            _ => "P1001",
        };
        Self::connection(Some(code), format!("{}: {}", context, err))
    }

    /// Driver error code, when one is known
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Connection { code, .. } | Self::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Human-readable message without the code prefix
    pub fn message(&self) -> String {
        match self {
            Self::Connection { message, .. } | Self::Query { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
