//! TCP reachability client
//!
//! Treats "a TCP session to the database server is open and has not been
//! closed by the peer" as a usable connection. Suitable for startup checks
//! and health checks where no driver is linked in.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use mentora_core::types::DatabaseConfig;

use crate::client::DatabaseClient;
use crate::error::{DbError, Result};

/// `DatabaseClient` backed by a bare TCP connection
#[derive(Debug)]
pub struct TcpCheckClient {
    host: String,
    port: u16,
    connect_timeout: Duration,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpCheckClient {
    /// Create a client for the server named in `url`
    pub fn from_url(url: &str, connect_timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| DbError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DbError::InvalidUrl(format!("no host in '{}'", parsed.scheme())))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();

        let port = match parsed.port() {
            Some(port) => port,
            None => default_port(parsed.scheme()).ok_or_else(|| {
                DbError::InvalidUrl(format!(
                    "no port given and no default known for scheme '{}'",
                    parsed.scheme()
                ))
            })?,
        };

        Ok(Self {
            host,
            port,
            connect_timeout,
            stream: Mutex::new(None),
        })
    }

    /// Create a client from the database section of the runtime config
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or(DbError::MissingUrl)?;
        Self::from_url(url, Duration::from_secs(config.connect_timeout_secs))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "postgres" | "postgresql" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "sqlserver" | "mssql" => Some(1433),
        "mongodb" => Some(27017),
        "redis" => Some(6379),
        _ => None,
    }
}

#[async_trait]
impl DatabaseClient for TcpCheckClient {
    fn name(&self) -> &str {
        "tcp-check"
    }

    async fn connect(&self) -> Result<()> {
        let address = self.address();
        debug!(address = %address, "opening database connection");

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(address.as_str()))
            .await
            .map_err(|_| {
                DbError::connection(
                    Some("ETIMEDOUT"),
                    format!(
                        "timed out after {}s connecting to {}",
                        self.connect_timeout.as_secs(),
                        address
                    ),
                )
            })?
            .map_err(|e| DbError::from_io(&e, &format!("connect to {}", address)))?;

        *self.stream.lock().await = Some(stream);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let Some(mut stream) = self.stream.lock().await.take() else {
            return Ok(());
        };
        debug!(address = %self.address(), "closing database connection");

        match stream.shutdown().await {
            Ok(()) => Ok(()),
            // already torn down by the peer
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(DbError::from_io(&e, "disconnect")),
        }
    }

    async fn ping(&self) -> Result<()> {
        let mut guard = self.stream.lock().await;
        let stream = guard.as_ref().ok_or(DbError::NotConnected)?;

        let mut peek = [0u8; 1];
        match stream.try_read(&mut peek) {
            Ok(0) => {
                guard.take();
                Err(DbError::connection(
                    Some("P1017"),
                    format!("server at {} closed the connection", self.address()),
                ))
            }
            // Data or nothing to read yet: the session is still open
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => {
                guard.take();
                Err(DbError::from_io(&e, "ping"))
            }
        }
    }
}
