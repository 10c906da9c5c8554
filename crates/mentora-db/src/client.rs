//! Database client trait

use async_trait::async_trait;

use crate::error::Result;

/// The connection capability of a database driver
///
/// Implementations hold their own connection handle; the supervisor
/// serializes calls to `connect` and `disconnect`.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Open a connection, replacing any existing one
    async fn connect(&self) -> Result<()>;

    /// Close the connection if one is open
    async fn disconnect(&self) -> Result<()>;

    /// Verify that the connection is usable
    async fn ping(&self) -> Result<()>;
}
