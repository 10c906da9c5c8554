//! Connection supervision
//!
//! Startup: try to connect under the `db-startup` policy; when every attempt
//! fails, log and carry on so the first real request reconnects lazily.
//!
//! Requests: `execute` connects on demand, runs the caller's operation under
//! the `db-query` policy, and between attempts drops and re-opens the
//! connection.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use mentora_core::retry::{RetryError, RetryExecutor, RetryExecutorBuilder, TracingObserver};
use mentora_core::types::{policy_names, RetryPolicy, RuntimeConfig};

use crate::client::DatabaseClient;
use crate::error::{DbError, Result};
use crate::predicate::TransientCodePredicate;

/// Result of the startup connection routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    /// Connected and verified
    Connected { attempts: u32 },
    /// Gave up for now; the next `execute` call will try again
    Deferred { attempts: u32, last_error: DbError },
}

impl StartupOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, StartupOutcome::Connected { .. })
    }
}

type Executor = RetryExecutor<TransientCodePredicate, TracingObserver>;

/// Owns the shared connection of a `DatabaseClient`
pub struct ConnectionSupervisor<C> {
    client: Arc<C>,
    /// Guards connect/disconnect; `true` while a verified connection is held
    connected: Mutex<bool>,
    startup: Executor,
    query: Executor,
}

impl<C: DatabaseClient> ConnectionSupervisor<C> {
    pub fn new(
        client: C,
        predicate: TransientCodePredicate,
        startup_policy: RetryPolicy,
        query_policy: RetryPolicy,
    ) -> Self {
        let build = |policy: RetryPolicy, operation: &str| {
            RetryExecutorBuilder::new()
                .with_policy(policy)
                .with_predicate(predicate.clone())
                .with_observer(TracingObserver::new(operation))
                .build()
        };

        Self {
            startup: build(startup_policy, policy_names::DB_STARTUP),
            query: build(query_policy, policy_names::DB_QUERY),
            client: Arc::new(client),
            connected: Mutex::new(false),
        }
    }

    /// Build with the named policies and transient codes from runtime config
    pub fn from_config(client: C, config: &RuntimeConfig) -> Self {
        Self::new(
            client,
            TransientCodePredicate::from_config(&config.database),
            config.retry_policies.policy_for(policy_names::DB_STARTUP),
            config.retry_policies.policy_for(policy_names::DB_QUERY),
        )
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Whether a verified connection is currently held
    pub async fn is_connected(&self) -> bool {
        *self.connected.lock().await
    }

    /// Connect at process startup without ever failing the caller
    pub async fn connect_on_startup(&self) -> StartupOutcome {
        let calls = AtomicU32::new(0);
        let result = self
            .startup
            .execute_with_reconnect(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    self.connect_and_verify()
                },
                || self.drop_connection(),
            )
            .await;

        match result {
            Ok(()) => {
                let attempts = calls.load(Ordering::SeqCst);
                info!(client = self.client.name(), attempts, "database connection established");
                StartupOutcome::Connected { attempts }
            }
            Err(err) => {
                let attempts = err.attempts();
                warn!(
                    client = self.client.name(),
                    attempts,
                    error = %err,
                    "database unavailable at startup, will reconnect on first request"
                );
                StartupOutcome::Deferred {
                    attempts,
                    last_error: err.into_source(),
                }
            }
        }
    }

    /// Run a database operation with lazy connect and transient-error retry
    ///
    /// `op` is called once per attempt with the shared client; the future it
    /// returns runs only after a connection has been established.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> std::result::Result<T, RetryError<DbError>>
    where
        F: FnMut(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.query
            .execute_with_reconnect(
                || {
                    let attempt = op(self.client.clone());
                    async move {
                        self.ensure_connected().await?;
                        attempt.await
                    }
                },
                || self.reconnect(),
            )
            .await
    }

    /// Verify the connection through the retry wrapper
    pub async fn health_check(&self) -> std::result::Result<(), RetryError<DbError>> {
        self.execute(|client| async move { client.ping().await }).await
    }

    /// Close the connection
    pub async fn shutdown(&self) -> Result<()> {
        let mut connected = self.connected.lock().await;
        *connected = false;
        self.client.disconnect().await
    }

    async fn connect_and_verify(&self) -> Result<()> {
        let mut connected = self.connected.lock().await;
        self.open_verified(&mut connected).await
    }

    async fn ensure_connected(&self) -> Result<()> {
        let mut connected = self.connected.lock().await;
        if *connected {
            return Ok(());
        }

        debug!(client = self.client.name(), "no live connection, connecting");
        self.open_verified(&mut connected).await
    }

    async fn drop_connection(&self) -> Result<()> {
        let mut connected = self.connected.lock().await;
        *connected = false;
        self.client.disconnect().await
    }

    /// Disconnect, then connect again; run between query attempts
    async fn reconnect(&self) -> Result<()> {
        let mut connected = self.connected.lock().await;
        *connected = false;

        if let Err(err) = self.client.disconnect().await {
            debug!(error = %err, "disconnect before reconnect failed");
        }
        self.open_verified(&mut connected).await
    }

    /// Connect and ping, leaving no half-open connection behind on failure
    ///
    /// Callers hold the `connected` lock.
    async fn open_verified(&self, connected: &mut bool) -> Result<()> {
        self.client.connect().await?;
        if let Err(err) = self.client.ping().await {
            if let Err(close_err) = self.client.disconnect().await {
                debug!(error = %close_err, "closing unverified connection failed");
            }
            return Err(err);
        }
        *connected = true;
        Ok(())
    }
}
