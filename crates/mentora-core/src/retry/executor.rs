//! Retry execution engine
//!
//! Runs a caller-supplied async operation under a `RetryPolicy`, asking a
//! `RetryPredicate` whether each failure is transient and reporting every
//! transition to a `RetryObserver`. An optional reconnect hook runs between
//! attempts.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::{Future, Ready};

use tokio::time::Instant;

use crate::types::RetryPolicy;

use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};
use super::strategies::{calculate_delay, AlwaysRetry, RetryPredicate};

/// Reconnect hook type used when the caller supplies none
type NoReconnect = fn() -> Ready<Result<(), Infallible>>;

/// Execute an async operation, retrying every error under `policy`
///
/// Shorthand for an executor with `AlwaysRetry` and no observer. Use
/// `RetryExecutorBuilder` for anything more specific.
///
/// # Example
///
/// ```rust,no_run
/// use mentora_core::retry::retry_with_policy;
/// use mentora_core::types::RetryPolicy;
///
/// async fn example() {
///     let policy = RetryPolicy::linear(3, 1000);
///
///     let result = retry_with_policy(&policy, || async {
///         Ok::<_, std::io::Error>("connected")
///     })
///     .await;
/// }
/// ```
pub async fn retry_with_policy<F, Fut, T, E>(policy: &RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryExecutorBuilder::new()
        .with_policy(policy.clone())
        .build()
        .execute(op)
        .await
}

/// Builder for configuring a `RetryExecutor`
///
/// # Example
///
/// ```rust
/// use mentora_core::retry::{MessagePredicate, RetryExecutorBuilder, TracingObserver};
/// use mentora_core::types::RetryPolicy;
///
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::linear(3, 2000))
///     .with_predicate(MessagePredicate::network_errors())
///     .with_observer(TracingObserver::new("db-query"))
///     .build();
/// ```
pub struct RetryExecutorBuilder<P = AlwaysRetry, O = NoOpObserver> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
}

impl Default for RetryExecutorBuilder<AlwaysRetry, NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<AlwaysRetry, NoOpObserver> {
    /// Create a new builder: default policy, retry everything, observe nothing
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            predicate: AlwaysRetry,
            observer: NoOpObserver,
        }
    }
}

impl<P, O> RetryExecutorBuilder<P, O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the predicate deciding which errors are retried
    pub fn with_predicate<P2>(self, predicate: P2) -> RetryExecutorBuilder<P2, O> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate,
            observer: self.observer,
        }
    }

    /// Set the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<P, O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate: self.predicate,
            observer,
        }
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<P, O> {
        RetryExecutor {
            policy: self.policy,
            predicate: self.predicate,
            observer: self.observer,
        }
    }
}

/// A retry executor with configurable policy, predicate, and observer
///
/// The executor keeps no per-call state, so one instance can serve many
/// concurrent callers.
pub struct RetryExecutor<P, O> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
}

impl<P, O> RetryExecutor<P, O>
where
    O: RetryObserver,
{
    /// The policy this executor runs under
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: RetryPredicate<E>,
    {
        self.run(op, None::<NoReconnect>).await
    }

    /// Execute an operation, running `reconnect` before every retry
    ///
    /// The hook runs after the backoff delay and before the next attempt.
    /// Its failures are logged at WARN, reported to the observer, and
    /// otherwise ignored.
    pub async fn execute_with_reconnect<F, Fut, T, E, H, HFut, HE>(
        &self,
        op: F,
        reconnect: H,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: RetryPredicate<E>,
        H: FnMut() -> HFut,
        HFut: Future<Output = Result<(), HE>>,
        HE: Display,
    {
        self.run(op, Some(reconnect)).await
    }

    async fn run<F, Fut, T, E, H, HFut, HE>(
        &self,
        mut op: F,
        mut reconnect: Option<H>,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: RetryPredicate<E>,
        H: FnMut() -> HFut,
        HFut: Future<Output = Result<(), HE>>,
        HE: Display,
    {
        let start = Instant::now();
        // A zero in the policy still means one attempt
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.observer.on_attempt_start(attempt, max_attempts);

            let err = match op().await {
                Ok(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !self.predicate.should_retry(&err) {
                self.observer.on_non_retryable(attempt, &err);
                return Err(RetryError::non_retryable(attempt, err));
            }

            if attempt >= max_attempts {
                self.observer.on_exhausted(attempt, &err);
                return Err(RetryError::exhausted(attempt, err, start.elapsed()));
            }

            let delay = calculate_delay(&self.policy, attempt);
            self.observer.on_attempt_failed(attempt, &err, delay);
            drop(err);

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            attempt += 1;

            if let Some(hook) = reconnect.as_mut() {
                if let Err(hook_err) = hook().await {
                    tracing::warn!(
                        next_attempt = attempt,
                        error = %hook_err,
                        "reconnect before retry failed, retrying anyway"
                    );
                    self.observer.on_reconnect_failed(attempt, &hook_err);
                }
            }
        }
    }
}
