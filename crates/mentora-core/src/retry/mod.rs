//! Resilient operation executor
//!
//! Wraps a fallible async operation (a database connection, an upload to
//! object storage) with bounded retries, a backoff delay between attempts and
//! an optional reconnect hook.
//!
//! # Features
//!
//! - Strategies: none, fixed, linear (default) and exponential backoff
//! - Optional jitter and a per-policy delay cap
//! - `RetryPredicate` to separate transient errors from terminal ones
//! - Observable attempts via the `RetryObserver` trait, with a built-in
//!   `TracingObserver` for structured logging
//! - Reconnect hook whose failures are logged and never propagated
//!
//! # Example
//!
//! ```rust,no_run
//! use mentora_core::retry::{retry_with_policy, RetryError};
//! use mentora_core::types::RetryPolicy;
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     let policy = RetryPolicy::linear(3, 1000);
//!
//!     retry_with_policy(&policy, || async {
//!         Ok("uploaded".to_string())
//!     }).await
//! }
//! ```

mod error;
mod executor;
mod observer;
mod strategies;

pub use error::RetryError;
pub use executor::{retry_with_policy, RetryExecutor, RetryExecutorBuilder};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use strategies::{
    calculate_delay, AlwaysRetry, ClosurePredicate, MessagePredicate, NeverRetry, RetryPredicate,
};

#[cfg(test)]
mod tests;
