//! Retry delay strategies and predicates
//!
//! This module computes the wait between attempts and defines the
//! `RetryPredicate` trait that separates transient errors from terminal ones.

use crate::types::{RetryPolicy, RetryStrategy};
use rand::Rng;
use std::fmt::Display;
use std::time::Duration;

/// Calculate the delay to wait after a failed attempt
///
/// `attempt` is the 1-indexed number of the attempt that just failed, so the
/// value returned is the wait before attempt `attempt + 1`.
///
/// # Example
///
/// ```rust
/// use mentora_core::retry::calculate_delay;
/// use mentora_core::types::RetryPolicy;
///
/// let policy = RetryPolicy::linear(3, 1000);
///
/// // wait before attempt 2
/// assert_eq!(calculate_delay(&policy, 1).as_millis(), 1000);
/// // wait before attempt 3
/// assert_eq!(calculate_delay(&policy, 2).as_millis(), 2000);
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let attempt = attempt.max(1);

    let base_delay_ms = match policy.strategy {
        RetryStrategy::None => 0,

        RetryStrategy::FixedDelay => policy.initial_delay_ms,

        RetryStrategy::LinearBackoff => policy.initial_delay_ms.saturating_mul(attempt as u64),

        RetryStrategy::ExponentialBackoff => {
            let multiplier = policy.backoff_multiplier.powf((attempt - 1) as f64);
            // float-to-int casts saturate
            (policy.initial_delay_ms as f64 * multiplier) as u64
        }
    };

    let capped_delay_ms = base_delay_ms.min(policy.max_delay_ms);

    // Up to 25% on top of the capped value
    let final_delay_ms = if policy.jitter && capped_delay_ms > 0 {
        let jitter_range = capped_delay_ms / 4;
        capped_delay_ms + rand::rng().random_range(0..=jitter_range)
    } else {
        capped_delay_ms
    };

    Duration::from_millis(final_delay_ms)
}

/// A predicate that determines whether an error should be retried
///
/// # Example
///
/// ```rust
/// use mentora_core::retry::RetryPredicate;
/// use std::io::{Error, ErrorKind};
///
/// struct NetworkOnly;
///
/// impl RetryPredicate<Error> for NetworkOnly {
///     fn should_retry(&self, error: &Error) -> bool {
///         matches!(
///             error.kind(),
///             ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset | ErrorKind::TimedOut
///         )
///     }
/// }
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given error should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that always returns true (all errors are retryable)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// A predicate that never retries
#[derive(Debug, Clone, Copy)]
pub struct NeverRetry;

impl<E: ?Sized> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// A predicate backed by a closure
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    /// Create a new closure-based predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// Retries errors whose message contains one of the configured fragments
///
/// Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct MessagePredicate {
    retryable_patterns: Vec<String>,
}

impl MessagePredicate {
    /// Create a new message predicate with the given patterns
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            retryable_patterns: patterns
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    /// Create a predicate for common network errors
    pub fn network_errors() -> Self {
        Self::new([
            "timeout",
            "timed out",
            "connection reset",
            "connection refused",
            "network unreachable",
            "temporary failure",
        ])
    }
}

impl<E: Display + ?Sized> RetryPredicate<E> for MessagePredicate {
    fn should_retry(&self, error: &E) -> bool {
        let error_msg = error.to_string().to_lowercase();
        self.retryable_patterns
            .iter()
            .any(|pattern| error_msg.contains(pattern.as_str()))
    }
}
