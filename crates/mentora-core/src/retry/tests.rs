//! End-to-end tests for the retry module
//!
//! Timing-sensitive tests run on a paused tokio clock, which auto-advances
//! whenever every task is idle, so multi-second backoffs complete instantly
//! while `Instant::elapsed` still reports the simulated wait.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::retry::error::RetryError;
use crate::retry::executor::{retry_with_policy, RetryExecutorBuilder};
use crate::retry::observer::{RetryObserver, StatsObserver, TracingObserver};
use crate::retry::strategies::{calculate_delay, ClosurePredicate, MessagePredicate, NeverRetry};
use crate::types::{RetryPolicy, RetryStrategy};

/// Records the delay announced for every retried attempt
#[derive(Default)]
struct DelayRecorder {
    delays: Mutex<Vec<Duration>>,
}

impl DelayRecorder {
    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl RetryObserver for DelayRecorder {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn std::fmt::Display, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn std::fmt::Display) {}
}

fn transient() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer")
}

// ============================================================================
// Attempt bounds
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_always_retryable_failure_runs_exactly_max_attempts() {
    for max_attempts in 1..=5 {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::linear(max_attempts, 100);

        let result: Result<(), RetryError<io::Error>> = retry_with_policy(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), max_attempts);
        assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
    }
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_failure_runs_once_regardless_of_budget() {
    for max_attempts in [1, 3, 10] {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(RetryPolicy::linear(max_attempts, 100))
            .with_predicate(NeverRetry)
            .build()
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(io::Error::new(io::ErrorKind::PermissionDenied, "bad credentials")) }
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_non_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.into_source().kind(), io::ErrorKind::PermissionDenied);
    }
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_after_transient_failures_stops_immediately() {
    let calls = Arc::new(AtomicU32::new(0));
    let predicate = ClosurePredicate::new(|err: &io::Error| {
        err.kind() == io::ErrorKind::ConnectionReset
    });

    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy::linear(5, 100))
        .with_predicate(predicate)
        .build()
        .execute(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(transient())
                } else {
                    Err(io::Error::new(io::ErrorKind::InvalidInput, "malformed query"))
                }
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_non_retryable());
    assert_eq!(err.attempts(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_success_on_attempt_k_stops_invoking() {
    for succeed_on in 1..=4u32 {
        let calls = Arc::new(AtomicU32::new(0));

        let result = retry_with_policy(&RetryPolicy::linear(4, 50), || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < succeed_on {
                    Err(transient())
                } else {
                    Ok(call)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), succeed_on);
        assert_eq!(calls.load(Ordering::SeqCst), succeed_on);
    }
}

// ============================================================================
// Backoff timing
// ============================================================================

#[test]
fn test_linear_delays_are_non_decreasing() {
    let policy = RetryPolicy::linear(10, 750);
    let mut previous = Duration::ZERO;

    for failed_attempt in 1..10 {
        let delay = calculate_delay(&policy, failed_attempt);
        // wait before attempt k = base * (k - 1), with k = failed_attempt + 1
        assert_eq!(delay, Duration::from_millis(750 * failed_attempt as u64));
        assert!(delay >= previous);
        previous = delay;
    }
}

#[tokio::test(start_paused = true)]
async fn test_fail_twice_then_succeed_waits_base_plus_double_base() {
    let calls = Arc::new(AtomicU32::new(0));
    let recorder = Arc::new(DelayRecorder::default());
    let start = Instant::now();

    let result = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy::linear(3, 1000))
        .with_observer(recorder.clone())
        .build()
        .execute(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(transient())
                } else {
                    Ok(format!("value from call {}", call))
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "value from call 3");
    assert!(start.elapsed() >= Duration::from_millis(3000));
    assert_eq!(
        recorder.delays(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_error_reports_total_duration() {
    let result: Result<(), RetryError<io::Error>> =
        retry_with_policy(&RetryPolicy::linear(3, 2000), || async { Err(transient()) }).await;

    match result.unwrap_err() {
        RetryError::Exhausted {
            attempts,
            total_duration,
            ..
        } => {
            assert_eq!(attempts, 3);
            // 2s + 4s of backoff
            assert!(total_duration >= Duration::from_secs(6));
        }
        other => panic!("expected exhaustion, got {}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_strategy_none_never_sleeps() {
    let policy = RetryPolicy {
        strategy: RetryStrategy::None,
        ..RetryPolicy::linear(4, 5000)
    };
    let start = Instant::now();

    let result: Result<(), RetryError<io::Error>> =
        retry_with_policy(&policy, || async { Err(transient()) }).await;

    assert_eq!(result.unwrap_err().attempts(), 4);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

// ============================================================================
// Reconnect hook
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reconnect_runs_after_delay_before_next_attempt() {
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let start = Instant::now();

    let result = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy::linear(3, 1000))
        .build()
        .execute_with_reconnect(
            || {
                let events = events.clone();
                async move {
                    let mut events = events.lock().unwrap();
                    let attempt = events.iter().filter(|e| e.starts_with("attempt")).count() + 1;
                    events.push(format!("attempt {}", attempt));
                    if attempt < 3 {
                        Err(transient())
                    } else {
                        Ok(())
                    }
                }
            },
            || {
                let events = events.clone();
                async move {
                    events
                        .lock()
                        .unwrap()
                        .push(format!("reconnect at {}ms", start.elapsed().as_millis()));
                    Ok::<(), io::Error>(())
                }
            },
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "attempt 1".to_string(),
            "reconnect at 1000ms".to_string(),
            "attempt 2".to_string(),
            "reconnect at 3000ms".to_string(),
            "attempt 3".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_not_run_on_first_attempt_success() {
    let reconnects = Arc::new(AtomicU32::new(0));

    let result = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy::linear(3, 1000))
        .build()
        .execute_with_reconnect(
            || async { Ok::<_, io::Error>("ready") },
            || {
                reconnects.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), io::Error>(()) }
            },
        )
        .await;

    assert_eq!(result.unwrap(), "ready");
    assert_eq!(reconnects.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failing_reconnect_does_not_change_outcome() {
    let stats = Arc::new(StatsObserver::new());

    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy::linear(4, 10))
        .with_observer(stats.clone())
        .build()
        .execute_with_reconnect(
            || async { Err(transient()) },
            || async { Err::<(), _>(io::Error::other("disconnect failed")) },
        )
        .await;

    let err = result.unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), 4);
    assert_eq!(stats.attempt_starts(), 4);
    assert_eq!(stats.reconnect_failures(), 3);
}

/// Collects formatted log output
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_reconnect_is_logged_without_an_observer() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let calls = AtomicU32::new(0);
    let result = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy::linear(3, 10))
        .build()
        .execute_with_reconnect(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call < 3 {
                        Err(transient())
                    } else {
                        Ok(call)
                    }
                }
            },
            || async { Err::<(), _>(io::Error::other("socket already closed")) },
        )
        .await;

    assert_eq!(result.unwrap(), 3);
    let output = logs.contents();
    assert_eq!(
        output.matches("reconnect before retry failed").count(),
        2,
        "unexpected log output: {}",
        output
    );
    assert!(output.contains("socket already closed"));
    assert!(output.contains("WARN"));
}

// ============================================================================
// Predicates and observers together
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_message_predicate_with_anyhow_style_strings() {
    let calls = Arc::new(AtomicU32::new(0));

    let result: Result<(), RetryError<String>> = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy::linear(3, 10))
        .with_predicate(MessagePredicate::new(["P1001", "ECONNREFUSED"]))
        .with_observer(TracingObserver::new("db-query"))
        .build()
        .execute(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call == 1 {
                    Err("P1001: can't reach database server".to_string())
                } else {
                    Err("P2002: unique constraint failed".to_string())
                }
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_non_retryable());
    assert_eq!(err.attempts(), 2);
    assert!(err.to_string().contains("P2002"));
}

#[tokio::test]
async fn test_executor_shared_across_tasks() {
    let executor = Arc::new(
        RetryExecutorBuilder::new()
            .with_policy(RetryPolicy::linear(3, 1))
            .with_observer(StatsObserver::new())
            .build(),
    );

    let mut handles = Vec::new();
    for task in 0..8u32 {
        let executor = executor.clone();
        handles.push(tokio::spawn(async move {
            let calls = AtomicU32::new(0);
            executor
                .execute(|| {
                    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if call < 2 {
                            Err(transient())
                        } else {
                            Ok(task)
                        }
                    }
                })
                .await
                .map(|value| (value, calls.load(Ordering::SeqCst)))
        }));
    }

    for (task, handle) in handles.into_iter().enumerate() {
        let (value, calls) = handle.await.unwrap().unwrap();
        assert_eq!(value, task as u32);
        // counters are per call, not per executor
        assert_eq!(calls, 2);
    }
}
