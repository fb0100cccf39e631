//! Retry logic with a fixed delay between attempts
//!
//! Every outbound call in the pipeline runs through [`run_with_retry`]. Each
//! attempt's result is classified into an [`AttemptOutcome`]: transient
//! failures (connectivity, timeouts, non-success status) are retried after the
//! configured delay, while malformed responses fail on the first occurrence,
//! since repeating the call will not change what the server sends back.
//!
//! # Example
//!
//! ```no_run
//! use hn_stories::config::RetryConfig;
//! use hn_stories::retry::{IsRetryable, run_with_retry};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() {
//! let config = RetryConfig::default();
//! let cancel = CancellationToken::new();
//! let result = run_with_retry(&config, &cancel, || async {
//!     Ok::<_, MyError>(())
//! })
//! .await;
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use std::fmt::Display;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, server errors) return `true`.
/// Failures in the data itself (undecodable bodies, bad configuration) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Transport failures; decode and builder errors are not transient
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            // The call completed but the server reported a failure
            Error::HttpStatus { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            Error::Decode { .. } => false,
            Error::Config { .. } => false,
            // Already terminal
            Error::RetriesExhausted { .. } => false,
            Error::Cancelled => false,
            Error::Serialization(_) => false,
            Error::ApiServerError(_) => false,
        }
    }
}

/// Classified result of a single attempt
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    /// The operation succeeded
    Success(T),
    /// The operation failed in a way that may succeed on a later attempt
    Retryable(E),
    /// The operation failed in a way that repeating it will not fix
    Fatal(E),
}

impl<T, E: IsRetryable> From<Result<T, E>> for AttemptOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(e) if e.is_retryable() => AttemptOutcome::Retryable(e),
            Err(e) => AttemptOutcome::Fatal(e),
        }
    }
}

/// Why [`run_with_retry`] gave up
#[derive(Debug)]
pub enum RetryError<E> {
    /// `max_attempts` was zero; the operation was never run
    InvalidAttempts,
    /// Every attempt failed with a retryable error
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last: E,
    },
    /// An attempt failed with a non-retryable error
    Fatal(E),
    /// The cancellation token fired before the operation completed
    Cancelled,
}

impl From<RetryError<Error>> for Error {
    fn from(err: RetryError<Error>) -> Self {
        match err {
            RetryError::InvalidAttempts => {
                Error::config("retry.max_attempts", "max_attempts must be at least 1")
            }
            RetryError::Exhausted { attempts, last } => Error::RetriesExhausted {
                attempts,
                source: Box::new(last),
            },
            RetryError::Fatal(e) => e,
            RetryError::Cancelled => Error::Cancelled,
        }
    }
}

/// Execute an async operation, retrying transient failures with a fixed delay
///
/// Runs `operation` up to `config.max_attempts` times in total. Between
/// attempts it sleeps for `config.delay`. Both the in-flight attempt and the
/// sleep are abandoned as soon as `cancel` fires.
///
/// # Returns
///
/// The first successful value, or a [`RetryError`] describing why no attempt
/// succeeded.
pub async fn run_with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + Display,
{
    if config.max_attempts == 0 {
        return Err(RetryError::InvalidAttempts);
    }

    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            result = operation() => result,
        };

        match AttemptOutcome::from(result) {
            AttemptOutcome::Success(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            AttemptOutcome::Fatal(e) => {
                tracing::error!(error = %e, attempt, "Operation failed with non-retryable error");
                return Err(RetryError::Fatal(e));
            }
            AttemptOutcome::Retryable(e) if attempt >= config.max_attempts => {
                tracing::error!(
                    error = %e,
                    attempts = attempt,
                    "Operation failed after all retry attempts exhausted"
                );
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: e,
                });
            }
            AttemptOutcome::Retryable(e) => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = config.delay.as_millis() as u64,
                    "Operation failed, retrying"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(config.delay) => {}
                }

                attempt += 1;
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let config = RetryConfig::default();
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn test_retry_transient_then_succeed() {
        let config = fast_config(3);
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let start = Instant::now();
        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(
            start.elapsed() >= Duration::from_millis(20),
            "two delays should elapse before the third attempt"
        );
    }

    #[tokio::test]
    async fn test_retry_exhausted_counts_total_attempts() {
        let config = fast_config(3);
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted {
                attempts: 3,
                last: TestError::Transient
            })
        ));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "max_attempts counts the first call"
        );
    }

    #[tokio::test]
    async fn test_permanent_error_no_retry() {
        let config = fast_config(5);
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Fatal(TestError::Permanent))));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            1,
            "should not retry permanent error"
        );
    }

    #[tokio::test]
    async fn single_attempt_means_no_retry() {
        let config = fast_config(1);
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let start = Instant::now();
        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(
            start.elapsed() < Duration::from_millis(500),
            "no delay after the only attempt"
        );
    }

    #[tokio::test]
    async fn zero_max_attempts_never_runs_the_operation() {
        let config = fast_config(0);
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(1)
            }
        })
        .await;

        assert!(matches!(result, Err(RetryError::InvalidAttempts)));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let err: Error = RetryError::<Error>::InvalidAttempts.into();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn delays_are_fixed_not_exponential() {
        let config = RetryConfig {
            max_attempts: 4,
            delay: Duration::from_millis(50),
        };
        let cancel = CancellationToken::new();

        let timestamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ts_clone = timestamps.clone();

        let _result = run_with_retry(&config, &cancel, || {
            let ts = ts_clone.clone();
            async move {
                ts.lock().await.push(Instant::now());
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        let ts = timestamps.lock().await;
        assert_eq!(ts.len(), 4);

        // Upper bound is generous to tolerate CI scheduling
        for i in 1..ts.len() {
            let gap = ts[i].duration_since(ts[i - 1]);
            assert!(
                gap >= Duration::from_millis(45),
                "gap {i} was {gap:?}, shorter than the configured delay"
            );
            assert!(
                gap < Duration::from_millis(300),
                "gap {i} was {gap:?}, delays should not grow"
            );
        }
    }

    #[tokio::test]
    async fn cancellation_interrupts_retry_delay() {
        let config = RetryConfig {
            max_attempts: 5,
            delay: Duration::from_secs(30),
        };
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "cancellation should cut the 30s delay short"
        );
    }

    #[tokio::test]
    async fn cancellation_interrupts_in_flight_attempt() {
        let config = fast_config(3);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = run_with_retry(&config, &cancel, || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, TestError>(1)
        })
        .await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_the_operation() {
        let config = fast_config(3);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(&config, &cancel, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(1)
            }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn http_status_is_retryable() {
        let err = Error::HttpStatus {
            status: 503,
            url: "http://upstream".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn decode_error_is_not_retryable() {
        let err = Error::Decode {
            url: "http://upstream".into(),
            source: serde_json::from_str::<Vec<u64>>("{").unwrap_err(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_connection_errors_are_retryable() {
        for kind in [
            std::io::ErrorKind::TimedOut,
            std::io::ErrorKind::ConnectionRefused,
            std::io::ErrorKind::ConnectionReset,
        ] {
            let err = Error::Io(std::io::Error::new(kind, "io"));
            assert!(err.is_retryable(), "{kind:?} should be retryable");
        }

        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn terminal_errors_are_not_retryable() {
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::config("retry.max_attempts", "bad").is_retryable());
        assert!(
            !Error::RetriesExhausted {
                attempts: 3,
                source: Box::new(Error::HttpStatus {
                    status: 500,
                    url: "http://upstream".into(),
                }),
            }
            .is_retryable()
        );
    }

    #[test]
    fn outcome_classification() {
        let ok: AttemptOutcome<i32, TestError> = Ok(1).into();
        assert!(matches!(ok, AttemptOutcome::Success(1)));

        let transient: AttemptOutcome<i32, TestError> = Err(TestError::Transient).into();
        assert!(matches!(transient, AttemptOutcome::Retryable(_)));

        let permanent: AttemptOutcome<i32, TestError> = Err(TestError::Permanent).into();
        assert!(matches!(permanent, AttemptOutcome::Fatal(_)));
    }
}
