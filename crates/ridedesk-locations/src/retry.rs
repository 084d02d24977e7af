//! Retry with exponential back-off and jitter for backend requests.
//!
//! Only transient failures are retried: timeouts, connect errors, HTTP 429
//! and 5xx. Everything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

pub(crate) fn is_retriable(err: &SourceError) -> bool {
    match err {
        SourceError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SourceError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        SourceError::Deserialize { .. }
        | SourceError::InvalidBaseUrl { .. }
        | SourceError::Fixture(_) => false,
    }
}

/// How often and how patiently a location request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_ms: u64,
}

impl RetryPolicy {
    const MAX_DELAY_MS: u64 = 30_000;

    pub(crate) const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Delay before retry `attempt` (1-based): `backoff_base_ms × 2ⁿ⁻¹`,
    /// capped at 30 s, with ±25 % jitter.
    pub(crate) fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        let capped = self
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(Self::MAX_DELAY_MS);
        let jitter = rand::random::<f64>() * 0.5 + 0.75;
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let delay_ms = (capped as f64 * jitter) as u64;
        Duration::from_millis(delay_ms)
    }

    /// Runs the request for `endpoint`, retrying transient failures up to
    /// `max_retries` more times.
    pub(crate) async fn run<T, F, Fut>(
        &self,
        endpoint: &str,
        mut request: F,
    ) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match request().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !is_retriable(&err) || attempt >= self.max_retries {
                if attempt > 0 {
                    tracing::warn!(
                        endpoint,
                        attempts = attempt + 1,
                        error = %err,
                        "giving up on location endpoint"
                    );
                }
                return Err(err);
            }
            attempt += 1;
            let delay = self.delay_for(attempt);
            tracing::warn!(
                endpoint,
                attempt,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "location endpoint failed transiently, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn status_err(status: u16) -> SourceError {
        SourceError::UnexpectedStatus {
            status,
            url: "http://backend.test/states".to_owned(),
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base_ms: 0,
        }
    }

    #[test]
    fn delay_doubles_per_attempt_within_jitter() {
        let policy = RetryPolicy {
            max_retries: 5,
            backoff_base_ms: 100,
        };
        let first = policy.delay_for(1).as_millis();
        assert!((75..=125).contains(&first), "first delay {first}ms");
        let third = policy.delay_for(3).as_millis();
        assert!((300..=500).contains(&third), "third delay {third}ms");
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy {
            max_retries: 50,
            backoff_base_ms: 10_000,
        };
        assert!(policy.delay_for(40) <= Duration::from_millis(37_500));
        assert_eq!(RetryPolicy::none().delay_for(1), Duration::ZERO);
    }

    #[test]
    fn server_errors_and_throttling_are_retriable() {
        assert!(is_retriable(&status_err(503)));
        assert!(is_retriable(&status_err(429)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&status_err(404)));
        assert!(!is_retriable(&status_err(401)));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&SourceError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = policy(3).run("/states", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, SourceError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = policy(3).run("/states", || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(status_err(502))
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = policy(2).run("/states/s1/cities", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status_err(500))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(SourceError::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = policy(3).run("/states", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status_err(404))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "404 must not be retried");
        assert!(result.is_err());
    }
}
