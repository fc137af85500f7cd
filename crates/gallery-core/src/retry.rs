//! Retry with timeout and exponential backoff for remote service calls.

use std::future::Future;
use std::time::Duration;

use crate::config::VisionConfig;
use crate::error::ServiceError;

/// Timeout and retry settings for one service.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first attempt
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl From<&VisionConfig> for RetryPolicy {
    fn from(config: &VisionConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            retry_attempts: config.retry_attempts,
            retry_delay_ms: config.retry_delay_ms,
        }
    }
}

/// Determine whether a service error is worth retrying.
///
/// Retryable errors: timeouts, rate limits (429), server errors (5xx).
/// Non-retryable: auth failures, bad requests, unparseable responses.
pub fn is_retryable(error: &ServiceError) -> bool {
    match error {
        ServiceError::Timeout { .. } => true,
        ServiceError::Request {
            status_code,
            message,
            ..
        } => {
            if let Some(code) = status_code {
                return *code == 429 || (500..=599).contains(code);
            }
            // No status: connection refused, DNS failure and the like
            message.contains("timed out") || message.contains("connect")
        }
        ServiceError::InvalidResponse { .. } => false,
    }
}

/// `base_delay * 2^attempt`, capped at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// Run `call` until it succeeds, fails permanently, or attempts run out.
pub async fn with_retry<T, F, Fut>(
    service: &'static str,
    policy: RetryPolicy,
    mut call: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut attempt = 0;
    loop {
        let error = match tokio::time::timeout(
            Duration::from_millis(policy.timeout_ms),
            call(),
        )
        .await
        {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => ServiceError::Timeout {
                service,
                timeout_ms: policy.timeout_ms,
            },
        };

        if attempt >= policy.retry_attempts || !is_retryable(&error) {
            return Err(error);
        }

        let delay = backoff_duration(attempt, policy.retry_delay_ms);
        tracing::warn!(
            "{service} attempt {}/{} failed: {error}; retrying in {:?}",
            attempt + 1,
            policy.retry_attempts + 1,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn request_error(status_code: Option<u16>, message: &str) -> ServiceError {
        ServiceError::Request {
            service: "vision",
            message: message.to_string(),
            status_code,
        }
    }

    fn policy(retry_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            timeout_ms: 1000,
            retry_attempts,
            retry_delay_ms: 1,
        }
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = ServiceError::Timeout {
            service: "vision",
            timeout_ms: 30000,
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_rate_limit_and_server_errors_retryable() {
        assert!(is_retryable(&request_error(Some(429), "rate limit exceeded")));
        assert!(is_retryable(&request_error(Some(503), "service unavailable")));
    }

    #[test]
    fn test_auth_error_not_retryable() {
        assert!(!is_retryable(&request_error(Some(403), "permission denied")));
    }

    #[test]
    fn test_status_digits_in_message_ignored() {
        assert!(!is_retryable(&request_error(None, "Processed 500 labels")));
        assert!(is_retryable(&request_error(None, "connection refused")));
    }

    #[test]
    fn test_invalid_response_not_retryable() {
        let err = ServiceError::InvalidResponse {
            service: "vision",
            message: "missing labelAnnotations".to_string(),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(3, 1000), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_error() {
        let calls = AtomicU32::new(0);
        let result = with_retry("vision", policy(2), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(request_error(Some(429), "slow down"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_stops_on_permanent_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry("vision", policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(request_error(Some(400), "bad request")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry("vision", policy(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(request_error(Some(500), "internal")) }
        })
        .await;

        assert!(matches!(
            result,
            Err(ServiceError::Request {
                status_code: Some(500),
                ..
            })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let policy = RetryPolicy {
            timeout_ms: 10,
            retry_attempts: 0,
            retry_delay_ms: 1,
        };
        let result: Result<(), _> = with_retry("vision", policy, || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Timeout { timeout_ms: 10, .. })));
    }
}
