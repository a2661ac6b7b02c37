//! Retry policy for prediction API calls
//!
//! The default policy never retries: every error reaches the caller on the
//! first occurrence. With retries enabled, only transient errors are retried,
//! using exponential backoff with a cap.

use pwds_client::ClientError;
use std::time::Duration;

/// Retry policy for submissions and status fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed per call (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for the delay between retries
    pub max_backoff: Duration,
}

impl RetryPolicy {
    const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
    const MAX_BACKOFF: Duration = Duration::from_secs(30);

    /// Policy that surfaces every error immediately
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Policy allowing `max_retries` retries with the default backoff
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Self::INITIAL_BACKOFF,
            max_backoff: Self::MAX_BACKOFF,
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Whether a failed status fetch should be retried
    pub fn should_retry(&self, error: &ClientError, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries && error.is_transient()
    }

    /// Whether a failed submission should be retried
    ///
    /// Only connection failures qualify: any other error may mean the
    /// service already created the job.
    pub fn should_retry_submission(&self, error: &ClientError, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries && error.is_connect_failure()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 0);
        assert!(!policy.should_retry(&ClientError::api_error(500, "boom"), 0));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(3),
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(2));
        assert_eq!(policy.backoff(4), Duration::from_secs(3));
        assert_eq!(policy.backoff(40), Duration::from_secs(3));
    }

    #[test]
    fn test_only_transient_errors_are_retried() {
        let policy = RetryPolicy::new(2);

        assert!(policy.should_retry(&ClientError::api_error(503, "unavailable"), 0));
        assert!(policy.should_retry(&ClientError::api_error(429, "slow down"), 1));
        assert!(!policy.should_retry(&ClientError::api_error(503, "unavailable"), 2));
        assert!(!policy.should_retry(&ClientError::api_error(404, "missing"), 0));
        assert!(!policy.should_retry(&ClientError::ParseError("bad".to_string()), 0));
    }

    #[test]
    fn test_submission_not_retried_after_response() {
        let policy = RetryPolicy::new(3);
        assert!(!policy.should_retry_submission(&ClientError::api_error(500, "boom"), 0));
        assert!(!policy.should_retry_submission(&ClientError::api_error(429, "slow down"), 0));
    }
}
