//! Retry policy configuration and transient-failure classification.

use std::time::Duration;

use reqwest::StatusCode;

/// Default number of attempts for API operations.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay between retry attempts in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Bounded-retry configuration: attempt budget plus the base backoff delay.
///
/// Immutable once constructed; safe to share read-only across concurrent
/// calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and base delay.
    /// The budget is clamped to at least one attempt.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Total number of attempts (initial call plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff before the given attempt number (attempts are 1-based):
    /// the first retry (attempt 2) waits the base delay, attempt 3 waits
    /// twice that, doubling without jitter.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        debug_assert!(attempt >= 2, "attempt 1 never waits");
        let exponent = attempt.saturating_sub(2).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        )
    }
}

/// Statuses worth retrying: rate limiting and the transient 5xx family.
/// Everything else won't succeed on a repeat of the same request.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}
