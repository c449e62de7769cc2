//! HTTP call executor: retry/backoff around single outbound calls.

mod executor;
mod retry;

pub use executor::{ApiResponse, execute_with_retry};
pub use retry::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, RetryPolicy, is_retryable_status};
