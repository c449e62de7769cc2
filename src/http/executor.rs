//! Bounded-retry execution of prepared HTTP calls.

use std::future::Future;

use log::warn;
use reqwest::{Response, StatusCode};

use super::retry::{RetryPolicy, is_retryable_status};

/// Descriptor of one completed HTTP exchange: the status plus the raw body.
///
/// Reading the body eagerly keeps the executor free to hand the same
/// response to both the retry decision and the caller's parser.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Drains a reqwest response into a descriptor.
    pub async fn read(response: Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let body = response.text().await?;
        Ok(Self { status, body })
    }

    /// Whether the exchange completed with a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Runs one prepared HTTP attempt through the retry policy.
///
/// The operation is retried while it returns a network-level error or a
/// response with a transient status (429 or 5xx gateway family), waiting
/// `base_delay * 2^(k-2)` before attempt k. The last outcome, whatever it
/// is, is returned verbatim once the attempt budget is spent; no new error
/// is synthesized on exhaustion.
///
/// Knows nothing about the operation being performed; callers classify the
/// returned outcome themselves.
pub async fn execute_with_retry<F, Fut>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<ApiResponse, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<ApiResponse, reqwest::Error>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        let outcome = operation().await;

        let retryable = match &outcome {
            Ok(response) => is_retryable_status(response.status),
            // No response at all: network-level failure, always worth a retry.
            Err(_) => true,
        };

        if !retryable || attempt >= max_attempts {
            return outcome;
        }

        let delay = policy.delay_before_attempt(attempt + 1);
        match &outcome {
            Ok(response) => warn!(
                "Attempt {}/{} failed with status {}, retrying in {}ms...",
                attempt,
                max_attempts,
                response.status,
                delay.as_millis()
            ),
            Err(e) => warn!(
                "Attempt {}/{} failed ({}), retrying in {}ms...",
                attempt,
                max_attempts,
                e,
                delay.as_millis()
            ),
        }

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
