//! Client settings and shared HTTP client construction.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::http::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, RetryPolicy};

/// The public demo deployment of the booking service.
pub const DEFAULT_BASE_URL: &str = "https://restful-booker.herokuapp.com";

/// Everything the client needs: where the service lives, the credentials
/// for mutating operations, and the retry knobs. Loaded once per process
/// and shared read-only.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            // The demo service's fixed admin credentials.
            username: "admin".to_string(),
            password: "password123".to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl Settings {
    /// Reads settings from `BOOKER_*` environment variables, falling back
    /// to the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("BOOKER_BASE_URL").unwrap_or(defaults.base_url),
            username: env::var("BOOKER_USERNAME").unwrap_or(defaults.username),
            password: env::var("BOOKER_PASSWORD").unwrap_or(defaults.password),
            max_attempts: parsed_var("BOOKER_MAX_ATTEMPTS", defaults.max_attempts),
            base_delay: Duration::from_millis(parsed_var(
                "BOOKER_RETRY_DELAY_MS",
                DEFAULT_BASE_DELAY_MS,
            )),
        }
    }

    /// The retry policy these settings describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_delay)
    }
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Builds the shared reqwest client: one connection pool per process,
/// JSON accept header on every request.
pub fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .user_agent("booker-cli")
        .default_headers(headers)
        .build()?;

    Ok(client)
}
