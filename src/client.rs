//! The booking API client: request shaping, retry dispatch and outcome
//! classification for every operation.

use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use serde_json::Value;

use crate::api::{AuthError, BookingApi};
use crate::config::{Settings, build_http_client};
use crate::http::{ApiResponse, RetryPolicy, execute_with_retry};
use crate::model::{Booking, BookingPatch};

/// Response shapes the service sends back (internal).
mod wire {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct CreatedBooking {
        pub bookingid: u32,
    }

    #[derive(Deserialize, Debug)]
    pub struct BookingIdEntry {
        pub bookingid: u32,
    }
}

/// Client for the booking service.
///
/// Cheap to clone: clones share the underlying connection pool and the
/// read-only retry policy, so one configured client can be handed out per
/// test without any shared mutable state.
#[derive(Clone)]
pub struct BookerClient {
    http: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl BookerClient {
    /// Creates a client from settings, building the shared HTTP client.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::with_client(
            build_http_client()?,
            &settings.base_url,
            settings.retry_policy(),
        ))
    }

    /// Creates a client around an existing reqwest client.
    pub fn with_client(http: Client, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl BookingApi for BookerClient {
    /// Four outcomes, checked in order: transport failure, embedded
    /// rejection, token, anything else. The service answers bad
    /// credentials with HTTP 200 plus `{"reason": ...}`, so the body has
    /// to be inspected even when the status says success.
    #[tracing::instrument(skip(self, password))]
    async fn create_token(&self, username: &str, password: &str) -> Result<String, AuthError> {
        info!("Creating authentication token for user {}", username);
        let url = self.url("/auth");
        let payload = serde_json::json!({ "username": username, "password": password });

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self.http.post(&url).json(&payload).send().await?;
            ApiResponse::read(response).await
        })
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to create token: {}", e);
                return Err(AuthError::Transport {
                    status: None,
                    message: e.to_string(),
                });
            }
        };

        if !response.is_success() {
            error!("Failed to create token. Status code: {}", response.status);
            return Err(AuthError::Transport {
                status: Some(response.status),
                message: response.status.to_string(),
            });
        }

        let doc: Value = match serde_json::from_str(&response.body) {
            Ok(doc) => doc,
            Err(_) => {
                error!("Unexpected response from token endpoint: {}", response.body);
                return Err(AuthError::Malformed(response.body));
            }
        };

        if let Some(reason) = doc.get("reason").and_then(Value::as_str) {
            error!("Failed to create token. Reason: {}", reason);
            return Err(AuthError::Rejected(reason.to_string()));
        }

        if let Some(token) = doc.get("token").and_then(Value::as_str) {
            info!("Successfully created authentication token");
            return Ok(token.to_string());
        }

        error!("Unexpected response from token endpoint: {}", response.body);
        Err(AuthError::Malformed(response.body))
    }

    #[tracing::instrument(skip(self, booking))]
    async fn create_booking(&self, booking: &Booking) -> Option<u32> {
        info!(
            "Creating new booking for {} {}",
            booking.first_name, booking.last_name
        );
        let url = self.url("/booking");

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self.http.post(&url).json(booking).send().await?;
            ApiResponse::read(response).await
        })
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to create booking: {}", e);
                return None;
            }
        };

        if !response.is_success() {
            error!(
                "Failed to create booking. Status code: {}",
                response.status
            );
            return None;
        }

        match serde_json::from_str::<wire::CreatedBooking>(&response.body) {
            Ok(created) => {
                info!("Successfully created booking with ID: {}", created.bookingid);
                Some(created.bookingid)
            }
            Err(e) => {
                error!("Failed to parse create booking response: {}", e);
                None
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn get_booking(&self, booking_id: u32) -> Option<Booking> {
        info!("Getting booking with ID: {}", booking_id);
        let url = self.url(&format!("/booking/{}", booking_id));

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self.http.get(&url).send().await?;
            ApiResponse::read(response).await
        })
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to get booking {}: {}", booking_id, e);
                return None;
            }
        };

        if !response.is_success() {
            error!(
                "Failed to get booking {}. Status code: {}",
                booking_id, response.status
            );
            return None;
        }

        match serde_json::from_str::<Booking>(&response.body) {
            Ok(booking) => {
                info!("Successfully retrieved booking {}", booking_id);
                Some(booking)
            }
            Err(e) => {
                error!("Failed to parse booking {}: {}", booking_id, e);
                None
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn booking_ids(&self) -> Vec<u32> {
        info!("Getting all booking IDs");
        let url = self.url("/booking");

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self.http.get(&url).send().await?;
            ApiResponse::read(response).await
        })
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to get booking IDs: {}", e);
                return Vec::new();
            }
        };

        if !response.is_success() {
            error!(
                "Failed to get booking IDs. Status code: {}",
                response.status
            );
            return Vec::new();
        }

        match serde_json::from_str::<Vec<wire::BookingIdEntry>>(&response.body) {
            Ok(entries) => {
                info!("Successfully retrieved {} booking IDs", entries.len());
                entries.into_iter().map(|entry| entry.bookingid).collect()
            }
            Err(e) => {
                error!("Failed to parse booking ID list: {}", e);
                Vec::new()
            }
        }
    }

    #[tracing::instrument(skip(self, booking, token))]
    async fn update_booking(&self, booking_id: u32, booking: &Booking, token: &str) -> bool {
        info!("Updating booking {}", booking_id);
        let url = self.url(&format!("/booking/{}", booking_id));
        let cookie = format!("token={}", token);

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self
                .http
                .put(&url)
                .header(COOKIE, &cookie)
                .json(booking)
                .send()
                .await?;
            ApiResponse::read(response).await
        })
        .await;

        match outcome {
            Ok(response) if response.is_success() => {
                info!("Successfully updated booking {}", booking_id);
                true
            }
            Ok(response) => {
                error!(
                    "Failed to update booking {}. Status code: {}",
                    booking_id, response.status
                );
                false
            }
            Err(e) => {
                error!("Failed to update booking {}: {}", booking_id, e);
                false
            }
        }
    }

    #[tracing::instrument(skip(self, patch, token))]
    async fn partial_update_booking(
        &self,
        booking_id: u32,
        patch: &BookingPatch,
        token: &str,
    ) -> bool {
        info!("Partially updating booking {}", booking_id);
        let url = self.url(&format!("/booking/{}", booking_id));
        let cookie = format!("token={}", token);

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self
                .http
                .patch(&url)
                .header(COOKIE, &cookie)
                .json(patch)
                .send()
                .await?;
            ApiResponse::read(response).await
        })
        .await;

        match outcome {
            Ok(response) if response.is_success() => {
                info!("Successfully partially updated booking {}", booking_id);
                true
            }
            Ok(response) => {
                error!(
                    "Failed to partially update booking {}. Status code: {}",
                    booking_id, response.status
                );
                false
            }
            Err(e) => {
                error!("Failed to partially update booking {}: {}", booking_id, e);
                false
            }
        }
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_booking(&self, booking_id: u32, token: &str) -> bool {
        info!("Deleting booking {}", booking_id);
        let url = self.url(&format!("/booking/{}", booking_id));
        let cookie = format!("token={}", token);

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self
                .http
                .delete(&url)
                .header(COOKIE, &cookie)
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await?;
            ApiResponse::read(response).await
        })
        .await;

        match outcome {
            Ok(response) if response.is_success() => {
                info!("Successfully deleted booking {}", booking_id);
                true
            }
            Ok(response) => {
                error!(
                    "Failed to delete booking {}. Status code: {}",
                    booking_id, response.status
                );
                false
            }
            Err(e) => {
                error!("Failed to delete booking {}: {}", booking_id, e);
                false
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn health_check(&self) -> bool {
        info!("Performing health check");
        let url = self.url("/ping");

        let outcome = execute_with_retry(&self.policy, || async {
            let response = self.http.get(&url).send().await?;
            ApiResponse::read(response).await
        })
        .await;

        match outcome {
            Ok(response) if response.is_success() => {
                info!("Health check successful");
                true
            }
            Ok(response) => {
                error!("Health check failed. Status code: {}", response.status);
                false
            }
            Err(e) => {
                error!("Health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookingDates;
    use chrono::NaiveDate;
    use mockito::Matcher;
    use std::time::Duration;

    fn test_client(base_url: &str) -> BookerClient {
        // One attempt: operation tests never sit in backoff sleeps.
        BookerClient::with_client(
            Client::new(),
            base_url,
            RetryPolicy::new(1, Duration::from_millis(1)),
        )
    }

    fn retrying_client(base_url: &str, attempts: u32) -> BookerClient {
        BookerClient::with_client(
            Client::new(),
            base_url,
            RetryPolicy::new(attempts, Duration::from_millis(5)),
        )
    }

    fn sample_booking() -> Booking {
        Booking {
            id: None,
            first_name: "Jim".to_string(),
            last_name: "Halpert".to_string(),
            total_price: 250,
            deposit_paid: true,
            dates: BookingDates {
                checkin: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                checkout: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            },
            additional_needs: Some("Breakfast".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_token_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth")
            .match_body(Matcher::Json(serde_json::json!({
                "username": "admin",
                "password": "password123"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token": "abc123"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let token = client.create_token("admin", "password123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn test_create_token_bad_credentials_is_rejected_not_transport() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"reason": "Bad credentials"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.create_token("bad", "creds").await.unwrap_err();

        assert!(matches!(err, AuthError::Rejected(_)));
        assert!(err.to_string().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn test_create_token_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth")
            .with_status(403)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.create_token("admin", "password123").await.unwrap_err();

        match err {
            AuthError::Transport { status, .. } => {
                assert_eq!(status, Some(reqwest::StatusCode::FORBIDDEN));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_token_malformed_body_carries_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"surprise": 42}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.create_token("admin", "password123").await.unwrap_err();

        match err {
            AuthError::Malformed(body) => assert_eq!(body, r#"{"surprise": 42}"#),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_token_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.create_token("admin", "password123").await.unwrap_err();

        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_create_booking_returns_assigned_id() {
        let mut server = mockito::Server::new_async().await;
        let booking = sample_booking();
        let mock = server
            .mock("POST", "/booking")
            .match_body(Matcher::Json(serde_json::json!({
                "firstname": "Jim",
                "lastname": "Halpert",
                "totalprice": 250,
                "depositpaid": true,
                "bookingdates": {"checkin": "2024-03-01", "checkout": "2024-03-08"},
                "additionalneeds": "Breakfast"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"bookingid": 17, "booking": {}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let booking_id = client.create_booking(&booking).await;

        mock.assert_async().await;
        assert_eq!(booking_id, Some(17));
    }

    #[tokio::test]
    async fn test_create_booking_failure_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/booking")
            .with_status(400)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.create_booking(&sample_booking()).await, None);
    }

    #[tokio::test]
    async fn test_get_booking_parses_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/booking/17")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "firstname": "Jim",
                    "lastname": "Halpert",
                    "totalprice": 250,
                    "depositpaid": true,
                    "bookingdates": {"checkin": "2024-03-01", "checkout": "2024-03-08"},
                    "additionalneeds": "Breakfast"
                }"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let booking = client.get_booking(17).await.unwrap();

        assert_eq!(booking, sample_booking());
    }

    #[tokio::test]
    async fn test_get_booking_not_found_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/booking/404")
            .with_status(404)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.get_booking(404).await, None);
    }

    #[tokio::test]
    async fn test_booking_ids_maps_entries() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/booking")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"bookingid": 1}, {"bookingid": 5}, {"bookingid": 9}]"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.booking_ids().await, vec![1, 5, 9]);
    }

    #[tokio::test]
    async fn test_booking_ids_empty_state_is_empty_not_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/booking")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.booking_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_booking_ids_failure_collapses_to_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/booking")
            .with_status(400)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.booking_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_booking_sends_token_cookie() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/booking/17")
            .match_header("cookie", "token=abc123")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.update_booking(17, &sample_booking(), "abc123").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_booking_forbidden_is_false() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/booking/17")
            .with_status(403)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(!client.update_booking(17, &sample_booking(), "stale").await);
    }

    #[tokio::test]
    async fn test_partial_update_sends_only_patch_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/booking/17")
            .match_header("cookie", "token=abc123")
            .match_body(Matcher::Json(serde_json::json!({"totalprice": 999})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let patch = BookingPatch {
            total_price: Some(999),
            ..BookingPatch::default()
        };

        let client = test_client(&server.url());
        assert!(client.partial_update_booking(17, &patch, "abc123").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_booking_accepts_201() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/booking/17")
            .match_header("cookie", "token=abc123")
            .with_status(201)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.delete_booking(17, "abc123").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_booking_failure_is_false() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/booking/17")
            .with_status(405)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(!client.delete_booking(17, "abc123").await);
    }

    #[tokio::test]
    async fn test_health_check_ping() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_status(201)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_down_is_false_never_raises() {
        let client = test_client("http://127.0.0.1:1");
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_get_booking_retries_transient_failures() {
        let mut server = mockito::Server::new_async().await;
        // All attempts answer 503; the client should hit the endpoint
        // exactly as many times as the attempt budget allows.
        let mock = server
            .mock("GET", "/booking/17")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = retrying_client(&server.url(), 3);
        assert_eq!(client.get_booking(17).await, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_token_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth")
            .with_status(403)
            .expect(1)
            .create_async()
            .await;

        let client = retrying_client(&server.url(), 3);
        assert!(client.create_token("admin", "password123").await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_normalized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .create_async()
            .await;

        let client = test_client(&format!("{}/", server.url()));
        assert!(client.health_check().await);
    }
}
