//! The booking API surface and the authentication error taxonomy.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::model::{Booking, BookingPatch};

/// Why token creation failed.
///
/// The auth endpoint signals bad credentials with a 200-status body, so a
/// status code alone cannot classify the outcome; both channels are
/// inspected before deciding.
#[derive(Debug)]
pub enum AuthError {
    /// Non-2xx status, or a network-level failure before any response.
    Transport {
        status: Option<StatusCode>,
        message: String,
    },
    /// Transport succeeded but the body carries a domain rejection
    /// (e.g. "Bad credentials").
    Rejected(String),
    /// Transport succeeded but the body matches neither the success nor
    /// the rejection shape; carries the raw body for diagnosis.
    Malformed(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Transport { message, .. } => {
                write!(f, "Failed to create token: {}", message)
            }
            AuthError::Rejected(reason) => {
                write!(f, "Failed to create token: {}", reason)
            }
            AuthError::Malformed(body) => {
                write!(f, "Unexpected response from token endpoint: {}", body)
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Operations against the booking service.
///
/// Only `create_token` fails loudly; every other operation collapses
/// failure into a sentinel (`None`, `false` or an empty list) and leaves
/// the detail in the logs. Call sites depend on that asymmetry, so it is
/// part of the contract here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Exchanges credentials for an opaque session token.
    async fn create_token(&self, username: &str, password: &str) -> Result<String, AuthError>;

    /// Creates a booking; returns the assigned id, or `None` on any failure.
    async fn create_booking(&self, booking: &Booking) -> Option<u32>;

    /// Reads a booking; `None` means not found or failed.
    async fn get_booking(&self, booking_id: u32) -> Option<Booking>;

    /// Lists all booking ids; empty on failure as well as on an empty
    /// service state.
    async fn booking_ids(&self) -> Vec<u32>;

    /// Replaces every field of a stored booking.
    async fn update_booking(&self, booking_id: u32, booking: &Booking, token: &str) -> bool;

    /// Merges the populated patch fields into a stored booking.
    async fn partial_update_booking(
        &self,
        booking_id: u32,
        patch: &BookingPatch,
        token: &str,
    ) -> bool;

    /// Removes a booking.
    async fn delete_booking(&self, booking_id: u32, token: &str) -> bool;

    /// Liveness probe against the service.
    async fn health_check(&self) -> bool;
}
