//! Booking domain types and their wire encoding.
//!
//! The remote service speaks all-lowercase field names; responses are
//! parsed leniently (camelCase/PascalCase spellings accepted via aliases).
//! Dates travel as `YYYY-MM-DD` with no time component.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A booking as created, read and replaced through the API.
///
/// The id is assigned by the remote service and never serialized; callers
/// that need it keep the id returned by create alongside the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(skip)]
    pub id: Option<u32>,
    #[serde(rename = "firstname", alias = "firstName", alias = "FirstName")]
    pub first_name: String,
    #[serde(rename = "lastname", alias = "lastName", alias = "LastName")]
    pub last_name: String,
    #[serde(rename = "totalprice", alias = "totalPrice", alias = "TotalPrice")]
    pub total_price: u32,
    #[serde(rename = "depositpaid", alias = "depositPaid", alias = "DepositPaid")]
    pub deposit_paid: bool,
    #[serde(rename = "bookingdates", alias = "bookingDates", alias = "BookingDates")]
    pub dates: BookingDates,
    #[serde(
        rename = "additionalneeds",
        alias = "additionalNeeds",
        alias = "AdditionalNeeds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_needs: Option<String>,
}

/// Stay window, calendar days only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDates {
    #[serde(alias = "checkIn", alias = "Checkin", alias = "CheckIn")]
    pub checkin: NaiveDate,
    #[serde(alias = "checkOut", alias = "Checkout", alias = "CheckOut")]
    pub checkout: NaiveDate,
}

/// Partial-update body: only the populated fields are sent, and the
/// service merges them into the stored booking.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingPatch {
    #[serde(rename = "firstname", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "totalprice", skip_serializing_if = "Option::is_none")]
    pub total_price: Option<u32>,
    #[serde(rename = "depositpaid", skip_serializing_if = "Option::is_none")]
    pub deposit_paid: Option<bool>,
    #[serde(rename = "bookingdates", skip_serializing_if = "Option::is_none")]
    pub dates: Option<BookingDates>,
    #[serde(rename = "additionalneeds", skip_serializing_if = "Option::is_none")]
    pub additional_needs: Option<String>,
}
