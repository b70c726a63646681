//! Request DTOs for booking endpoints.

use serde::Deserialize;
use uuid::Uuid;

/// Request to price a stay without persisting anything
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub property_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub adults: i32,
    #[serde(default)]
    pub children: i32,
    #[serde(default)]
    pub babies: i32,
    #[serde(default)]
    pub use_credit: bool,
}

/// Request to create a booking
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub adults: i32,
    #[serde(default)]
    pub children: i32,
    #[serde(default)]
    pub babies: i32,
    pub guest_name: String,
    pub guest_email: String,
    #[serde(default)]
    pub use_credit: bool,
}

/// Gateway confirmation callback payload
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub session_id: String,
    #[serde(default)]
    pub charge_ref: Option<String>,
}
