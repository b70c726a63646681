//! Database models for bookings and payments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "payment_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    PartiallyRefunded,
    Refunded,
}

/// Booking from bookings
///
/// `total_cents` and `price_breakdown` are an immutable snapshot computed at
/// creation time; later period edits never alter them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub customer_id: Option<Uuid>,
    /// The arrival period; drives min-nights/weekly-discount selection
    pub booking_period_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub adults: i32,
    pub children: i32,
    /// Babies never count toward capacity
    pub babies: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub total_cents: i64,
    pub currency: String,
    pub price_breakdown: serde_json::Value,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Guests counted against capacity.
    pub fn counted_guests(&self) -> i32 {
        self.adults + self.children
    }
}

/// Payment from payments (1:1 with its booking)
///
/// `credits_applied_cents` is tracked separately from `amount_cents` and is
/// never part of any refund computation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub amount_cents: i64,
    pub refunded_cents: i64,
    pub credits_applied_cents: i64,
    pub currency: String,
    pub checkout_session_id: Option<String>,
    pub charge_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Cash still eligible for refund.
    pub fn refundable_cents(&self) -> i64 {
        self.amount_cents - self.refunded_cents
    }
}
