//! Database models for credit vouchers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Credit voucher from credit_vouchers
///
/// `remaining_cents` only ever decreases; a voucher reaching 0 is deleted.
/// Two vouchers for the same customer are never merged.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Voucher {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub issued_cents: i64,
    pub remaining_cents: i64,
    pub currency: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub origin_booking_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
