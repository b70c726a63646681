//! Database models for refund requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "refund_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RefundRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Customer-initiated request for a refund beyond policy. The gateway charge
/// is only triggered after explicit admin approval.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RefundRequest {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub reason: Option<String>,
    pub status: RefundRequestStatus,
    pub requested_cents: Option<i64>,
    pub refunded_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
