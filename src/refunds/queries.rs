//! Database queries for refund requests.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{RefundRequest, RefundRequestStatus};

const REFUND_REQUEST_COLUMNS: &str = r#"
    id, booking_id, customer_id, reason, status,
    requested_cents, refunded_cents, created_at, resolved_at
"#;

pub async fn insert_refund_request<'e, E: PgExecutor<'e>>(
    executor: E,
    request: &RefundRequest,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO refund_requests (id, booking_id, customer_id, reason, status, requested_cents)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(request.id)
    .bind(request.booking_id)
    .bind(request.customer_id)
    .bind(&request.reason)
    .bind(request.status)
    .bind(request.requested_cents)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn find_refund_request<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<RefundRequest>, AppError> {
    let request = sqlx::query_as::<_, RefundRequest>(&format!(
        "SELECT {REFUND_REQUEST_COLUMNS} FROM refund_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(request)
}

pub async fn pending_for_booking<'e, E: PgExecutor<'e>>(
    executor: E,
    booking_id: Uuid,
) -> Result<Option<RefundRequest>, AppError> {
    let request = sqlx::query_as::<_, RefundRequest>(&format!(
        "SELECT {REFUND_REQUEST_COLUMNS} FROM refund_requests WHERE booking_id = $1 AND status = 'pending'"
    ))
    .bind(booking_id)
    .fetch_optional(executor)
    .await?;

    Ok(request)
}

pub async fn list_by_status<'e, E: PgExecutor<'e>>(
    executor: E,
    status: RefundRequestStatus,
) -> Result<Vec<RefundRequest>, AppError> {
    let requests = sqlx::query_as::<_, RefundRequest>(&format!(
        "SELECT {REFUND_REQUEST_COLUMNS} FROM refund_requests WHERE status = $1 ORDER BY created_at"
    ))
    .bind(status)
    .fetch_all(executor)
    .await?;

    Ok(requests)
}

/// Status-guarded resolution.
pub async fn resolve_refund_request<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    status: RefundRequestStatus,
    refunded_cents: Option<i64>,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE refund_requests
        SET status = $2, refunded_cents = $3, resolved_at = now()
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(refunded_cents)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
