//! Database queries for the credit ledger.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::AppError;

use super::models::Voucher;

const VOUCHER_COLUMNS: &str = r#"
    id, customer_id, issued_cents, remaining_cents, currency,
    expires_at, origin_booking_id, created_at
"#;

/// Active, non-expired vouchers in consumption order: soonest expiry first,
/// perpetual vouchers (NULL expiry) last, ties broken by age.
pub async fn active_vouchers<'e, E: PgExecutor<'e>>(
    executor: E,
    customer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<Voucher>, AppError> {
    let vouchers = sqlx::query_as::<_, Voucher>(&format!(
        r#"
        SELECT {VOUCHER_COLUMNS}
        FROM credit_vouchers
        WHERE customer_id = $1
          AND remaining_cents > 0
          AND (expires_at IS NULL OR expires_at > $2)
        ORDER BY expires_at ASC NULLS LAST, created_at ASC
        "#
    ))
    .bind(customer_id)
    .bind(now)
    .fetch_all(executor)
    .await?;

    Ok(vouchers)
}

/// Same rows, locked for the duration of the booking transaction.
pub async fn active_vouchers_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    customer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<Voucher>, AppError> {
    let vouchers = sqlx::query_as::<_, Voucher>(&format!(
        r#"
        SELECT {VOUCHER_COLUMNS}
        FROM credit_vouchers
        WHERE customer_id = $1
          AND remaining_cents > 0
          AND (expires_at IS NULL OR expires_at > $2)
        ORDER BY expires_at ASC NULLS LAST, created_at ASC
        FOR UPDATE
        "#
    ))
    .bind(customer_id)
    .bind(now)
    .fetch_all(executor)
    .await?;

    Ok(vouchers)
}

pub async fn decrement_voucher<'e, E: PgExecutor<'e>>(
    executor: E,
    voucher_id: Uuid,
    take_cents: i64,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE credit_vouchers
        SET remaining_cents = remaining_cents - $2
        WHERE id = $1 AND remaining_cents >= $2
        "#,
    )
    .bind(voucher_id)
    .bind(take_cents)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Finalize a voucher whose remaining balance reached zero.
pub async fn delete_exhausted<'e, E: PgExecutor<'e>>(
    executor: E,
    voucher_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM credit_vouchers WHERE id = $1 AND remaining_cents = 0")
        .bind(voucher_id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn insert_voucher<'e, E: PgExecutor<'e>>(
    executor: E,
    voucher: &Voucher,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO credit_vouchers (
            id, customer_id, issued_cents, remaining_cents,
            currency, expires_at, origin_booking_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(voucher.id)
    .bind(voucher.customer_id)
    .bind(voucher.issued_cents)
    .bind(voucher.remaining_cents)
    .bind(&voucher.currency)
    .bind(voucher.expires_at)
    .bind(voucher.origin_booking_id)
    .execute(executor)
    .await?;

    Ok(())
}
