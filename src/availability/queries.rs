//! Database queries for blocking overlaps.
//!
//! One UNION ALL query covers all three blocking tables so the half-open
//! overlap predicate is written once per source, identically.

use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{BlockRow, DateBlock};

/// Every blocking entity overlapping `[start, end)` for the property.
/// Only pending/confirmed bookings hold inventory.
pub async fn find_blocking<'e, E: PgExecutor<'e>>(
    executor: E,
    property_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DateBlock>, AppError> {
    let rows = sqlx::query_as::<_, BlockRow>(
        r#"
        SELECT 'booking' AS kind, start_date, end_date, id AS ref_id, status::text AS detail
        FROM bookings
        WHERE property_id = $1
          AND status IN ('pending', 'confirmed')
          AND start_date < $3 AND end_date > $2
        UNION ALL
        SELECT 'external' AS kind, start_date, end_date, id AS ref_id, provider AS detail
        FROM external_blocks
        WHERE property_id = $1
          AND start_date < $3 AND end_date > $2
        UNION ALL
        SELECT 'manual' AS kind, start_date, end_date, id AS ref_id, reason AS detail
        FROM manual_blocks
        WHERE property_id = $1
          AND start_date < $3 AND end_date > $2
        ORDER BY start_date
        "#,
    )
    .bind(property_id)
    .bind(start)
    .bind(end)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(BlockRow::into_block).collect())
}

/// The authoritative "can't double-book" guard. Run against the booking
/// transaction's connection, after the property advisory lock is held.
pub async fn is_range_blocked<'e, E: PgExecutor<'e>>(
    executor: E,
    property_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<bool, AppError> {
    let blocks = find_blocking(executor, property_id, start, end).await?;
    Ok(!blocks.is_empty())
}
