//! Database queries for the period registry.

use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::AppError;

use super::models::Period;

const PERIOD_COLUMNS: &str = r#"
    id, property_id, start_date, end_date, is_open,
    nightly_price, weekly_discount_bps, weekly_threshold_nights,
    min_nights, max_guests, name, notes, created_at, updated_at
"#;

pub async fn find_period<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Period>, AppError> {
    let period = sqlx::query_as::<_, Period>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM periods WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(period)
}

pub async fn list_periods<'e, E: PgExecutor<'e>>(
    executor: E,
    property_id: Uuid,
) -> Result<Vec<Period>, AppError> {
    let periods = sqlx::query_as::<_, Period>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM periods WHERE property_id = $1 ORDER BY start_date"
    ))
    .bind(property_id)
    .fetch_all(executor)
    .await?;

    Ok(periods)
}

/// Periods touching `[start, end)`, ordered by start date. Feeds the
/// coverage resolver.
pub async fn periods_in_range<'e, E: PgExecutor<'e>>(
    executor: E,
    property_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Period>, AppError> {
    let periods = sqlx::query_as::<_, Period>(&format!(
        r#"
        SELECT {PERIOD_COLUMNS}
        FROM periods
        WHERE property_id = $1
          AND start_date < $3
          AND end_date > $2
        ORDER BY start_date
        "#
    ))
    .bind(property_id)
    .bind(start)
    .bind(end)
    .fetch_all(executor)
    .await?;

    Ok(periods)
}

/// First period conflicting with the proposed range, excluding `ignore_id`
/// (an update must not collide with itself).
pub async fn find_overlapping<'e, E: PgExecutor<'e>>(
    executor: E,
    property_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    ignore_id: Option<Uuid>,
) -> Result<Option<Period>, AppError> {
    let period = sqlx::query_as::<_, Period>(&format!(
        r#"
        SELECT {PERIOD_COLUMNS}
        FROM periods
        WHERE property_id = $1
          AND start_date < $3
          AND end_date > $2
          AND ($4::uuid IS NULL OR id <> $4)
        ORDER BY start_date
        LIMIT 1
        "#
    ))
    .bind(property_id)
    .bind(start)
    .bind(end)
    .bind(ignore_id)
    .fetch_optional(executor)
    .await?;

    Ok(period)
}

pub async fn insert_period<'e, E: PgExecutor<'e>>(
    executor: E,
    period: &Period,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO periods (
            id, property_id, start_date, end_date, is_open,
            nightly_price, weekly_discount_bps, weekly_threshold_nights,
            min_nights, max_guests, name, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(period.id)
    .bind(period.property_id)
    .bind(period.start_date)
    .bind(period.end_date)
    .bind(period.is_open)
    .bind(period.nightly_price)
    .bind(period.weekly_discount_bps)
    .bind(period.weekly_threshold_nights)
    .bind(period.min_nights)
    .bind(period.max_guests)
    .bind(&period.name)
    .bind(&period.notes)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update_period<'e, E: PgExecutor<'e>>(
    executor: E,
    period: &Period,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE periods
        SET start_date = $2, end_date = $3, is_open = $4,
            nightly_price = $5, weekly_discount_bps = $6,
            weekly_threshold_nights = $7, min_nights = $8, max_guests = $9,
            name = $10, notes = $11, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(period.id)
    .bind(period.start_date)
    .bind(period.end_date)
    .bind(period.is_open)
    .bind(period.nightly_price)
    .bind(period.weekly_discount_bps)
    .bind(period.weekly_threshold_nights)
    .bind(period.min_nights)
    .bind(period.max_guests)
    .bind(&period.name)
    .bind(&period.notes)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete_period<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM periods WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Bookings referencing a period as their arrival period (any status: the
/// audit trail must survive).
pub async fn count_bookings_for_period<'e, E: PgExecutor<'e>>(
    executor: E,
    period_id: Uuid,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bookings WHERE booking_period_id = $1",
    )
    .bind(period_id)
    .fetch_one(executor)
    .await?;

    Ok(count)
}
