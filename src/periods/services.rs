//! Period registry write operations.
//!
//! Every write re-checks the non-overlap invariant inside a transaction
//! holding the property advisory lock, so two concurrent writes cannot both
//! pass the check.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::calendar;
use crate::cache::AppCache;
use crate::db;
use crate::error::{AppError, Result};
use crate::properties;

use super::models::Period;
use super::queries;
use super::requests::{CreatePeriodRequest, UpdatePeriodRequest};

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end <= start {
        return Err(AppError::invalid_input(
            "INVALID_RANGE",
            format!("end_date {end} must be after start_date {start}"),
        ));
    }
    Ok(())
}

fn validate_discount_bps(bps: Option<i32>) -> Result<()> {
    if let Some(bps) = bps {
        if !(0..=10_000).contains(&bps) {
            return Err(AppError::invalid_input(
                "INVALID_DISCOUNT",
                format!("weekly_discount_bps must be 0..=10000, got {bps}"),
            ));
        }
    }
    Ok(())
}

fn overlap_conflict(conflicting: &Period) -> AppError {
    AppError::conflict(
        "PERIOD_OVERLAP",
        format!(
            "range overlaps existing period {} ({} .. {})",
            conflicting.id, conflicting.start_date, conflicting.end_date
        ),
    )
}

pub async fn create_period(
    pool: &PgPool,
    cache: &AppCache,
    property_id: Uuid,
    req: CreatePeriodRequest,
) -> Result<Period> {
    let start = calendar::normalize_date_only(&req.start_date)?;
    let end = calendar::normalize_date_only(&req.end_date)?;
    validate_range(start, end)?;
    validate_discount_bps(req.weekly_discount_bps)?;
    if req.min_nights < 1 || req.weekly_threshold_nights < 1 || req.max_guests < 1 {
        return Err(AppError::invalid_input(
            "INVALID_RULE",
            "min_nights, weekly_threshold_nights and max_guests must be >= 1",
        ));
    }

    properties::get_property(pool, cache, property_id).await?;

    let now = Utc::now();
    let period = Period {
        id: Uuid::new_v4(),
        property_id,
        start_date: start,
        end_date: end,
        is_open: req.is_open,
        nightly_price: req.nightly_price,
        weekly_discount_bps: req.weekly_discount_bps,
        weekly_threshold_nights: req.weekly_threshold_nights,
        min_nights: req.min_nights,
        max_guests: req.max_guests,
        name: req.name,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    let mut tx = pool.begin().await?;
    db::lock_property(&mut tx, property_id).await?;

    if let Some(conflicting) =
        queries::find_overlapping(&mut *tx, property_id, start, end, None).await?
    {
        return Err(overlap_conflict(&conflicting));
    }

    queries::insert_period(&mut *tx, &period).await?;
    tx.commit().await?;

    tracing::info!(
        period_id = %period.id,
        property_id = %property_id,
        start = %start,
        end = %end,
        "period created"
    );

    Ok(period)
}

/// Effective post-patch row: patch fields override, absent fields keep the
/// current value, explicit nulls clear nullable ones.
fn apply_patch(current: Period, patch: UpdatePeriodRequest) -> Result<Period> {
    let start = match &patch.start_date {
        Some(raw) => calendar::normalize_date_only(raw)?,
        None => current.start_date,
    };
    let end = match &patch.end_date {
        Some(raw) => calendar::normalize_date_only(raw)?,
        None => current.end_date,
    };
    validate_range(start, end)?;

    let weekly_discount_bps = match patch.weekly_discount_bps {
        Some(value) => value,
        None => current.weekly_discount_bps,
    };
    validate_discount_bps(weekly_discount_bps)?;

    let next = Period {
        start_date: start,
        end_date: end,
        is_open: patch.is_open.unwrap_or(current.is_open),
        nightly_price: patch.nightly_price.unwrap_or(current.nightly_price),
        weekly_discount_bps,
        weekly_threshold_nights: patch
            .weekly_threshold_nights
            .unwrap_or(current.weekly_threshold_nights),
        min_nights: patch.min_nights.unwrap_or(current.min_nights),
        max_guests: patch.max_guests.unwrap_or(current.max_guests),
        name: match patch.name {
            Some(value) => value,
            None => current.name.clone(),
        },
        notes: match patch.notes {
            Some(value) => value,
            None => current.notes.clone(),
        },
        updated_at: Utc::now(),
        ..current
    };

    if next.min_nights < 1 || next.weekly_threshold_nights < 1 || next.max_guests < 1 {
        return Err(AppError::invalid_input(
            "INVALID_RULE",
            "min_nights, weekly_threshold_nights and max_guests must be >= 1",
        ));
    }

    Ok(next)
}

pub async fn update_period(pool: &PgPool, id: Uuid, patch: UpdatePeriodRequest) -> Result<Period> {
    // First read only locates the property for the advisory lock.
    let existing = queries::find_period(pool, id)
        .await?
        .ok_or(AppError::NotFound("period"))?;

    let mut tx = pool.begin().await?;
    db::lock_property(&mut tx, existing.property_id).await?;

    // Re-read under the lock: a concurrent patch committed between the first
    // read and lock acquisition must not have its fields silently overwritten.
    let current = queries::find_period(&mut *tx, id)
        .await?
        .ok_or(AppError::NotFound("period"))?;

    let next = apply_patch(current, patch)?;

    // Excluding the row's own id, or every update would overlap itself.
    if let Some(conflicting) = queries::find_overlapping(
        &mut *tx,
        next.property_id,
        next.start_date,
        next.end_date,
        Some(id),
    )
    .await?
    {
        return Err(overlap_conflict(&conflicting));
    }

    queries::update_period(&mut *tx, &next).await?;
    tx.commit().await?;

    tracing::info!(period_id = %id, "period updated");

    Ok(next)
}

pub async fn delete_period(pool: &PgPool, id: Uuid) -> Result<()> {
    let period = queries::find_period(pool, id)
        .await?
        .ok_or(AppError::NotFound("period"))?;

    let referencing = queries::count_bookings_for_period(pool, id).await?;
    if referencing > 0 {
        return Err(AppError::conflict(
            "PERIOD_IN_USE",
            format!(
                "period {id} is referenced by {referencing} booking(s); close it with is_open=false instead"
            ),
        ));
    }

    queries::delete_period(pool, id).await?;

    tracing::info!(period_id = %id, property_id = %period.property_id, "period deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn period() -> Period {
        let now = Utc::now();
        Period {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            start_date: d("2026-02-01"),
            end_date: d("2026-02-10"),
            is_open: true,
            nightly_price: 100,
            weekly_discount_bps: Some(1000),
            weekly_threshold_nights: 7,
            min_nights: 2,
            max_guests: 6,
            name: Some("High season".to_string()),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patch_applies_against_the_row_it_is_given() {
        // Simulates a patch landing after another writer already changed the
        // price: applying against the fresh row keeps that change.
        let mut refreshed = period();
        refreshed.nightly_price = 140;

        let patch = UpdatePeriodRequest {
            min_nights: Some(3),
            ..Default::default()
        };
        let next = apply_patch(refreshed, patch).unwrap();
        assert_eq!(next.min_nights, 3);
        assert_eq!(next.nightly_price, 140);
    }

    #[test]
    fn test_patch_absent_keeps_null_clears() {
        let current = period();
        let patch = UpdatePeriodRequest::default();
        let next = apply_patch(current.clone(), patch).unwrap();
        assert_eq!(next.weekly_discount_bps, Some(1000));
        assert_eq!(next.name.as_deref(), Some("High season"));

        let patch = UpdatePeriodRequest {
            weekly_discount_bps: Some(None),
            name: Some(None),
            ..Default::default()
        };
        let next = apply_patch(current, patch).unwrap();
        assert!(next.weekly_discount_bps.is_none());
        assert!(next.name.is_none());
    }

    #[test]
    fn test_patch_rejects_inverted_range() {
        let patch = UpdatePeriodRequest {
            end_date: Some("2026-01-15".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            apply_patch(period(), patch),
            Err(AppError::InvalidInput { code: "INVALID_RANGE", .. })
        ));
    }

    #[test]
    fn test_patch_rejects_out_of_range_discount() {
        let patch = UpdatePeriodRequest {
            weekly_discount_bps: Some(Some(12_000)),
            ..Default::default()
        };
        assert!(matches!(
            apply_patch(period(), patch),
            Err(AppError::InvalidInput { code: "INVALID_DISCOUNT", .. })
        ));
    }
}
