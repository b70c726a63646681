//! Database models for periods.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Period from periods
///
/// A pricing/availability rule covering the half-open range
/// `[start_date, end_date)` for one property.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Period {
    pub id: Uuid,
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_open: bool,
    /// Nightly price in major currency units
    pub nightly_price: i64,
    /// 0..=10000; None disables the weekly discount
    pub weekly_discount_bps: Option<i32>,
    pub weekly_threshold_nights: i32,
    pub min_nights: i32,
    pub max_guests: i32,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Period {
    /// Whether `day` falls inside this period's half-open range.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day < self.end_date
    }
}
