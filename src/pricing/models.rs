//! Price breakdown records.
//!
//! The breakdown is the permanent record of "why this price": it is
//! serialized onto the booking row at creation time and never recomputed
//! from live period data, so later period edits cannot rewrite history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Price of one coverage segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPrice {
    pub period_id: Option<Uuid>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub nights: i64,
    /// Major currency units per night
    pub nightly_price_eur: i64,
    pub segment_total_eur: i64,
}

/// Full stay price in major currency units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub segments: Vec<SegmentPrice>,
    pub base_total_eur: i64,
    pub weekly_discount_bps: Option<i32>,
    pub weekly_discount_eur: i64,
    pub total_eur: i64,
}
