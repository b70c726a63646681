//! Pricing engine.
//!
//! Converts coverage segments plus the arrival period's weekly-stay rule
//! into an exact integer price, and produces the immutable breakdown that
//! gets persisted on the booking.

pub mod calculators;
pub mod models;

pub use calculators::{apply_weekly_discount, eur_to_cents, price_stay};
pub use models::{PriceBreakdown, SegmentPrice};
