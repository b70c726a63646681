//! Date-only calendar utilities.
//!
//! Every date range in the system is half-open `[start, end)`: the start
//! night is occupied, the checkout day is not. All interval comparisons go
//! through [`ranges_overlap`] so the convention lives in one place.

use chrono::{DateTime, NaiveDate};

use crate::error::{AppError, Result};

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 datetime.
///
/// A datetime is reduced to its UTC calendar date, never a local-timezone
/// one: `2026-02-03T23:30:00-05:00` normalizes to `2026-02-04`.
pub fn normalize_date_only(input: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_utc().date());
    }
    Err(AppError::invalid_input(
        "INVALID_DATE",
        format!("invalid date: {input:?} (expected YYYY-MM-DD or RFC 3339)"),
    ))
}

/// Number of nights in `[start, end)`.
///
/// Callers must ensure `end > start`; ordering is not validated here.
pub fn nights_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// The half-open interval overlap test used by every component.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_normalize_plain_date() {
        assert_eq!(normalize_date_only("2026-02-03").unwrap(), d("2026-02-03"));
    }

    #[test]
    fn test_normalize_datetime_uses_utc_calendar_date() {
        // 23:30 -05:00 is already the next day in UTC
        assert_eq!(
            normalize_date_only("2026-02-03T23:30:00-05:00").unwrap(),
            d("2026-02-04")
        );
        assert_eq!(
            normalize_date_only("2026-02-03T10:00:00Z").unwrap(),
            d("2026-02-03")
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_date_only("not-a-date").is_err());
        assert!(normalize_date_only("2026-13-01").is_err());
        assert!(normalize_date_only("").is_err());
    }

    #[test]
    fn test_nights_between() {
        assert_eq!(nights_between(d("2026-02-03"), d("2026-02-06")), 3);
        assert_eq!(nights_between(d("2026-02-03"), d("2026-02-04")), 1);
    }

    #[test]
    fn test_overlap_half_open() {
        // Back-to-back ranges sharing a boundary day never overlap
        assert!(!ranges_overlap(
            d("2026-02-01"),
            d("2026-02-05"),
            d("2026-02-05"),
            d("2026-02-08")
        ));
        assert!(ranges_overlap(
            d("2026-02-01"),
            d("2026-02-06"),
            d("2026-02-05"),
            d("2026-02-08")
        ));
        // Containment
        assert!(ranges_overlap(
            d("2026-02-01"),
            d("2026-02-28"),
            d("2026-02-10"),
            d("2026-02-12")
        ));
    }
}
