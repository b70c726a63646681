//! Core pricing calculation functions.
//!
//! Pure functions over coverage segments - no database access, no floating
//! point. Prices are integer major currency units, percentages are basis
//! points (10000 = 100%), discounts floor toward the customer's favor never
//! exceeding the base.

use crate::availability::{ArrivalRules, CoverageSegment};
use crate::calendar::nights_between;

use super::models::{PriceBreakdown, SegmentPrice};

/// Weekly discount: `floor(base * bps / 10000)`, only when a rate is set and
/// the stay meets the threshold. Parameters come from the arrival segment
/// only, never per-segment.
pub fn apply_weekly_discount(
    base_total: i64,
    total_nights: i64,
    threshold_nights: i32,
    discount_bps: Option<i32>,
) -> i64 {
    match discount_bps {
        Some(bps) if total_nights >= threshold_nights as i64 => {
            base_total * bps as i64 / 10_000
        }
        _ => 0,
    }
}

/// Price every segment and apply the arrival period's weekly discount.
pub fn price_stay(
    segments: &[CoverageSegment],
    rules: &ArrivalRules,
    default_nightly_price: i64,
) -> PriceBreakdown {
    let mut segment_prices = Vec::with_capacity(segments.len());
    let mut base_total = 0i64;
    let mut total_nights = 0i64;

    for segment in segments {
        let nights = nights_between(segment.from, segment.to);
        let nightly_price = segment
            .period
            .as_ref()
            .map(|p| p.nightly_price)
            .unwrap_or(default_nightly_price);
        let segment_total = nights * nightly_price;

        base_total += segment_total;
        total_nights += nights;
        segment_prices.push(SegmentPrice {
            period_id: segment.period.as_ref().map(|p| p.id),
            from: segment.from,
            to: segment.to,
            nights,
            nightly_price_eur: nightly_price,
            segment_total_eur: segment_total,
        });
    }

    let weekly_discount = apply_weekly_discount(
        base_total,
        total_nights,
        rules.weekly_threshold_nights,
        rules.weekly_discount_bps,
    );

    PriceBreakdown {
        segments: segment_prices,
        base_total_eur: base_total,
        weekly_discount_bps: if weekly_discount > 0 {
            rules.weekly_discount_bps
        } else {
            None
        },
        weekly_discount_eur: weekly_discount,
        total_eur: base_total - weekly_discount,
    }
}

/// Major units to cents for the payment side.
pub fn eur_to_cents(eur: i64) -> i64 {
    eur * 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::Period;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn period(start: &str, end: &str, price: i64) -> Period {
        let now = Utc::now();
        Period {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            start_date: d(start),
            end_date: d(end),
            is_open: true,
            nightly_price: price,
            weekly_discount_bps: None,
            weekly_threshold_nights: 7,
            min_nights: 1,
            max_guests: 6,
            name: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn segment(period: Option<Period>, from: &str, to: &str) -> CoverageSegment {
        CoverageSegment {
            period,
            from: d(from),
            to: d(to),
        }
    }

    fn no_discount() -> ArrivalRules {
        ArrivalRules {
            period_id: None,
            min_nights: 1,
            weekly_discount_bps: None,
            weekly_threshold_nights: 7,
        }
    }

    // ==================== apply_weekly_discount tests ====================

    #[test]
    fn test_discount_below_threshold_is_zero() {
        assert_eq!(apply_weekly_discount(700, 6, 7, Some(1000)), 0);
    }

    #[test]
    fn test_discount_at_threshold() {
        assert_eq!(apply_weekly_discount(700, 7, 7, Some(1000)), 70);
    }

    #[test]
    fn test_discount_none_configured() {
        assert_eq!(apply_weekly_discount(700, 10, 7, None), 0);
    }

    #[test]
    fn test_discount_floors() {
        // 333 * 1500 / 10000 = 49.95 -> 49
        assert_eq!(apply_weekly_discount(333, 7, 7, Some(1500)), 49);
    }

    #[test]
    fn test_discount_full_bps() {
        assert_eq!(apply_weekly_discount(700, 7, 7, Some(10_000)), 700);
    }

    // ==================== price_stay tests ====================

    #[test]
    fn test_three_nights_one_segment() {
        // [2026-02-01,2026-02-10) at 100/night, stay 02-03..02-06
        let p = period("2026-02-01", "2026-02-10", 100);
        let segments = vec![segment(Some(p), "2026-02-03", "2026-02-06")];
        let breakdown = price_stay(&segments, &no_discount(), 80);

        assert_eq!(breakdown.segments.len(), 1);
        assert_eq!(breakdown.segments[0].nights, 3);
        assert_eq!(breakdown.segments[0].segment_total_eur, 300);
        assert_eq!(breakdown.base_total_eur, 300);
        assert_eq!(breakdown.weekly_discount_eur, 0);
        assert_eq!(breakdown.total_eur, 300);
    }

    #[test]
    fn test_seven_nights_with_weekly_discount() {
        // base 700, 1000 bps -> discount 70, total 630
        let p = period("2026-02-01", "2026-02-10", 100);
        let segments = vec![segment(Some(p), "2026-02-01", "2026-02-08")];
        let rules = ArrivalRules {
            period_id: None,
            min_nights: 1,
            weekly_discount_bps: Some(1000),
            weekly_threshold_nights: 7,
        };
        let breakdown = price_stay(&segments, &rules, 80);

        assert_eq!(breakdown.base_total_eur, 700);
        assert_eq!(breakdown.weekly_discount_eur, 70);
        assert_eq!(breakdown.weekly_discount_bps, Some(1000));
        assert_eq!(breakdown.total_eur, 630);
    }

    #[test]
    fn test_uncovered_segment_uses_property_default() {
        let segments = vec![segment(None, "2026-02-03", "2026-02-05")];
        let breakdown = price_stay(&segments, &no_discount(), 80);
        assert_eq!(breakdown.segments[0].nightly_price_eur, 80);
        assert_eq!(breakdown.total_eur, 160);
    }

    #[test]
    fn test_mixed_segments_sum() {
        let p1 = period("2026-02-01", "2026-02-05", 100);
        let p2 = period("2026-02-07", "2026-02-12", 150);
        let segments = vec![
            segment(Some(p1), "2026-02-03", "2026-02-05"),
            segment(None, "2026-02-05", "2026-02-07"),
            segment(Some(p2), "2026-02-07", "2026-02-09"),
        ];
        let breakdown = price_stay(&segments, &no_discount(), 80);
        // 2*100 + 2*80 + 2*150 = 660
        assert_eq!(breakdown.base_total_eur, 660);
        assert_eq!(breakdown.total_eur, 660);
    }

    #[test]
    fn test_discount_counts_nights_across_segments() {
        // 4 + 3 nights crosses the threshold even though no single segment does
        let p1 = period("2026-02-01", "2026-02-05", 100);
        let segments = vec![
            segment(Some(p1), "2026-02-01", "2026-02-05"),
            segment(None, "2026-02-05", "2026-02-08"),
        ];
        let rules = ArrivalRules {
            period_id: None,
            min_nights: 1,
            weekly_discount_bps: Some(1000),
            weekly_threshold_nights: 7,
        };
        let breakdown = price_stay(&segments, &rules, 80);
        // base 400 + 240 = 640, discount 64
        assert_eq!(breakdown.base_total_eur, 640);
        assert_eq!(breakdown.weekly_discount_eur, 64);
        assert_eq!(breakdown.total_eur, 576);
    }

    #[test]
    fn test_price_determinism() {
        let p = period("2026-02-01", "2026-02-10", 100);
        let segments = vec![segment(Some(p), "2026-02-03", "2026-02-06")];
        let first = price_stay(&segments, &no_discount(), 80);
        let second = price_stay(&segments, &no_discount(), 80);
        assert_eq!(first, second);
    }

    #[test]
    fn test_eur_to_cents() {
        assert_eq!(eur_to_cents(630), 63_000);
        assert_eq!(eur_to_cents(0), 0);
    }
}
