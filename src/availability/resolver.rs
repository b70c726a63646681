//! Coverage resolution: partition a requested stay into period segments.
//!
//! Pure over an already-fetched period set, so the same walk serves quotes,
//! bookings and tests without touching the database.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::periods::Period;
use crate::properties::Property;

/// A maximal sub-range of a stay attributable to one period (or none:
/// property defaults apply).
#[derive(Debug, Clone)]
pub struct CoverageSegment {
    pub period: Option<Period>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone)]
pub enum Coverage {
    Open(Vec<CoverageSegment>),
    /// A single closed day anywhere in the stay rejects the whole request.
    Closed { period_id: Uuid },
}

/// Rules governing the whole stay, taken from the arrival segment only
/// (Booking.com-style arrival-rule semantics, deliberately not per-segment).
#[derive(Debug, Clone, Copy)]
pub struct ArrivalRules {
    pub period_id: Option<Uuid>,
    pub min_nights: i32,
    pub weekly_discount_bps: Option<i32>,
    pub weekly_threshold_nights: i32,
}

/// Walk the nights of `[start, end)` and build maximal contiguous segments.
///
/// Periods never overlap (registry invariant), so each night belongs to at
/// most one. Callers must ensure `end > start`.
pub fn resolve_coverage(periods: &[Period], start: NaiveDate, end: NaiveDate) -> Coverage {
    let mut segments: Vec<CoverageSegment> = Vec::new();
    let mut day = start;

    while day < end {
        let covering = periods.iter().find(|p| p.covers(day));

        if let Some(period) = covering {
            if !period.is_open {
                return Coverage::Closed {
                    period_id: period.id,
                };
            }
        }

        let current_id = covering.map(|p| p.id);
        match segments.last_mut() {
            Some(last) if last.period.as_ref().map(|p| p.id) == current_id => {
                last.to = next_day(day);
            }
            _ => segments.push(CoverageSegment {
                period: covering.cloned(),
                from: day,
                to: next_day(day),
            }),
        }

        day = next_day(day);
    }

    Coverage::Open(segments)
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day + Days::new(1)
}

/// Min-nights and weekly-discount parameters for the stay, from the first
/// segment's period or the property defaults when uncovered.
pub fn arrival_rules(segments: &[CoverageSegment], property: &Property) -> ArrivalRules {
    match segments.first().and_then(|s| s.period.as_ref()) {
        Some(period) => ArrivalRules {
            period_id: Some(period.id),
            min_nights: period.min_nights,
            weekly_discount_bps: period.weekly_discount_bps,
            weekly_threshold_nights: period.weekly_threshold_nights,
        },
        None => ArrivalRules {
            period_id: None,
            min_nights: property.default_min_nights,
            weekly_discount_bps: None,
            weekly_threshold_nights: 7,
        },
    }
}

/// Most restrictive guest cap across the stay: the minimum of the property
/// default and every covered segment's period cap.
pub fn effective_max_guests(property_max: i32, segments: &[CoverageSegment]) -> i32 {
    segments
        .iter()
        .filter_map(|s| s.period.as_ref().map(|p| p.max_guests))
        .fold(property_max, i32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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

    fn property(max_guests: i32) -> Property {
        let now = Utc::now();
        Property {
            id: Uuid::new_v4(),
            name: "Villa Test".to_string(),
            currency: "EUR".to_string(),
            default_nightly_price: 80,
            default_min_nights: 1,
            max_guests,
            created_at: now,
            updated_at: now,
        }
    }

    fn open_segments(coverage: Coverage) -> Vec<CoverageSegment> {
        match coverage {
            Coverage::Open(segments) => segments,
            Coverage::Closed { .. } => panic!("expected open coverage"),
        }
    }

    #[test]
    fn test_single_period_single_segment() {
        let p = period("2026-02-01", "2026-02-10", 100);
        let segments = open_segments(resolve_coverage(
            std::slice::from_ref(&p),
            d("2026-02-03"),
            d("2026-02-06"),
        ));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from, d("2026-02-03"));
        assert_eq!(segments[0].to, d("2026-02-06"));
        assert_eq!(segments[0].period.as_ref().unwrap().id, p.id);
    }

    #[test]
    fn test_uncovered_stay_is_one_null_segment() {
        let segments = open_segments(resolve_coverage(&[], d("2026-02-03"), d("2026-02-06")));
        assert_eq!(segments.len(), 1);
        assert!(segments[0].period.is_none());
    }

    #[test]
    fn test_stay_spanning_two_periods_and_a_gap() {
        let p1 = period("2026-02-01", "2026-02-05", 100);
        let p2 = period("2026-02-07", "2026-02-12", 150);
        let segments = open_segments(resolve_coverage(
            &[p1.clone(), p2.clone()],
            d("2026-02-03"),
            d("2026-02-09"),
        ));
        // Feb 3-4 in p1, Feb 5-6 uncovered, Feb 7-8 in p2
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].period.as_ref().unwrap().id, p1.id);
        assert_eq!(segments[0].to, d("2026-02-05"));
        assert!(segments[1].period.is_none());
        assert_eq!(segments[1].from, d("2026-02-05"));
        assert_eq!(segments[1].to, d("2026-02-07"));
        assert_eq!(segments[2].period.as_ref().unwrap().id, p2.id);
        assert_eq!(segments[2].to, d("2026-02-09"));
    }

    #[test]
    fn test_checkout_day_not_resolved() {
        // Stay ends the day a closed period begins: never touches it
        let mut closed = period("2026-02-10", "2026-02-20", 100);
        closed.is_open = false;
        let open = period("2026-02-01", "2026-02-10", 100);
        let coverage = resolve_coverage(&[open, closed], d("2026-02-08"), d("2026-02-10"));
        assert!(matches!(coverage, Coverage::Open(_)));
    }

    #[test]
    fn test_closed_period_rejects_whole_stay() {
        let open = period("2026-02-01", "2026-02-05", 100);
        let mut closed = period("2026-02-05", "2026-02-10", 100);
        closed.is_open = false;
        let coverage = resolve_coverage(
            &[open, closed.clone()],
            d("2026-02-03"),
            d("2026-02-07"),
        );
        match coverage {
            Coverage::Closed { period_id } => assert_eq!(period_id, closed.id),
            Coverage::Open(_) => panic!("expected closed coverage"),
        }
    }

    #[test]
    fn test_arrival_rules_come_from_first_segment_only() {
        let mut p1 = period("2026-02-01", "2026-02-05", 100);
        p1.min_nights = 3;
        p1.weekly_discount_bps = Some(1000);
        let mut p2 = period("2026-02-05", "2026-02-12", 150);
        p2.min_nights = 7;
        p2.weekly_discount_bps = Some(2000);

        let segments = open_segments(resolve_coverage(
            &[p1.clone(), p2],
            d("2026-02-03"),
            d("2026-02-09"),
        ));
        let rules = arrival_rules(&segments, &property(8));
        assert_eq!(rules.period_id, Some(p1.id));
        assert_eq!(rules.min_nights, 3);
        assert_eq!(rules.weekly_discount_bps, Some(1000));
    }

    #[test]
    fn test_arrival_rules_fall_back_to_property_defaults() {
        let mut prop = property(8);
        prop.default_min_nights = 2;
        let segments = open_segments(resolve_coverage(&[], d("2026-02-03"), d("2026-02-06")));
        let rules = arrival_rules(&segments, &prop);
        assert!(rules.period_id.is_none());
        assert_eq!(rules.min_nights, 2);
        assert!(rules.weekly_discount_bps.is_none());
    }

    #[test]
    fn test_effective_max_guests_most_restrictive_wins() {
        let mut p1 = period("2026-02-01", "2026-02-05", 100);
        p1.max_guests = 4;
        let mut p2 = period("2026-02-05", "2026-02-12", 150);
        p2.max_guests = 10;

        let segments = open_segments(resolve_coverage(
            &[p1, p2],
            d("2026-02-03"),
            d("2026-02-09"),
        ));
        assert_eq!(effective_max_guests(8, &segments), 4);

        let uncovered = open_segments(resolve_coverage(&[], d("2026-03-01"), d("2026-03-03")));
        assert_eq!(effective_max_guests(8, &uncovered), 8);
    }
}
