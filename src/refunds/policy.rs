//! Refund policy: days-before-check-in tiers.
//!
//! The tier table is a fixed business rule, not runtime configuration. Cash
//! and voucher percentages are computed independently and deliberately need
//! not sum to 100% (the last tier forfeits 20%).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundTier {
    /// >= 60 days out: full cash refund
    Days60Plus,
    /// 30-59 days: half cash
    Days30To59,
    /// 15-29 days: quarter cash
    Days15To29,
    /// 0-14 days: no cash, 80% voucher
    Under15,
}

impl RefundTier {
    /// First matching tier, ordered.
    pub fn for_days_before(days: i64) -> Self {
        if days >= 60 {
            RefundTier::Days60Plus
        } else if days >= 30 {
            RefundTier::Days30To59
        } else if days >= 15 {
            RefundTier::Days15To29
        } else {
            RefundTier::Under15
        }
    }

    pub fn cash_bps(self) -> i64 {
        match self {
            RefundTier::Days60Plus => 10_000,
            RefundTier::Days30To59 => 5_000,
            RefundTier::Days15To29 => 2_500,
            RefundTier::Under15 => 0,
        }
    }

    pub fn voucher_bps(self) -> i64 {
        match self {
            RefundTier::Under15 => 8_000,
            _ => 0,
        }
    }
}

/// All four tiers in order, for policy previews.
pub const ALL_TIERS: [RefundTier; 4] = [
    RefundTier::Days60Plus,
    RefundTier::Days30To59,
    RefundTier::Days15To29,
    RefundTier::Under15,
];

/// Whole days between `now` and check-in midnight, floored, clamped to >= 0.
/// A stay already in progress (or past) lands in the last tier.
pub fn days_before_start(now: DateTime<Utc>, check_in: NaiveDate) -> i64 {
    let check_in_midnight = check_in.and_time(chrono::NaiveTime::MIN).and_utc();
    (check_in_midnight - now).num_days().max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefundOutcome {
    pub tier: RefundTier,
    pub refund_cents: i64,
    pub voucher_cents: i64,
}

/// Cash/voucher split for a cancellation, floor bps math on each component
/// independently. `base_cents` is the cash actually charged; credit applied
/// to the booking is never refundable and never enters this computation.
pub fn compute_outcome(days_before: i64, base_cents: i64) -> RefundOutcome {
    let tier = RefundTier::for_days_before(days_before);
    RefundOutcome {
        tier,
        refund_cents: base_cents * tier.cash_bps() / 10_000,
        voucher_cents: base_cents * tier.voucher_bps() / 10_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RefundTier::for_days_before(365), RefundTier::Days60Plus);
        assert_eq!(RefundTier::for_days_before(60), RefundTier::Days60Plus);
        assert_eq!(RefundTier::for_days_before(59), RefundTier::Days30To59);
        assert_eq!(RefundTier::for_days_before(30), RefundTier::Days30To59);
        assert_eq!(RefundTier::for_days_before(29), RefundTier::Days15To29);
        assert_eq!(RefundTier::for_days_before(15), RefundTier::Days15To29);
        assert_eq!(RefundTier::for_days_before(14), RefundTier::Under15);
        assert_eq!(RefundTier::for_days_before(0), RefundTier::Under15);
    }

    #[test]
    fn test_days_before_start_floors_partial_days() {
        let check_in = d("2026-03-01");
        let now = Utc.with_ymd_and_hms(2026, 2, 27, 12, 0, 0).unwrap();
        // 1.5 days out floors to 1
        assert_eq!(days_before_start(now, check_in), 1);
    }

    #[test]
    fn test_days_before_start_clamps_past_stays() {
        let check_in = d("2026-03-01");
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(days_before_start(now, check_in), 0);
    }

    #[test]
    fn test_outcome_20_days_quarter_cash() {
        // 20 days before, 1000 EUR cash -> 250 refund, 0 voucher
        let outcome = compute_outcome(20, 100_000);
        assert_eq!(outcome.tier, RefundTier::Days15To29);
        assert_eq!(outcome.refund_cents, 25_000);
        assert_eq!(outcome.voucher_cents, 0);
    }

    #[test]
    fn test_outcome_5_days_voucher_only() {
        // 5 days before, 1000 EUR -> 0 cash, 800 voucher
        let outcome = compute_outcome(5, 100_000);
        assert_eq!(outcome.tier, RefundTier::Under15);
        assert_eq!(outcome.refund_cents, 0);
        assert_eq!(outcome.voucher_cents, 80_000);
    }

    #[test]
    fn test_outcome_floors() {
        // 333 cents at 25% -> 83.25 floors to 83
        let outcome = compute_outcome(20, 333);
        assert_eq!(outcome.refund_cents, 83);
        // 333 at 80% voucher -> 266.4 floors to 266
        let outcome = compute_outcome(3, 333);
        assert_eq!(outcome.voucher_cents, 266);
    }

    #[test]
    fn test_cash_refund_monotonically_decreases() {
        let base = 100_000;
        let mut previous = i64::MAX;
        for days in (0..=90).rev() {
            let refund = compute_outcome(days, base).refund_cents;
            assert!(refund <= previous, "refund increased as check-in neared");
            previous = refund;
        }
    }

    #[test]
    fn test_voucher_only_in_last_tier() {
        for tier in ALL_TIERS {
            if tier == RefundTier::Under15 {
                assert_eq!(tier.voucher_bps(), 8_000);
            } else {
                assert_eq!(tier.voucher_bps(), 0);
            }
        }
    }

    #[test]
    fn test_under15_forfeits_20_percent() {
        let outcome = compute_outcome(5, 10_000);
        assert_eq!(outcome.refund_cents + outcome.voucher_cents, 8_000);
    }
}
