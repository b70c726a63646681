//! Credit ledger operations.

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::Voucher;
use super::queries;

/// How one booking draws down the ledger: per-voucher takes, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub takes: Vec<(Uuid, i64)>,
    pub total_cents: i64,
}

/// Greedy walk over vouchers already sorted soonest-expiry-first: take
/// `min(remaining, still_due)` from each until the due amount is covered or
/// the ledger runs dry. Pure; powers both the estimate and the consume.
pub fn plan_allocation(vouchers: &[Voucher], due_cents: i64) -> AllocationPlan {
    let mut takes = Vec::new();
    let mut still_due = due_cents.max(0);

    for voucher in vouchers {
        if still_due == 0 {
            break;
        }
        let take = voucher.remaining_cents.min(still_due);
        if take > 0 {
            takes.push((voucher.id, take));
            still_due -= take;
        }
    }

    AllocationPlan {
        total_cents: due_cents.max(0) - still_due,
        takes,
    }
}

/// The planned takes must cover the requested amount exactly; anything less
/// means the ledger changed between the caller's estimate and the locked
/// re-read, and the surrounding transaction must abort.
fn verify_covers(plan: &AllocationPlan, amount_cents: i64) -> Result<()> {
    if plan.total_cents != amount_cents {
        return Err(AppError::StateViolation(format!(
            "credit mismatch: needed {} cents, ledger holds {}",
            amount_cents, plan.total_cents
        )));
    }
    Ok(())
}

/// Read-only estimate of how much credit a booking of `due_cents` could
/// absorb right now. Side-effect-free; used for quotes.
pub async fn estimate_applicable(
    pool: &PgPool,
    customer_id: Uuid,
    due_cents: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    let vouchers = queries::active_vouchers(pool, customer_id, now).await?;
    Ok(plan_allocation(&vouchers, due_cents).total_cents)
}

/// Consume exactly `amount_cents` of credit inside the caller's transaction.
///
/// Re-reads the vouchers under `FOR UPDATE`; if the lockable balance no
/// longer covers the requested amount (concurrent spend since the estimate)
/// the transaction must abort, never partially consume.
pub async fn consume(
    conn: &mut PgConnection,
    customer_id: Uuid,
    amount_cents: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    if amount_cents == 0 {
        return Ok(());
    }

    let vouchers = queries::active_vouchers_for_update(&mut *conn, customer_id, now).await?;
    let plan = plan_allocation(&vouchers, amount_cents);
    verify_covers(&plan, amount_cents)?;

    for (voucher_id, take) in &plan.takes {
        let updated = queries::decrement_voucher(&mut *conn, *voucher_id, *take).await?;
        if updated != 1 {
            return Err(AppError::StateViolation(format!(
                "credit mismatch: voucher {voucher_id} changed mid-transaction"
            )));
        }
        queries::delete_exhausted(&mut *conn, *voucher_id).await?;
    }

    tracing::info!(
        customer_id = %customer_id,
        amount_cents,
        vouchers = plan.takes.len(),
        "credit consumed"
    );

    Ok(())
}

/// Issue one voucher from a cancellation payout. Expires 12 months out so
/// the soonest-expiry-first ordering has a meaningful key.
pub async fn issue(
    conn: &mut PgConnection,
    customer_id: Uuid,
    amount_cents: i64,
    currency: &str,
    origin_booking_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Voucher> {
    let voucher = Voucher {
        id: Uuid::new_v4(),
        customer_id,
        issued_cents: amount_cents,
        remaining_cents: amount_cents,
        currency: currency.to_string(),
        expires_at: Some(now + Duration::days(365)),
        origin_booking_id: Some(origin_booking_id),
        created_at: now,
    };

    queries::insert_voucher(&mut *conn, &voucher).await?;

    tracing::info!(
        voucher_id = %voucher.id,
        customer_id = %customer_id,
        amount_cents,
        "voucher issued"
    );

    Ok(voucher)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(remaining: i64, expires_in_days: Option<i64>, created_offset_secs: i64) -> Voucher {
        let now = Utc::now();
        Voucher {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            issued_cents: remaining,
            remaining_cents: remaining,
            currency: "EUR".to_string(),
            expires_at: expires_in_days.map(|d| now + Duration::days(d)),
            origin_booking_id: None,
            created_at: now + Duration::seconds(created_offset_secs),
        }
    }

    #[test]
    fn test_allocation_spans_vouchers_in_order() {
        // {300 expiring in 5 days, 500 expiring in 30}, due 400
        let soon = voucher(300, Some(5), 0);
        let later = voucher(500, Some(30), 0);
        let plan = plan_allocation(&[soon.clone(), later.clone()], 400);

        assert_eq!(plan.total_cents, 400);
        assert_eq!(plan.takes, vec![(soon.id, 300), (later.id, 100)]);
    }

    #[test]
    fn test_allocation_stops_at_due() {
        let v = voucher(1000, None, 0);
        let plan = plan_allocation(&[v.clone()], 250);
        assert_eq!(plan.total_cents, 250);
        assert_eq!(plan.takes, vec![(v.id, 250)]);
    }

    #[test]
    fn test_allocation_exhausts_ledger() {
        let a = voucher(100, Some(5), 0);
        let b = voucher(50, Some(10), 0);
        let plan = plan_allocation(&[a.clone(), b.clone()], 400);
        assert_eq!(plan.total_cents, 150);
        assert_eq!(plan.takes.len(), 2);
    }

    #[test]
    fn test_allocation_empty_ledger() {
        let plan = plan_allocation(&[], 400);
        assert_eq!(plan.total_cents, 0);
        assert!(plan.takes.is_empty());
    }

    #[test]
    fn test_allocation_zero_due() {
        let v = voucher(300, Some(5), 0);
        let plan = plan_allocation(&[v], 0);
        assert_eq!(plan.total_cents, 0);
        assert!(plan.takes.is_empty());
    }

    #[test]
    fn test_consume_aborts_when_ledger_falls_short() {
        // A concurrent spend shrank the ledger below the amount the booking
        // transaction already committed to; the error propagates through
        // `consume` and rolls the whole transaction back.
        let vouchers = vec![voucher(150, Some(5), 0)];
        let plan = plan_allocation(&vouchers, 400);
        assert!(matches!(
            verify_covers(&plan, 400),
            Err(AppError::StateViolation(_))
        ));
    }

    #[test]
    fn test_consume_accepts_exact_coverage() {
        let vouchers = vec![voucher(150, Some(5), 0), voucher(250, Some(10), 0)];
        let plan = plan_allocation(&vouchers, 400);
        assert!(verify_covers(&plan, 400).is_ok());
    }

    #[test]
    fn test_allocation_conserves_cents() {
        let vouchers = vec![voucher(37, Some(1), 0), voucher(263, Some(2), 0), voucher(9, None, 0)];
        let due = 300;
        let plan = plan_allocation(&vouchers, due);
        let taken: i64 = plan.takes.iter().map(|(_, t)| t).sum();
        assert_eq!(taken, plan.total_cents);
        assert_eq!(plan.total_cents, 300);
        for (id, take) in &plan.takes {
            let v = vouchers.iter().find(|v| v.id == *id).unwrap();
            assert!(*take <= v.remaining_cents);
        }
    }
}
