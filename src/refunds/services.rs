//! Cancellation and refund-request flows.
//!
//! Two refund paths: automatic (policy-driven cancellation, refund computed
//! and persisted in the cancellation transaction, gateway payout after
//! commit) and admin-approved (a pending request; cash moves only after
//! explicit admin action, and only up to the remaining refundable balance).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::bookings::models::{Booking, BookingStatus, Payment, PaymentProvider, PaymentStatus};
use crate::bookings::queries as booking_queries;
use crate::credits;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::identity::Identity;

use super::models::{RefundRequest, RefundRequestStatus};
use super::policy::{self, RefundOutcome};
use super::queries;

#[derive(Debug, Serialize)]
pub struct CancellationPreview {
    pub booking_id: Uuid,
    pub days_before_check_in: i64,
    pub outcome: RefundOutcome,
}

#[derive(Debug, Serialize)]
pub struct CancellationResult {
    pub booking_id: Uuid,
    pub outcome: RefundOutcome,
    pub voucher_id: Option<Uuid>,
    /// Cancellation is committed; cash payout failed and needs a retry.
    pub gateway_refund_failed: bool,
}

fn authorize(booking: &Booking, identity: &Identity) -> Result<()> {
    if identity.is_admin() {
        return Ok(());
    }
    let customer_id = identity.require_customer()?;
    if booking.customer_id != Some(customer_id) {
        return Err(AppError::Forbidden("booking belongs to another customer"));
    }
    Ok(())
}

/// Cash the platform still holds for this payment: nothing for a never-paid
/// payment, otherwise the charged amount minus refunds already made. Both
/// the cash and the voucher component of a cancellation are computed over
/// this base, so prior refunds shrink both.
fn cash_held_cents(payment: &Payment) -> i64 {
    match payment.status {
        PaymentStatus::Pending => 0,
        _ => payment.refundable_cents(),
    }
}

pub async fn preview_cancellation(
    pool: &PgPool,
    booking_id: Uuid,
    identity: &Identity,
    now: DateTime<Utc>,
) -> Result<CancellationPreview> {
    let booking = booking_queries::find_booking(pool, booking_id)
        .await?
        .ok_or(AppError::NotFound("booking"))?;
    authorize(&booking, identity)?;

    if !matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ) {
        return Err(AppError::conflict(
            "BOOKING_NOT_ACTIVE",
            format!("booking {booking_id} is not cancellable in its current status"),
        ));
    }

    let payment = booking_queries::find_payment_for_booking(pool, booking_id)
        .await?
        .ok_or(AppError::NotFound("payment"))?;

    let days = policy::days_before_start(now, booking.start_date);
    let outcome = policy::compute_outcome(days, cash_held_cents(&payment));

    Ok(CancellationPreview {
        booking_id,
        days_before_check_in: days,
        outcome,
    })
}

pub async fn cancel_booking(
    pool: &PgPool,
    gateway: &dyn PaymentGateway,
    booking_id: Uuid,
    identity: &Identity,
    now: DateTime<Utc>,
) -> Result<CancellationResult> {
    let mut tx = pool.begin().await?;

    let booking = booking_queries::find_booking_for_update(&mut *tx, booking_id)
        .await?
        .ok_or(AppError::NotFound("booking"))?;
    authorize(&booking, identity)?;

    if !matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ) {
        return Err(AppError::conflict(
            "BOOKING_NOT_ACTIVE",
            format!("booking {booking_id} is not cancellable in its current status"),
        ));
    }

    let payment = booking_queries::find_payment_for_booking(&mut *tx, booking_id)
        .await?
        .ok_or(AppError::NotFound("payment"))?;

    let days = policy::days_before_start(now, booking.start_date);
    let outcome = policy::compute_outcome(days, cash_held_cents(&payment));

    let transitioned =
        booking_queries::transition_booking_status(&mut *tx, booking_id, booking.status, BookingStatus::Cancelled)
            .await?;
    if transitioned != 1 {
        return Err(AppError::StateViolation(format!(
            "booking {booking_id} changed status mid-cancellation"
        )));
    }

    if outcome.refund_cents > 0 {
        let new_status = if outcome.refund_cents == payment.refundable_cents() {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        let updated =
            booking_queries::add_refund(&mut *tx, payment.id, outcome.refund_cents, new_status)
                .await?;
        if updated != 1 {
            return Err(AppError::StateViolation(format!(
                "payment {} refund exceeded refundable balance",
                payment.id
            )));
        }
    }

    let mut voucher_id = None;
    if outcome.voucher_cents > 0 {
        if let Some(customer_id) = booking.customer_id {
            let voucher = credits::issue(
                &mut tx,
                customer_id,
                outcome.voucher_cents,
                &payment.currency,
                booking_id,
                now,
            )
            .await?;
            voucher_id = Some(voucher.id);
        }
    }

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        days_before = days,
        refund_cents = outcome.refund_cents,
        voucher_cents = outcome.voucher_cents,
        "booking cancelled"
    );

    // Cash payout happens outside the transaction; a failure leaves the
    // committed cancellation in place and is reconciled out of band.
    let mut gateway_refund_failed = false;
    if outcome.refund_cents > 0 && payment.provider == PaymentProvider::Stripe {
        match &payment.charge_ref {
            Some(charge_ref) => {
                if let Err(e) = gateway.refund(charge_ref, outcome.refund_cents).await {
                    tracing::error!(booking_id = %booking_id, "gateway refund failed: {}", e);
                    gateway_refund_failed = true;
                }
            }
            None => {
                tracing::error!(booking_id = %booking_id, "refund due but no charge reference");
                gateway_refund_failed = true;
            }
        }
    }

    Ok(CancellationResult {
        booking_id,
        outcome,
        voucher_id,
        gateway_refund_failed,
    })
}

pub async fn request_refund(
    pool: &PgPool,
    booking_id: Uuid,
    identity: &Identity,
    reason: Option<String>,
) -> Result<RefundRequest> {
    let customer_id = identity.require_customer()?;

    let booking = booking_queries::find_booking(pool, booking_id)
        .await?
        .ok_or(AppError::NotFound("booking"))?;
    if booking.customer_id != Some(customer_id) {
        return Err(AppError::Forbidden("booking belongs to another customer"));
    }

    let payment = booking_queries::find_payment_for_booking(pool, booking_id)
        .await?
        .ok_or(AppError::NotFound("payment"))?;
    if payment.refundable_cents() == 0 || payment.status == PaymentStatus::Pending {
        return Err(AppError::conflict(
            "NOTHING_REFUNDABLE",
            "no refundable cash remains on this booking",
        ));
    }

    if queries::pending_for_booking(pool, booking_id).await?.is_some() {
        return Err(AppError::conflict(
            "REQUEST_EXISTS",
            "a refund request for this booking is already pending",
        ));
    }

    let request = RefundRequest {
        id: Uuid::new_v4(),
        booking_id,
        customer_id,
        reason,
        status: RefundRequestStatus::Pending,
        requested_cents: Some(payment.refundable_cents()),
        refunded_cents: None,
        created_at: Utc::now(),
        resolved_at: None,
    };
    queries::insert_refund_request(pool, &request).await?;

    tracing::info!(request_id = %request.id, booking_id = %booking_id, "refund request created");

    Ok(request)
}

#[derive(Debug, Serialize)]
pub struct ApprovalResult {
    pub request_id: Uuid,
    pub refunded_cents: i64,
    pub gateway_refund_failed: bool,
}

/// Approve a pending request: refunds the remaining refundable balance,
/// never more, regardless of what was originally requested.
pub async fn approve_refund_request(
    pool: &PgPool,
    gateway: &dyn PaymentGateway,
    request_id: Uuid,
) -> Result<ApprovalResult> {
    let mut tx = pool.begin().await?;

    let request = queries::find_refund_request(&mut *tx, request_id)
        .await?
        .ok_or(AppError::NotFound("refund request"))?;
    if request.status != RefundRequestStatus::Pending {
        return Err(AppError::conflict(
            "REQUEST_RESOLVED",
            "refund request is already resolved",
        ));
    }

    let payment = booking_queries::find_payment_for_booking(&mut *tx, request.booking_id)
        .await?
        .ok_or(AppError::NotFound("payment"))?;

    let refund_cents = payment.refundable_cents();
    if refund_cents == 0 {
        return Err(AppError::conflict(
            "NOTHING_REFUNDABLE",
            "no refundable cash remains on this booking",
        ));
    }

    let updated =
        booking_queries::add_refund(&mut *tx, payment.id, refund_cents, PaymentStatus::Refunded)
            .await?;
    if updated != 1 {
        return Err(AppError::StateViolation(format!(
            "payment {} refund exceeded refundable balance",
            payment.id
        )));
    }

    let resolved = queries::resolve_refund_request(
        &mut *tx,
        request_id,
        RefundRequestStatus::Approved,
        Some(refund_cents),
    )
    .await?;
    if resolved != 1 {
        return Err(AppError::StateViolation(format!(
            "refund request {request_id} resolved concurrently"
        )));
    }

    tx.commit().await?;

    let mut gateway_refund_failed = false;
    match &payment.charge_ref {
        Some(charge_ref) if payment.provider == PaymentProvider::Stripe => {
            if let Err(e) = gateway.refund(charge_ref, refund_cents).await {
                tracing::error!(request_id = %request_id, "gateway refund failed: {}", e);
                gateway_refund_failed = true;
            }
        }
        _ => {}
    }

    tracing::info!(request_id = %request_id, refund_cents, "refund request approved");

    Ok(ApprovalResult {
        request_id,
        refunded_cents: refund_cents,
        gateway_refund_failed,
    })
}

pub async fn reject_refund_request(pool: &PgPool, request_id: Uuid) -> Result<()> {
    let resolved =
        queries::resolve_refund_request(pool, request_id, RefundRequestStatus::Rejected, None)
            .await?;
    if resolved != 1 {
        return Err(AppError::conflict(
            "REQUEST_RESOLVED",
            "refund request is already resolved",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: PaymentStatus, amount_cents: i64, refunded_cents: i64) -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            provider: PaymentProvider::Stripe,
            status,
            amount_cents,
            refunded_cents,
            credits_applied_cents: 0,
            currency: "EUR".to_string(),
            checkout_session_id: None,
            charge_ref: Some("pi_123".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fully_refunded_payment_yields_no_voucher() {
        // Cash already paid back through an approved refund request; a later
        // cancellation must not mint a voucher on top of it.
        let p = payment(PaymentStatus::Refunded, 100_000, 100_000);
        assert_eq!(cash_held_cents(&p), 0);
        let outcome = policy::compute_outcome(5, cash_held_cents(&p));
        assert_eq!(outcome.refund_cents, 0);
        assert_eq!(outcome.voucher_cents, 0);
    }

    #[test]
    fn test_partial_refund_shrinks_both_components() {
        let p = payment(PaymentStatus::PartiallyRefunded, 100_000, 40_000);
        assert_eq!(cash_held_cents(&p), 60_000);
        let outcome = policy::compute_outcome(5, cash_held_cents(&p));
        assert_eq!(outcome.refund_cents, 0);
        assert_eq!(outcome.voucher_cents, 48_000);

        let outcome = policy::compute_outcome(90, cash_held_cents(&p));
        assert_eq!(outcome.refund_cents, 60_000);
    }

    #[test]
    fn test_unpaid_payment_has_nothing_to_pay_out() {
        let p = payment(PaymentStatus::Pending, 100_000, 0);
        assert_eq!(cash_held_cents(&p), 0);
    }

    #[test]
    fn test_total_payout_never_exceeds_cash_held() {
        for refunded in [0, 25_000, 100_000] {
            let p = payment(PaymentStatus::PartiallyRefunded, 100_000, refunded);
            for days in [0, 20, 45, 90] {
                let outcome = policy::compute_outcome(days, cash_held_cents(&p));
                assert!(outcome.refund_cents + outcome.voucher_cents <= p.refundable_cents());
            }
        }
    }
}
