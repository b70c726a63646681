//! Booking transaction orchestrator.
//!
//! One pipeline serves quotes and bookings:
//! validate -> capacity -> blocking overlap -> coverage -> min-nights ->
//! price -> branch (privileged / customer) -> persist.
//!
//! The persist step is a single transaction holding the property advisory
//! lock, so the overlap check and the insert are atomic with respect to
//! concurrent requests for the same property. The only external side effect
//! (checkout-session creation) happens after commit and its failure never
//! rolls the booking back.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::availability::{self, queries as availability_queries, ArrivalRules, Coverage};
use crate::calendar;
use crate::cache::AppCache;
use crate::credits;
use crate::db;
use crate::error::{AppError, Result};
use crate::gateway::PaymentGateway;
use crate::identity::Identity;
use crate::periods::queries as period_queries;
use crate::periods::Period;
use crate::pricing::{self, PriceBreakdown};
use crate::properties::{self, Property};
use crate::refunds::policy::ALL_TIERS;

use super::models::{Booking, BookingStatus, Payment, PaymentProvider, PaymentStatus};
use super::queries;
use super::requests::{CreateBookingRequest, QuoteRequest};
use super::responses::{BookingResponse, CheckoutLinkResponse, QuoteResponse, RefundPreviewTier};

struct ValidatedStay {
    start: NaiveDate,
    end: NaiveDate,
    nights: i64,
}

fn validate_stay(start_date: &str, end_date: &str) -> Result<ValidatedStay> {
    let start = calendar::normalize_date_only(start_date)?;
    let end = calendar::normalize_date_only(end_date)?;
    if end <= start {
        return Err(AppError::invalid_input(
            "INVALID_RANGE",
            format!("end_date {end} must be after start_date {start}"),
        ));
    }
    Ok(ValidatedStay {
        start,
        end,
        nights: calendar::nights_between(start, end),
    })
}

fn validate_guests(adults: i32, children: i32, babies: i32) -> Result<()> {
    if adults < 1 {
        return Err(AppError::invalid_input(
            "INVALID_GUESTS",
            "at least one adult is required",
        ));
    }
    if children < 0 || babies < 0 {
        return Err(AppError::invalid_input(
            "INVALID_GUESTS",
            "guest counts must not be negative",
        ));
    }
    Ok(())
}

/// Capacity and stay-rule checks shared by quote and create. Babies are
/// excluded from the counted guests.
fn check_rules(
    property: &Property,
    segments: &[availability::CoverageSegment],
    rules: &ArrivalRules,
    nights: i64,
    adults: i32,
    children: i32,
) -> Result<()> {
    let max_guests = availability::resolver::effective_max_guests(property.max_guests, segments);
    if adults + children > max_guests {
        return Err(AppError::invalid_input(
            "MAX_GUESTS_EXCEEDED",
            format!("stay allows at most {max_guests} guests"),
        ));
    }
    if nights < rules.min_nights as i64 {
        return Err(AppError::invalid_input(
            "MIN_NIGHTS",
            format!("stay requires at least {} nights", rules.min_nights),
        ));
    }
    Ok(())
}

fn closed_conflict(period_id: Uuid) -> AppError {
    AppError::conflict(
        "PERIOD_CLOSED",
        format!("stay includes a closed day (period {period_id})"),
    )
}

fn dates_unavailable() -> AppError {
    AppError::conflict("DATES_UNAVAILABLE", "the requested dates are already taken")
}

fn resolve_open_coverage(
    periods: &[Period],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<availability::CoverageSegment>> {
    match availability::resolve_coverage(periods, start, end) {
        Coverage::Open(segments) => Ok(segments),
        Coverage::Closed { period_id } => Err(closed_conflict(period_id)),
    }
}

fn refund_preview(payable_cents: i64) -> Vec<RefundPreviewTier> {
    ALL_TIERS
        .iter()
        .map(|&tier| RefundPreviewTier {
            tier,
            min_days_before: match tier {
                crate::refunds::RefundTier::Days60Plus => 60,
                crate::refunds::RefundTier::Days30To59 => 30,
                crate::refunds::RefundTier::Days15To29 => 15,
                crate::refunds::RefundTier::Under15 => 0,
            },
            cash_refund_cents: payable_cents * tier.cash_bps() / 10_000,
            voucher_cents: payable_cents * tier.voucher_bps() / 10_000,
        })
        .collect()
}

/// Price a stay without persisting anything or consuming credit. Pure over
/// current period/voucher state; amounts are always computed server-side.
pub async fn quote(
    pool: &PgPool,
    cache: &AppCache,
    identity: &Identity,
    req: QuoteRequest,
    now: DateTime<Utc>,
) -> Result<QuoteResponse> {
    let stay = validate_stay(&req.start_date, &req.end_date)?;
    validate_guests(req.adults, req.children, req.babies)?;

    let property = properties::get_property(pool, cache, req.property_id).await?;

    if availability_queries::is_range_blocked(pool, req.property_id, stay.start, stay.end).await? {
        return Err(dates_unavailable());
    }

    let periods =
        period_queries::periods_in_range(pool, req.property_id, stay.start, stay.end).await?;
    let segments = resolve_open_coverage(&periods, stay.start, stay.end)?;
    let rules = availability::resolver::arrival_rules(&segments, &property);
    check_rules(&property, &segments, &rules, stay.nights, req.adults, req.children)?;

    let breakdown = pricing::price_stay(&segments, &rules, property.default_nightly_price);
    let total_cents = pricing::eur_to_cents(breakdown.total_eur);

    let credit_applicable_cents = match (req.use_credit, identity.customer_id) {
        (true, Some(customer_id)) => {
            credits::estimate_applicable(pool, customer_id, total_cents, now).await?
        }
        _ => 0,
    };
    let payable_cents = total_cents - credit_applicable_cents;

    Ok(QuoteResponse {
        nights: stay.nights,
        effective_max_guests: availability::resolver::effective_max_guests(
            property.max_guests,
            &segments,
        ),
        total_cents,
        currency: property.currency.clone(),
        credit_applicable_cents,
        payable_cents,
        refund_preview: refund_preview(payable_cents),
        breakdown,
    })
}

/// Create a booking. See the module docs for the pipeline; everything up to
/// and including voucher consumption is one atomic unit.
pub async fn create_booking(
    pool: &PgPool,
    cache: &AppCache,
    gateway: &dyn PaymentGateway,
    identity: &Identity,
    req: CreateBookingRequest,
    now: DateTime<Utc>,
) -> Result<BookingResponse> {
    let stay = validate_stay(&req.start_date, &req.end_date)?;
    validate_guests(req.adults, req.children, req.babies)?;
    if req.guest_name.trim().is_empty() || req.guest_email.trim().is_empty() {
        return Err(AppError::invalid_input(
            "MISSING_CONTACT",
            "guest_name and guest_email are required",
        ));
    }
    if !identity.is_admin() {
        // Customers must be authenticated before we touch inventory.
        identity.require_customer()?;
    }

    let property = properties::get_property(pool, cache, req.property_id).await?;

    let mut tx = pool.begin().await?;
    // Serializes the overlap check and the insert per property.
    db::lock_property(&mut tx, req.property_id).await?;

    if availability_queries::is_range_blocked(&mut *tx, req.property_id, stay.start, stay.end)
        .await?
    {
        return Err(dates_unavailable());
    }

    let periods =
        period_queries::periods_in_range(&mut *tx, req.property_id, stay.start, stay.end).await?;
    let segments = resolve_open_coverage(&periods, stay.start, stay.end)?;
    let rules = availability::resolver::arrival_rules(&segments, &property);
    check_rules(&property, &segments, &rules, stay.nights, req.adults, req.children)?;

    let breakdown = pricing::price_stay(&segments, &rules, property.default_nightly_price);
    let gross_cents = pricing::eur_to_cents(breakdown.total_eur);

    let (status, provider, amount_cents, credits_applied_cents) = if identity.is_admin() {
        (BookingStatus::Confirmed, PaymentProvider::Admin, 0, 0)
    } else {
        let customer_id = identity.require_customer()?;
        let credits_applied = if req.use_credit {
            let vouchers =
                credits::queries::active_vouchers_for_update(&mut *tx, customer_id, now).await?;
            credits::plan_allocation(&vouchers, gross_cents).total_cents
        } else {
            0
        };
        let payable = gross_cents - credits_applied;
        if payable == 0 {
            (BookingStatus::Confirmed, PaymentProvider::Admin, 0, credits_applied)
        } else {
            (BookingStatus::Pending, PaymentProvider::Stripe, payable, credits_applied)
        }
    };

    let breakdown_json = serde_json::to_value(&breakdown)
        .map_err(|e| AppError::StateViolation(format!("breakdown serialization failed: {e}")))?;

    let booking = Booking {
        id: Uuid::new_v4(),
        property_id: req.property_id,
        customer_id: identity.customer_id,
        booking_period_id: rules.period_id,
        start_date: stay.start,
        end_date: stay.end,
        adults: req.adults,
        children: req.children,
        babies: req.babies,
        guest_name: req.guest_name,
        guest_email: req.guest_email,
        total_cents: gross_cents,
        currency: property.currency.clone(),
        price_breakdown: breakdown_json,
        status,
        created_at: now,
        updated_at: now,
    };
    let payment = Payment {
        id: Uuid::new_v4(),
        booking_id: booking.id,
        provider,
        status: if amount_cents == 0 {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        },
        amount_cents,
        refunded_cents: 0,
        credits_applied_cents,
        currency: property.currency.clone(),
        checkout_session_id: None,
        charge_ref: None,
        created_at: now,
        updated_at: now,
    };

    queries::insert_booking(&mut *tx, &booking).await?;
    queries::insert_payment(&mut *tx, &payment).await?;

    if credits_applied_cents > 0 {
        let customer_id = identity.require_customer()?;
        // Aborts the whole transaction on any ledger mismatch.
        credits::consume(&mut tx, customer_id, credits_applied_cents, now).await?;
    }

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        property_id = %booking.property_id,
        status = ?booking.status,
        total_cents = gross_cents,
        credits_applied_cents,
        "booking created"
    );

    // External side effect after commit: its failure leaves the booking
    // pending for reconciliation, it never unwinds the transaction.
    let (checkout_url, checkout_error) = if amount_cents > 0 {
        match gateway
            .create_checkout_session(booking.id, amount_cents, &payment.currency, &property.name)
            .await
        {
            Ok(session) => {
                queries::set_checkout_session(pool, payment.id, &session.session_id).await?;
                (Some(session.url), None)
            }
            Err(e) => {
                tracing::error!(booking_id = %booking.id, "checkout session failed: {}", e);
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    Ok(BookingResponse {
        booking,
        payment,
        breakdown,
        checkout_url,
        checkout_error,
    })
}

/// Gateway confirmation callback: flip the pending booking to confirmed.
/// Idempotent for replayed callbacks.
pub async fn confirm_payment(
    pool: &PgPool,
    session_id: &str,
    charge_ref: Option<&str>,
) -> Result<Booking> {
    let payment = queries::find_payment_by_session(pool, session_id)
        .await?
        .ok_or(AppError::NotFound("payment"))?;

    let mut tx = pool.begin().await?;

    let booking = queries::find_booking_for_update(&mut *tx, payment.booking_id)
        .await?
        .ok_or(AppError::NotFound("booking"))?;

    match booking.status {
        BookingStatus::Confirmed => return Ok(booking),
        BookingStatus::Pending => {}
        _ => {
            return Err(AppError::conflict(
                "BOOKING_NOT_ACTIVE",
                format!("booking {} can no longer be confirmed", booking.id),
            ))
        }
    }

    let paid =
        queries::mark_payment_paid(&mut *tx, payment.id, charge_ref.unwrap_or(session_id)).await?;
    if paid != 1 {
        return Err(AppError::StateViolation(format!(
            "payment {} not in pending state",
            payment.id
        )));
    }

    let transitioned = queries::transition_booking_status(
        &mut *tx,
        booking.id,
        BookingStatus::Pending,
        BookingStatus::Confirmed,
    )
    .await?;
    if transitioned != 1 {
        return Err(AppError::StateViolation(format!(
            "booking {} changed status during confirmation",
            booking.id
        )));
    }

    tx.commit().await?;

    tracing::info!(booking_id = %booking.id, "booking confirmed by gateway callback");

    queries::find_booking(pool, booking.id)
        .await?
        .ok_or(AppError::NotFound("booking"))
}

/// Re-create a checkout session for a pending booking whose earlier session
/// creation failed or expired.
pub async fn checkout_link(
    pool: &PgPool,
    cache: &AppCache,
    gateway: &dyn PaymentGateway,
    identity: &Identity,
    booking_id: Uuid,
) -> Result<CheckoutLinkResponse> {
    let booking = queries::find_booking(pool, booking_id)
        .await?
        .ok_or(AppError::NotFound("booking"))?;

    if !identity.is_admin() {
        let customer_id = identity.require_customer()?;
        if booking.customer_id != Some(customer_id) {
            return Err(AppError::Forbidden("booking belongs to another customer"));
        }
    }

    if booking.status != BookingStatus::Pending {
        return Err(AppError::conflict(
            "BOOKING_NOT_ACTIVE",
            "only pending bookings take a payment link",
        ));
    }

    let payment = queries::find_payment_for_booking(pool, booking_id)
        .await?
        .ok_or(AppError::NotFound("payment"))?;
    if payment.provider != PaymentProvider::Stripe || payment.status != PaymentStatus::Pending {
        return Err(AppError::conflict(
            "NOTHING_PAYABLE",
            "this booking has no outstanding payment",
        ));
    }

    let property = properties::get_property(pool, cache, booking.property_id).await?;
    let session = gateway
        .create_checkout_session(booking.id, payment.amount_cents, &payment.currency, &property.name)
        .await?;
    queries::set_checkout_session(pool, payment.id, &session.session_id).await?;

    Ok(CheckoutLinkResponse {
        checkout_url: session.url,
    })
}

/// Fetch a booking for its owner or an administrator.
pub async fn get_booking(pool: &PgPool, identity: &Identity, booking_id: Uuid) -> Result<Booking> {
    let booking = queries::find_booking(pool, booking_id)
        .await?
        .ok_or(AppError::NotFound("booking"))?;

    if !identity.is_admin() {
        let customer_id = identity.require_customer()?;
        if booking.customer_id != Some(customer_id) {
            return Err(AppError::Forbidden("booking belongs to another customer"));
        }
    }

    Ok(booking)
}
