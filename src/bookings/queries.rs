//! Database queries for bookings and payments.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{Booking, BookingStatus, Payment, PaymentStatus};

const BOOKING_COLUMNS: &str = r#"
    id, property_id, customer_id, booking_period_id, start_date, end_date,
    adults, children, babies, guest_name, guest_email,
    total_cents, currency, price_breakdown, status, created_at, updated_at
"#;

const PAYMENT_COLUMNS: &str = r#"
    id, booking_id, provider, status, amount_cents, refunded_cents,
    credits_applied_cents, currency, checkout_session_id, charge_ref,
    created_at, updated_at
"#;

pub async fn find_booking<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Booking>, AppError> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(booking)
}

/// Booking row locked for the rest of the transaction; state transitions
/// must not interleave.
pub async fn find_booking_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Booking>, AppError> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(booking)
}

pub async fn insert_booking<'e, E: PgExecutor<'e>>(
    executor: E,
    booking: &Booking,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, property_id, customer_id, booking_period_id, start_date, end_date,
            adults, children, babies, guest_name, guest_email,
            total_cents, currency, price_breakdown, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(booking.id)
    .bind(booking.property_id)
    .bind(booking.customer_id)
    .bind(booking.booking_period_id)
    .bind(booking.start_date)
    .bind(booking.end_date)
    .bind(booking.adults)
    .bind(booking.children)
    .bind(booking.babies)
    .bind(&booking.guest_name)
    .bind(&booking.guest_email)
    .bind(booking.total_cents)
    .bind(&booking.currency)
    .bind(&booking.price_breakdown)
    .bind(booking.status)
    .execute(executor)
    .await?;

    Ok(())
}

/// Status-guarded transition; returns affected row count so callers can
/// detect a lost race.
pub async fn transition_booking_status<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE bookings SET status = $3, updated_at = now() WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn insert_payment<'e, E: PgExecutor<'e>>(
    executor: E,
    payment: &Payment,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, booking_id, provider, status, amount_cents, refunded_cents,
            credits_applied_cents, currency, checkout_session_id, charge_ref
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(payment.id)
    .bind(payment.booking_id)
    .bind(payment.provider)
    .bind(payment.status)
    .bind(payment.amount_cents)
    .bind(payment.refunded_cents)
    .bind(payment.credits_applied_cents)
    .bind(&payment.currency)
    .bind(&payment.checkout_session_id)
    .bind(&payment.charge_ref)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn find_payment_for_booking<'e, E: PgExecutor<'e>>(
    executor: E,
    booking_id: Uuid,
) -> Result<Option<Payment>, AppError> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = $1"
    ))
    .bind(booking_id)
    .fetch_optional(executor)
    .await?;

    Ok(payment)
}

pub async fn find_payment_by_session<'e, E: PgExecutor<'e>>(
    executor: E,
    session_id: &str,
) -> Result<Option<Payment>, AppError> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE checkout_session_id = $1"
    ))
    .bind(session_id)
    .fetch_optional(executor)
    .await?;

    Ok(payment)
}

pub async fn set_checkout_session<'e, E: PgExecutor<'e>>(
    executor: E,
    payment_id: Uuid,
    session_id: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE payments SET checkout_session_id = $2, updated_at = now() WHERE id = $1",
    )
    .bind(payment_id)
    .bind(session_id)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn mark_payment_paid<'e, E: PgExecutor<'e>>(
    executor: E,
    payment_id: Uuid,
    charge_ref: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET status = 'paid', charge_ref = $2, updated_at = now()
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(payment_id)
    .bind(charge_ref)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Record a refund amount; the `refunded_cents <= amount_cents` guard is in
/// the WHERE clause as well as the schema CHECK.
pub async fn add_refund<'e, E: PgExecutor<'e>>(
    executor: E,
    payment_id: Uuid,
    refund_cents: i64,
    new_status: PaymentStatus,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET refunded_cents = refunded_cents + $2, status = $3, updated_at = now()
        WHERE id = $1 AND refunded_cents + $2 <= amount_cents
        "#,
    )
    .bind(payment_id)
    .bind(refund_cents)
    .bind(new_status)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
