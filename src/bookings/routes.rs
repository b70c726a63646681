//! Booking route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::identity::Identity;
use crate::AppState;

use super::models::Booking;
use super::requests::{ConfirmPaymentRequest, CreateBookingRequest, QuoteRequest};
use super::responses::{BookingResponse, CheckoutLinkResponse, QuoteResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings/quote", post(quote))
        .route("/api/bookings", post(create))
        .route("/api/bookings/:id", get(show))
        .route("/api/bookings/:id/checkout-link", post(checkout_link))
        .route("/api/payments/confirm", post(confirm_payment))
}

async fn quote(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let response = services::quote(&state.db, &state.cache, &identity, req, Utc::now()).await?;
    Ok(Json(response))
}

async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let response = services::create_booking(
        &state.db,
        &state.cache,
        state.gateway.as_ref(),
        &identity,
        req,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn show(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = services::get_booking(&state.db, &identity, id).await?;
    Ok(Json(booking))
}

async fn checkout_link(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutLinkResponse>> {
    let response = services::checkout_link(
        &state.db,
        &state.cache,
        state.gateway.as_ref(),
        &identity,
        id,
    )
    .await?;
    Ok(Json(response))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<Booking>> {
    let booking =
        services::confirm_payment(&state.db, &req.session_id, req.charge_ref.as_deref()).await?;
    Ok(Json(booking))
}
