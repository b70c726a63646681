//! Availability & pricing engine for the Solvista rental platform.
//!
//! Decides whether a date range can be booked, what it costs, how a
//! cancellation is refunded and how stored credit is consumed. Everything
//! else (auth, rendering, calendar import scheduling, notifications) lives
//! upstream and talks to this service over JSON.

pub mod availability;
pub mod bookings;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod credits;
pub mod db;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod periods;
pub mod pricing;
pub mod properties;
pub mod refunds;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use cache::{AppCache, CacheStats};
use gateway::PaymentGateway;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub gateway: Arc<dyn PaymentGateway>,
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(bookings::router())
        .merge(refunds::router())
        .merge(periods::router())
        .merge(availability::router())
        .merge(credits::router())
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    cache: CacheStats,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: state.cache.stats(),
    })
}
