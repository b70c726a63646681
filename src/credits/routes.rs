//! Credit ledger route handlers.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::identity::Identity;
use crate::AppState;

use super::models::Voucher;
use super::queries;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/customers/me/credit", get(balance))
}

#[derive(Debug, Serialize)]
struct CreditBalanceResponse {
    total_cents: i64,
    vouchers: Vec<Voucher>,
}

async fn balance(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CreditBalanceResponse>> {
    let customer_id = identity.require_customer()?;
    let vouchers = queries::active_vouchers(&state.db, customer_id, Utc::now()).await?;
    let total_cents = vouchers.iter().map(|v| v.remaining_cents).sum();
    Ok(Json(CreditBalanceResponse {
        total_cents,
        vouchers,
    }))
}
