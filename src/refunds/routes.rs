//! Cancellation and refund route handlers.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::identity::Identity;
use crate::AppState;

use super::models::{RefundRequest, RefundRequestStatus};
use super::queries;
use super::services::{self, ApprovalResult, CancellationPreview, CancellationResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings/:id/cancel/preview", post(cancel_preview))
        .route("/api/bookings/:id/cancel", post(cancel))
        .route("/api/bookings/:id/refund-request", post(request_refund))
        .route("/api/admin/refund-requests", get(list_pending))
        .route("/api/admin/refund-requests/:id/approve", post(approve))
        .route("/api/admin/refund-requests/:id/reject", post(reject))
}

async fn cancel_preview(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationPreview>> {
    let preview = services::preview_cancellation(&state.db, id, &identity, Utc::now()).await?;
    Ok(Json(preview))
}

async fn cancel(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationResult>> {
    let result =
        services::cancel_booking(&state.db, state.gateway.as_ref(), id, &identity, Utc::now())
            .await?;
    Ok(Json(result))
}

#[derive(Debug, Default, Deserialize)]
struct RefundRequestBody {
    #[serde(default)]
    reason: Option<String>,
}

async fn request_refund(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    body: Option<Json<RefundRequestBody>>,
) -> Result<Json<RefundRequest>> {
    let reason = body.and_then(|Json(b)| b.reason);
    let request = services::request_refund(&state.db, id, &identity, reason).await?;
    Ok(Json(request))
}

async fn list_pending(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<RefundRequest>>> {
    identity.require_admin()?;
    let requests = queries::list_by_status(&state.db, RefundRequestStatus::Pending).await?;
    Ok(Json(requests))
}

async fn approve(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<ApprovalResult>> {
    identity.require_admin()?;
    let result =
        services::approve_refund_request(&state.db, state.gateway.as_ref(), id).await?;
    Ok(Json(result))
}

async fn reject(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<()> {
    identity.require_admin()?;
    services::reject_refund_request(&state.db, id).await?;
    Ok(())
}
