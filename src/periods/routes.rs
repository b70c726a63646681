//! Admin route handlers for the period registry.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::identity::Identity;
use crate::AppState;

use super::models::Period;
use super::requests::{CreatePeriodRequest, UpdatePeriodRequest};
use super::{queries, services};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/properties/:property_id/periods",
            get(list).post(create),
        )
        .route("/api/admin/periods/:id", patch(update).delete(delete))
}

async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<Period>>> {
    identity.require_admin()?;
    let periods = queries::list_periods(&state.db, property_id).await?;
    Ok(Json(periods))
}

async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Path(property_id): Path<Uuid>,
    Json(req): Json<CreatePeriodRequest>,
) -> Result<(StatusCode, Json<Period>)> {
    identity.require_admin()?;
    let period = services::create_period(&state.db, &state.cache, property_id, req).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdatePeriodRequest>,
) -> Result<Json<Period>> {
    identity.require_admin()?;
    let period = services::update_period(&state.db, id, patch).await?;
    Ok(Json(period))
}

async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    identity.require_admin()?;
    services::delete_period(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
