//! Availability route handlers.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar;
use crate::error::{AppError, Result};
use crate::identity::Identity;
use crate::periods::queries as period_queries;
use crate::AppState;

use super::models::DateBlock;
use super::queries;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/properties/:id/availability", get(check))
        .route("/api/properties/:id/calendar", get(calendar_view))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    available: bool,
}

/// Advisory availability check for the booking UI. The binding check runs
/// again inside the booking transaction.
async fn check(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<AvailabilityResponse>> {
    let (start, end) = parse_range(&range)?;
    let blocked = queries::is_range_blocked(&state.db, property_id, start, end).await?;
    Ok(Json(AvailabilityResponse { available: !blocked }))
}

#[derive(Debug, Serialize)]
struct DayView {
    date: NaiveDate,
    period_id: Option<Uuid>,
    is_open: bool,
    nightly_price: i64,
    blocked: bool,
}

#[derive(Debug, Serialize)]
struct CalendarResponse {
    days: Vec<DayView>,
    blocks: Vec<DateBlock>,
}

#[derive(Debug, Deserialize)]
struct CalendarQuery {
    from: String,
    to: String,
}

/// Day-by-day read model for the admin calendar.
async fn calendar_view(
    State(state): State<AppState>,
    identity: Identity,
    Path(property_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>> {
    identity.require_admin()?;

    let from = calendar::normalize_date_only(&query.from)?;
    let to = calendar::normalize_date_only(&query.to)?;
    if to <= from {
        return Err(AppError::invalid_input(
            "INVALID_RANGE",
            "to must be after from",
        ));
    }

    let property = crate::properties::get_property(&state.db, &state.cache, property_id).await?;
    let periods = period_queries::periods_in_range(&state.db, property_id, from, to).await?;
    let blocks = queries::find_blocking(&state.db, property_id, from, to).await?;

    let mut days = Vec::with_capacity(calendar::nights_between(from, to) as usize);
    let mut day = from;
    while day < to {
        let next = day + chrono::Days::new(1);
        let covering = periods.iter().find(|p| p.covers(day));
        days.push(DayView {
            date: day,
            period_id: covering.map(|p| p.id),
            is_open: covering.map(|p| p.is_open).unwrap_or(true),
            nightly_price: covering
                .map(|p| p.nightly_price)
                .unwrap_or(property.default_nightly_price),
            blocked: blocks.iter().any(|b| b.overlaps(day, next)),
        });
        day = next;
    }

    Ok(Json(CalendarResponse { days, blocks }))
}

fn parse_range(range: &RangeQuery) -> Result<(NaiveDate, NaiveDate)> {
    let start = calendar::normalize_date_only(&range.start)?;
    let end = calendar::normalize_date_only(&range.end)?;
    if end <= start {
        return Err(AppError::invalid_input(
            "INVALID_RANGE",
            "end must be after start",
        ));
    }
    Ok((start, end))
}
