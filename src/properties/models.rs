//! Database models for properties.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Property from properties
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub currency: String,
    /// Fallback nightly price (major units) for nights no period covers
    pub default_nightly_price: i64,
    pub default_min_nights: i32,
    pub max_guests: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
