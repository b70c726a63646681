//! Property reference data.
//!
//! Properties themselves are managed by the wider platform; this engine only
//! reads their defaults (nightly price, minimum stay, capacity, currency).

pub mod models;
pub mod queries;

pub use models::Property;

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::{AppError, Result};

/// Fetch a property through the cache, 404 if unknown.
pub async fn get_property(pool: &PgPool, cache: &AppCache, id: Uuid) -> Result<Arc<Property>> {
    if let Some(property) = cache.properties.get(&id).await {
        return Ok(property);
    }

    let property = queries::find_property(pool, id)
        .await?
        .ok_or(AppError::NotFound("property"))?;

    let property = Arc::new(property);
    cache.properties.insert(id, property.clone()).await;
    Ok(property)
}
