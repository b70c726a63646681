//! Database queries for properties.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::Property;

pub async fn find_property(pool: &PgPool, id: Uuid) -> Result<Option<Property>, AppError> {
    let property = sqlx::query_as::<_, Property>(
        r#"
        SELECT id, name, currency, default_nightly_price,
               default_min_nights, max_guests, created_at, updated_at
        FROM properties
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(property)
}
