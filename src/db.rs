//! Database pool setup and transaction-scoped locking helpers.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub async fn connect(database_url: &str) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Take a per-property advisory lock for the rest of the transaction.
///
/// Serializes the blocking-overlap check against the booking insert (and
/// period writes against each other) for one property, closing the
/// check-then-act double-booking race. Released automatically at
/// commit/rollback.
pub async fn lock_property(conn: &mut PgConnection, property_id: Uuid) -> sqlx::Result<()> {
    let key = (property_id.as_u128() >> 64) as i64;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}
