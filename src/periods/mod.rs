//! Period registry: date-bounded pricing/availability rules per property.
//!
//! The one invariant that matters here: for a given property, no two
//! periods' `[start, end)` ranges may intersect. Enforced by an explicit
//! overlap query on every write, under the property advisory lock.

pub mod models;
pub mod queries;
pub mod requests;
pub mod routes;
pub mod services;

pub use models::Period;
pub use routes::router;
