//! Credit ledger: stored-value vouchers issued by cancellations.
//!
//! Consumption order is soonest-to-expire first, then oldest first - an
//! explicit sort key in both SQL and the pure allocation walk, never an
//! incidental iteration order.

pub mod models;
pub mod queries;
pub mod routes;
pub mod services;

pub use models::Voucher;
pub use routes::router;
pub use services::{consume, estimate_applicable, issue, plan_allocation};
