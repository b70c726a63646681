//! Cancellation and refund handling.
//!
//! Policy math is pure (`policy.rs`); the services apply it to bookings,
//! issue vouchers and drive the gateway refund.

pub mod models;
pub mod policy;
pub mod queries;
pub mod routes;
pub mod services;

pub use models::{RefundRequest, RefundRequestStatus};
pub use policy::{compute_outcome, days_before_start, RefundOutcome, RefundTier};
pub use routes::router;
