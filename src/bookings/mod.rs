//! Bookings: the transaction orchestrator and its models.

pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use models::{Booking, BookingStatus, Payment, PaymentProvider, PaymentStatus};
pub use routes::router;
