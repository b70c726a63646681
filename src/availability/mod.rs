//! Availability resolution: blocking overlaps and period coverage.

pub mod models;
pub mod queries;
pub mod resolver;
pub mod routes;

pub use models::{BlockKind, DateBlock};
pub use resolver::{resolve_coverage, ArrivalRules, Coverage, CoverageSegment};
pub use routes::router;
