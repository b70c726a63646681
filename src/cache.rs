//! In-memory caching using moka
//!
//! Property records are read-mostly reference data consulted on every quote
//! and availability check, so they get a short-TTL application cache.
//! Properties are written upstream, never here; staleness is bounded by the
//! TTL alone. Pricing/availability rows themselves are never cached: they
//! feed financial invariants and always come straight from the database.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::properties::Property;

/// Application cache holding property reference data
#[derive(Clone)]
pub struct AppCache {
    /// Properties (id -> Property)
    pub properties: Cache<Uuid, Arc<Property>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Properties: 500 entries, 10 min TTL, 5 min idle
            properties: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(10 * 60))
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    /// Get cache statistics for the health endpoint
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            properties_size: self.properties.entry_count(),
        }
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub properties_size: u64,
}
