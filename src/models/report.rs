//! Stats report surfaced to collaborators
//!
//! Serializable snapshot of cache health, e.g. for a stats endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStats, Ttl};

/// Point-in-time view of the cache counters and occupancy.
///
/// `size` is the raw entry count and may include expired entries that have
/// not been reclaimed yet.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// hits / (hits + misses), 0.0 when nothing was looked up
    pub hit_rate: f64,
    pub size: usize,
    pub capacity: usize,
    /// Default TTL in seconds, null when entries never expire by default
    pub default_ttl_secs: Option<f64>,
    /// When the snapshot was taken (RFC 3339)
    pub taken_at: DateTime<Utc>,
}

impl StatsReport {
    /// Builds a report from counters captured in the same critical section as
    /// `size`.
    pub fn new(stats: CacheStats, size: usize, capacity: usize, default_ttl: Ttl) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            evictions: stats.evictions,
            expirations: stats.expirations,
            hit_rate: stats.hit_rate(),
            size,
            capacity,
            default_ttl_secs: default_ttl.as_duration().map(|ttl| ttl.as_secs_f64()),
            taken_at: Utc::now(),
        }
    }
}
