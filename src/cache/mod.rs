//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod expiry;
mod lru;
mod policy;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, Recency, Ttl};
pub use expiry::ExpiryIndex;
pub use lru::LruTracker;
pub use policy::{select_victim, sweep_candidates, Victim};
pub use shared::Cache;
pub use stats::CacheStats;
pub use store::CacheStore;
