//! TTL Cache - An in-process caching engine
//!
//! Bounded key-value store combining TTL expiration with LRU eviction, hit/miss
//! statistics, memoization of computations and a background expiry sweep.

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;
pub mod models;
pub mod tasks;

pub use cache::{Cache, CacheStats, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use memo::Memoized;
pub use models::StatsReport;
pub use tasks::{spawn_sweep_task, sweep_once, SweepHandle};
