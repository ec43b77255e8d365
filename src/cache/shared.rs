//! Shared Cache Handle
//!
//! Thread-safe, cheaply cloneable handle over a [`CacheStore`].

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, Ttl};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::StatsReport;

/// Thread-safe cache shared by direct callers, memoized computations and
/// the background sweep.
///
/// Every operation runs in a single short critical section, so each call is
/// atomic with respect to every other call. Clones share the same store.
#[derive(Debug)]
pub struct Cache<K, V> {
    inner: Arc<Inner<K, V>>,
}

#[derive(Debug)]
struct Inner<K, V> {
    store: Mutex<CacheStore<K, V>>,
    config: CacheConfig,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    // == Constructor ==
    /// Builds a cache from a validated configuration.
    ///
    /// # Errors
    /// `CacheError::InvalidConfig` for a zero capacity or sweep interval.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let store = CacheStore::new(config.capacity, config.default_ttl)?;

        info!(
            "Cache initialized: capacity={}, default_ttl={:?}, sweep_interval={:?}, enabled={}",
            config.capacity, config.default_ttl, config.sweep_interval, config.enabled
        );

        Ok(Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                config,
            }),
        })
    }

    /// Shorthand for a cache with the default sweep interval.
    pub fn with_capacity(capacity: usize, default_ttl: Ttl) -> Result<Self> {
        Self::new(CacheConfig {
            capacity,
            default_ttl,
            ..CacheConfig::default()
        })
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.inner.store.lock().get(key)
    }

    pub fn set(&self, key: K, value: V) -> Result<()> {
        self.inner.store.lock().set(key, value)
    }

    pub fn set_with_ttl(&self, key: K, value: V, ttl: Ttl) -> Result<()> {
        self.inner.store.lock().set_with_ttl(key, value, ttl)
    }

    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.inner.store.lock().delete(key)
    }

    pub fn clear(&self) {
        self.inner.store.lock().clear();
    }

    /// Raw entry count, including expired entries not yet reclaimed.
    pub fn len(&self) -> usize {
        self.inner.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.lock().is_empty()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.store.lock().contains_key(key)
    }

    /// Current counters.
    pub fn counters(&self) -> CacheStats {
        self.inner.store.lock().stats()
    }

    // == Stats ==
    /// Consistent snapshot of counters and occupancy, taken under one lock.
    pub fn stats(&self) -> StatsReport {
        let (stats, size) = {
            let store = self.inner.store.lock();
            (store.stats(), store.len())
        };
        StatsReport::new(
            stats,
            size,
            self.inner.config.capacity,
            self.inner.config.default_ttl,
        )
    }

    pub fn reset_stats(&self) {
        self.inner.store.lock().reset_stats();
        info!("Cache statistics reset");
    }

    // == Expiration ==
    /// Snapshot of keys whose TTL has elapsed.
    pub fn expired_keys(&self) -> Vec<K> {
        self.inner.store.lock().expired_keys()
    }

    /// Removes `key` if it is still expired; a no-op if it is gone or refreshed.
    pub fn remove_if_expired<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.store.lock().remove_if_expired(key)
    }

    /// Removes every expired entry in a single critical section.
    pub fn purge_expired(&self) -> usize {
        self.inner.store.lock().purge_expired()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_cache_rejects_invalid_config() {
        let result = Cache::<String, i32>::new(CacheConfig {
            sweep_interval: Duration::ZERO,
            ..CacheConfig::default()
        });
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));

        let result = Cache::<String, i32>::with_capacity(0, Ttl::secs(1));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_clones_share_store() {
        let cache: Cache<String, i32> = Cache::with_capacity(10, Ttl::secs(60)).unwrap();
        let other = cache.clone();

        cache.set("a".to_string(), 1).unwrap();

        assert_eq!(other.get("a"), Some(1));
        assert_eq!(other.counters().hits, 1);
    }

    #[test]
    fn test_stats_report_matches_len() {
        let cache: Cache<String, i32> = Cache::with_capacity(10, Ttl::secs(60)).unwrap();
        cache.set("a".to_string(), 1).unwrap();
        cache
            .set_with_ttl("b".to_string(), 2, Ttl::After(Duration::ZERO))
            .unwrap();

        let report = cache.stats();
        assert_eq!(report.size, cache.len());
        assert_eq!(report.size, 2);
        assert_eq!(report.capacity, 10);
        assert_eq!(report.sets, 2);
    }

    #[test]
    fn test_concurrent_sets_respect_capacity() {
        let cache: Cache<String, i32> = Cache::with_capacity(16, Ttl::secs(60)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("t{t}-k{i}");
                        cache.set(key.clone(), i).unwrap();
                        let _ = cache.get(&key);
                        assert!(cache.len() <= 16);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let report = cache.stats();
        assert_eq!(report.sets, 1600);
        assert_eq!(report.hits + report.misses, 1600);
        assert!(report.size <= 16);
        assert_eq!(report.evictions, 1600 - report.size as u64);
    }

    #[test]
    fn test_reset_stats_keeps_entries() {
        let cache: Cache<String, i32> = Cache::with_capacity(4, Ttl::Never).unwrap();
        cache.set("a".to_string(), 1).unwrap();
        let _ = cache.get("a");

        cache.reset_stats();

        assert_eq!(cache.counters(), CacheStats::default());
        assert_eq!(cache.get("a"), Some(1));
    }
}
