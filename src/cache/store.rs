//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

use tracing::{debug, info};

use crate::cache::expiry::ExpiryIndex;
use crate::cache::lru::LruTracker;
use crate::cache::policy::{self, Victim};
use crate::cache::{CacheEntry, CacheStats, Ttl};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded key-value storage with LRU eviction and TTL support.
///
/// Not synchronized; see [`Cache`](crate::cache::Cache) for the shared handle.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Deadlines of entries that can expire
    expiry: ExpiryIndex<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL for entries stored without an explicit one
    default_ttl: Ttl,
    /// Source of recency and insertion sequence numbers
    next_seq: u64,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Errors
    /// `CacheError::InvalidConfig` if `capacity` is zero.
    pub fn new(capacity: usize, default_ttl: Ttl) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            expiry: ExpiryIndex::new(),
            stats: CacheStats::new(),
            capacity,
            default_ttl,
            next_seq: 0,
        })
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A live entry is marked most recently used and counted as a hit. An
    /// expired entry is removed, counted as an expiration and reported as a miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let now = Instant::now();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                debug!(?key, "cache miss");
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!(?key, "cache entry expired on access");
            return None;
        }

        let seq = self.next_seq();
        let entry = self.entries.get_mut(key)?;
        let previous = entry.touch(now, seq);
        self.lru.touch(previous, entry.recency);
        self.stats.record_hit();
        debug!(?key, "cache hit");
        Some(entry.value.clone())
    }

    // == Set ==
    /// Stores a value under `key` with the default TTL.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    // == Set With TTL ==
    /// Stores a value under `key` with an explicit TTL.
    ///
    /// Replacing an existing key resets its creation time, deadline and
    /// recency. Inserting a new key into a full store first removes exactly one
    /// entry, preferring an expired one over the least recently used one.
    ///
    /// # Errors
    /// `CacheError::Allocation` if storage for a new key cannot be reserved; the
    /// store is left unchanged.
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl: Ttl) -> Result<()> {
        let now = Instant::now();

        if let Some(previous) = self.entries.remove(&key) {
            self.unlink(&previous);
        } else {
            self.entries.try_reserve(1)?;
            if self.entries.len() >= self.capacity {
                self.evict_one(now);
            }
        }

        let seq = self.next_seq();
        let entry = CacheEntry::new(value, ttl, now, seq);
        self.lru.insert(entry.recency, key.clone());
        if let Some(expires_at) = entry.expires_at {
            self.expiry.insert(expires_at, seq, key.clone());
        }
        debug!(?key, ?ttl, "cached value");
        self.entries.insert(key, entry);
        self.stats.record_set();

        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let removed = self.remove_entry(key).is_some();
        if removed {
            debug!(?key, "deleted cache key");
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Statistics are left untouched.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.expiry.clear();
        info!("Cache cleared ({} entries released)", count);
    }

    // == Expired Keys ==
    /// Snapshot of the keys whose TTL has elapsed, earliest deadline first.
    pub fn expired_keys(&self) -> Vec<K> {
        policy::sweep_candidates(&self.expiry, Instant::now())
    }

    // == Remove If Expired ==
    /// Removes `key` only if it is still present and expired.
    ///
    /// A key that was deleted or refreshed since it was observed as expired is
    /// left alone.
    pub fn remove_if_expired<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let expired = self
            .entries
            .get(key)
            .map(|entry| entry.is_expired_at(now))
            .unwrap_or(false);

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
        }
        expired
    }

    // == Purge Expired ==
    /// Removes all expired entries in one pass. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        self.expired_keys()
            .iter()
            .filter(|key| self.remove_if_expired(*key))
            .count()
    }

    // == Stats ==
    /// Returns a copy of the current counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zeroes all counters without touching stored entries.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Length ==
    /// Returns the raw number of stored entries.
    ///
    /// Expired entries that have not been reclaimed yet are included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `key` is stored, expired or not. Does not touch recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    // == Internals ==
    fn evict_one(&mut self, now: Instant) {
        let Some(victim) = policy::select_victim(&self.lru, &self.expiry, now) else {
            return;
        };

        self.remove_entry(victim.key());
        match victim {
            Victim::Expired(key) => {
                self.stats.record_expirations(1);
                debug!(?key, "cache full, reclaimed expired entry");
            }
            Victim::LeastRecent(key) => {
                self.stats.record_eviction();
                debug!(?key, "cache full, evicted least recently used entry");
            }
        }
    }

    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.unlink(&entry);
        Some(entry)
    }

    fn unlink(&mut self, entry: &CacheEntry<V>) {
        self.lru.remove(&entry.recency);
        if let Some(expires_at) = entry.expires_at {
            self.expiry.remove(expires_at, entry.insert_seq);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn store(capacity: usize) -> CacheStore<String, String> {
        CacheStore::new(capacity, Ttl::secs(300)).unwrap()
    }

    fn set(store: &mut CacheStore<String, String>, key: &str, value: &str) {
        store.set(key.to_string(), value.to_string()).unwrap();
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
        assert_eq!(store.default_ttl(), Ttl::secs(300));
    }

    #[test]
    fn test_store_rejects_zero_capacity() {
        let result = CacheStore::<String, String>::new(0, Ttl::secs(1));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert!(store.lru.is_empty());
        assert!(store.expiry.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = store(100);

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.stats(), CacheStats::default());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");
        set(&mut store, "key1", "value2");

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().sets, 2);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "a", "3");

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        assert!(store.contains_key("b"));
    }

    #[test]
    fn test_overwrite_refreshes_recency() {
        let mut store = store(2);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");
        set(&mut store, "a", "3");
        set(&mut store, "c", "4");

        assert!(store.contains_key("a"));
        assert!(!store.contains_key("b"));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);

        store
            .set_with_ttl("key1".to_string(), "value1".to_string(), Ttl::millis(50))
            .unwrap();

        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(80));

        assert_eq!(store.get("key1"), None);
        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_ttl_expires_on_next_access() {
        let mut store = store(100);

        store
            .set_with_ttl("k".to_string(), "v".to_string(), Ttl::After(Duration::ZERO))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k"), None);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_never_ttl_survives_purge() {
        let mut store: CacheStore<String, i32> =
            CacheStore::new(10, Ttl::After(Duration::ZERO)).unwrap();

        store.set_with_ttl("keep".to_string(), 1, Ttl::Never).unwrap();
        store.set("drop".to_string(), 2).unwrap();

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.get("keep"), Some(1));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        set(&mut store, "key1", "value1");
        set(&mut store, "key2", "value2");
        set(&mut store, "key3", "value3");

        // Cache is full, adding key4 should evict key1 (oldest)
        set(&mut store, "key4", "value4");

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 1);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(2);

        set(&mut store, "a", "1");
        set(&mut store, "b", "2");

        // Access a to make it most recently used
        store.get("a").unwrap();

        set(&mut store, "c", "3");

        assert!(store.contains_key("a"));
        assert!(!store.contains_key("b"));
        assert!(store.contains_key("c"));
    }

    #[test]
    fn test_expired_entry_preferred_over_lru() {
        let mut store: CacheStore<String, i32> = CacheStore::new(1, Ttl::secs(300)).unwrap();

        store
            .set_with_ttl("a".to_string(), 1, Ttl::After(Duration::ZERO))
            .unwrap();
        store.set("b".to_string(), 2).unwrap();

        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(store.get("b"), Some(2));
        assert!(!store.contains_key("a"));
    }

    #[test]
    fn test_expired_victim_chosen_even_if_recently_used() {
        let mut store: CacheStore<String, i32> = CacheStore::new(2, Ttl::secs(300)).unwrap();

        store.set("old".to_string(), 1).unwrap();
        store
            .set_with_ttl("fresh".to_string(), 2, Ttl::millis(30))
            .unwrap();
        store.get("fresh").unwrap();
        sleep(Duration::from_millis(50));

        store.set("new".to_string(), 3).unwrap();

        assert!(store.contains_key("old"));
        assert!(!store.contains_key("fresh"));
        assert_eq!(store.stats().expirations, 1);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);

        set(&mut store, "key1", "value1");
        store.get("key1").unwrap(); // hit
        let _ = store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_clear_keeps_stats() {
        let mut store = store(100);

        set(&mut store, "a", "1");
        store.get("a").unwrap();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().hits, 1);
        assert_eq!(store.stats().sets, 1);
    }

    #[test]
    fn test_reset_stats_keeps_entries() {
        let mut store = store(100);

        set(&mut store, "a", "1");
        store.get("a").unwrap();
        store.reset_stats();

        assert_eq!(store.stats(), CacheStats::default());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_purge_expired() {
        let mut store = store(100);

        store
            .set_with_ttl("key1".to_string(), "value1".to_string(), Ttl::millis(30))
            .unwrap();
        set(&mut store, "key2", "value2");

        sleep(Duration::from_millis(50));

        assert_eq!(store.expired_keys(), vec!["key1".to_string()]);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().expirations, 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_remove_if_expired_ignores_live_and_missing() {
        let mut store = store(100);

        set(&mut store, "live", "1");

        assert!(!store.remove_if_expired("live"));
        assert!(!store.remove_if_expired("missing"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().expirations, 0);
    }

    #[test]
    fn test_remove_if_expired_after_refresh_is_noop() {
        let mut store = store(100);

        store
            .set_with_ttl("k".to_string(), "old".to_string(), Ttl::After(Duration::ZERO))
            .unwrap();
        let stale = store.expired_keys();
        set(&mut store, "k", "new");

        assert_eq!(stale, vec!["k".to_string()]);
        assert!(!store.remove_if_expired("k"));
        assert_eq!(store.get("k"), Some("new".to_string()));
    }
}
