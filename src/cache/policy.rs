//! Eviction Policy Module
//!
//! TTL-first victim selection with LRU fallback.

use std::time::Instant;

use crate::cache::expiry::ExpiryIndex;
use crate::cache::lru::LruTracker;

// == Victim ==
/// Entry chosen for removal when the store is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Victim<K> {
    /// An entry whose TTL already elapsed; counted as an expiration
    Expired(K),
    /// The least recently used live entry; counted as an eviction
    LeastRecent(K),
}

impl<K> Victim<K> {
    pub fn key(&self) -> &K {
        match self {
            Victim::Expired(key) | Victim::LeastRecent(key) => key,
        }
    }
}

// == Select Victim ==
/// Chooses the single entry to remove before inserting into a full store.
///
/// An expired entry is always preferred over a live one. Among expired entries
/// the one whose deadline passed first wins; otherwise the entry with the oldest
/// last access (then oldest creation time) is chosen.
pub fn select_victim<K: Clone>(
    lru: &LruTracker<K>,
    expiry: &ExpiryIndex<K>,
    now: Instant,
) -> Option<Victim<K>> {
    if let Some(key) = expiry.earliest_expired(now) {
        return Some(Victim::Expired(key.clone()));
    }
    lru.peek_oldest().cloned().map(Victim::LeastRecent)
}

// == Sweep Candidates ==
/// Point-in-time snapshot of every key whose deadline is `<= now`.
pub fn sweep_candidates<K: Clone>(expiry: &ExpiryIndex<K>, now: Instant) -> Vec<K> {
    expiry.expired_keys(now)
}
