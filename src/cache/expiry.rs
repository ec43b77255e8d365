//! Expiry Index Module
//!
//! Orders keys with a deadline so expired entries are found without a full scan.

use std::collections::BTreeMap;
use std::time::Instant;

// == Expiry Index ==
/// Keys ordered by `(expires_at, insert_seq)`.
///
/// Entries stored with `Ttl::Never` are not indexed.
#[derive(Debug)]
pub struct ExpiryIndex<K> {
    deadlines: BTreeMap<(Instant, u64), K>,
}

impl<K: Clone> ExpiryIndex<K> {
    pub fn new() -> Self {
        Self {
            deadlines: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, expires_at: Instant, seq: u64, key: K) {
        self.deadlines.insert((expires_at, seq), key);
    }

    pub fn remove(&mut self, expires_at: Instant, seq: u64) -> Option<K> {
        self.deadlines.remove(&(expires_at, seq))
    }

    // == Earliest Expired ==
    /// Returns the key whose deadline passed first, if any deadline has passed.
    pub fn earliest_expired(&self, now: Instant) -> Option<&K> {
        self.deadlines
            .iter()
            .next()
            .filter(|((expires_at, _), _)| *expires_at <= now)
            .map(|(_, key)| key)
    }

    // == Expired Keys ==
    /// Collects every key whose deadline is `<= now`, earliest first.
    pub fn expired_keys(&self, now: Instant) -> Vec<K> {
        self.deadlines
            .range(..=(now, u64::MAX))
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

impl<K: Clone> Default for ExpiryIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
