//! LRU Tracker Module
//!
//! Orders keys by recency for least-recently-used eviction.

use std::collections::BTreeMap;

use crate::cache::entry::Recency;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are indexed by their [`Recency`] marker, so the first key in the map is
/// the least recently used one.
#[derive(Debug)]
pub struct LruTracker<K> {
    order: BTreeMap<Recency, K>,
}

impl<K: Clone> LruTracker<K> {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: BTreeMap::new(),
        }
    }

    // == Insert ==
    /// Starts tracking a key at the given recency.
    pub fn insert(&mut self, recency: Recency, key: K) {
        self.order.insert(recency, key);
    }

    // == Touch ==
    /// Moves a key from its previous marker to its new one.
    pub fn touch(&mut self, previous: Recency, current: Recency) {
        if let Some(key) = self.order.remove(&previous) {
            self.order.insert(current, key);
        }
    }

    // == Remove ==
    /// Stops tracking the key stored under `recency`.
    pub fn remove(&mut self, recency: &Recency) -> Option<K> {
        self.order.remove(recency)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.values().next()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<K: Clone> Default for LruTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
