//! Cache Entry Module
//!
//! Defines individual cache entries, their TTL and their recency marker.

use std::time::{Duration, Instant};

// == TTL ==
/// Time-to-live applied to an entry when it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Entry never expires by time (still subject to LRU eviction)
    Never,
    /// Entry expires once this much time has passed since it was stored
    After(Duration),
}

impl Ttl {
    /// TTL of a whole number of seconds.
    pub fn secs(secs: u64) -> Self {
        Ttl::After(Duration::from_secs(secs))
    }

    /// TTL of a whole number of milliseconds.
    pub fn millis(millis: u64) -> Self {
        Ttl::After(Duration::from_millis(millis))
    }

    /// Absolute deadline for an entry stored at `now`.
    ///
    /// A deadline too far in the future to represent is treated as no deadline.
    pub fn deadline(self, now: Instant) -> Option<Instant> {
        match self {
            Ttl::Never => None,
            Ttl::After(ttl) => now.checked_add(ttl),
        }
    }

    /// The TTL as a duration, `None` for the no-expiry sentinel.
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            Ttl::Never => None,
            Ttl::After(ttl) => Some(ttl),
        }
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        Ttl::After(ttl)
    }
}

// == Recency ==
/// Position of an entry in LRU order.
///
/// Ordering is by last access, then creation time, then a store-wide sequence
/// number so that two markers never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Recency {
    pub last_accessed: Instant,
    pub created_at: Instant,
    pub seq: u64,
}

// == Cache Entry ==
/// A single stored value with its metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion (or last replacement) time
    pub created_at: Instant,
    /// Absolute expiration time, None = no expiration
    pub expires_at: Option<Instant>,
    /// Current LRU marker; `recency.last_accessed` is refreshed on every hit
    pub recency: Recency,
    /// Sequence number assigned at insertion, used by the expiry index
    pub insert_seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stored at `now`.
    pub fn new(value: V, ttl: Ttl, now: Instant, seq: u64) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: ttl.deadline(now),
            recency: Recency {
                last_accessed: now,
                created_at: now,
                seq,
            },
            insert_seq: seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so a zero TTL expires the
    /// entry immediately.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Touch ==
    /// Marks the entry as accessed and returns its previous recency marker.
    pub fn touch(&mut self, now: Instant, seq: u64) -> Recency {
        let previous = self.recency;
        self.recency = Recency {
            last_accessed: now,
            created_at: self.created_at,
            seq,
        };
        previous
    }
}
