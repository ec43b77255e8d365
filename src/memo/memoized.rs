//! Memoized computations
//!
//! Wraps a computation so repeated calls with the same arguments are served
//! from a [`Cache`].

use std::future::Future;

use serde::Serialize;
use tracing::warn;

use crate::cache::{Cache, Ttl};
use crate::memo::derive_key;

/// A computation bound to a cache.
///
/// Only successful results are stored; an `Err` from the computation is
/// returned unchanged and nothing is cached. Two concurrent calls with the
/// same arguments may both miss and both run the computation.
pub struct Memoized<V, F> {
    cache: Cache<String, V>,
    name: String,
    ttl: Option<Ttl>,
    func: F,
}

enum Lookup<V> {
    Hit(V),
    Miss(String),
    Bypass,
}

impl<V: Clone> Cache<String, V> {
    /// Wraps `func` under the identity `name`, using the cache's default TTL.
    ///
    /// `name` must be unique per computation sharing this cache.
    pub fn memoize<F>(&self, name: impl Into<String>, func: F) -> Memoized<V, F> {
        Memoized {
            cache: self.clone(),
            name: name.into(),
            ttl: None,
            func,
        }
    }
}

impl<V: Clone, F> Memoized<V, F> {
    /// Overrides the TTL used for results of this computation.
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// TTL applied to stored results.
    pub fn ttl(&self) -> Ttl {
        self.ttl.unwrap_or(self.cache.config().default_ttl)
    }

    // == Call ==
    /// Returns the cached result for `args`, or runs the computation and
    /// caches a successful result.
    pub fn call<A, E>(&self, args: A) -> Result<V, E>
    where
        A: Serialize,
        F: Fn(A) -> Result<V, E>,
    {
        match self.lookup(&args) {
            Lookup::Hit(value) => Ok(value),
            Lookup::Bypass => (self.func)(args),
            Lookup::Miss(key) => {
                let value = (self.func)(args)?;
                self.store(key, &value);
                Ok(value)
            }
        }
    }

    // == Call Async ==
    /// Asynchronous counterpart of [`call`](Self::call) for computations
    /// returning a future. The cache lock is never held across an await.
    pub async fn call_async<A, E, Fut>(&self, args: A) -> Result<V, E>
    where
        A: Serialize,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        match self.lookup(&args) {
            Lookup::Hit(value) => Ok(value),
            Lookup::Bypass => (self.func)(args).await,
            Lookup::Miss(key) => {
                let value = (self.func)(args).await?;
                self.store(key, &value);
                Ok(value)
            }
        }
    }

    /// Drops the cached result for `args`, if any.
    pub fn invalidate<A: Serialize>(&self, args: &A) -> bool {
        match derive_key(&self.name, args) {
            Ok(key) => self.cache.delete(&key),
            Err(_) => false,
        }
    }

    fn lookup<A: Serialize>(&self, args: &A) -> Lookup<V> {
        if !self.cache.is_enabled() {
            return Lookup::Bypass;
        }

        match derive_key(&self.name, args) {
            Ok(key) => match self.cache.get(&key) {
                Some(value) => Lookup::Hit(value),
                None => Lookup::Miss(key),
            },
            Err(e) => {
                warn!(name = %self.name, error = %e, "arguments not serializable, calling uncached");
                Lookup::Bypass
            }
        }
    }

    fn store(&self, key: String, value: &V) {
        if let Err(e) = self.cache.set_with_ttl(key, value.clone(), self.ttl()) {
            warn!(name = %self.name, error = %e, "failed to cache computed result");
        }
    }
}
