//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::fmt::Debug;
use std::hash::Hash;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::Cache;

// == Sweep Once ==
/// Removes every entry whose TTL has elapsed.
///
/// The expired keys are collected under one short lock; each removal then
/// takes the lock again on its own, so concurrent callers are never blocked
/// for a full scan. Keys deleted or refreshed in between are skipped.
///
/// Returns the number of entries removed.
pub fn sweep_once<K, V>(cache: &Cache<K, V>) -> usize
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    cache
        .expired_keys()
        .iter()
        .filter(|key| cache.remove_if_expired(*key))
        .count()
}

// == Sweep Handle ==
/// Owner of a running sweep task.
///
/// Dropping the handle also stops the task.
#[derive(Debug)]
pub struct SweepHandle {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the task to stop and waits for it to finish.
    pub async fn shutdown(self) {
        // The receiver is gone only if the task already ended.
        let _ = self.stop.send(true);
        if let Err(e) = self.handle.await {
            warn!("TTL sweep task ended abnormally: {}", e);
        }
    }
}

/// Spawns a background task that sweeps `cache` every `sweep_interval` from
/// its configuration.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
/// ```ignore
/// let cache: Cache<String, String> = Cache::new(CacheConfig::default())?;
/// let sweeper = spawn_sweep_task(cache.clone());
/// // Later, during shutdown:
/// sweeper.shutdown().await;
/// ```
pub fn spawn_sweep_task<K, V>(cache: Cache<K, V>) -> SweepHandle
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    let period = cache.config().sweep_interval;
    let (stop, mut stopped) = watch::channel(false);

    let handle = tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", period);

        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stopped.changed() => break,
                _ = ticker.tick() => {
                    let removed = sweep_once(&cache);
                    if removed > 0 {
                        info!("TTL sweep: removed {} expired entries", removed);
                    } else {
                        debug!("TTL sweep: no expired entries found");
                    }
                }
            }
        }

        info!("TTL sweep task stopped");
    });

    SweepHandle { stop, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Ttl;
    use crate::config::CacheConfig;
    use std::time::Duration;

    fn cache(sweep_ms: u64) -> Cache<String, String> {
        Cache::new(CacheConfig {
            capacity: 100,
            default_ttl: Ttl::secs(300),
            sweep_interval: Duration::from_millis(sweep_ms),
            enabled: true,
        })
        .unwrap()
    }

    #[test]
    fn test_sweep_once_removes_only_expired() {
        let cache = cache(1000);
        cache
            .set_with_ttl("gone".to_string(), "v".to_string(), Ttl::After(Duration::ZERO))
            .unwrap();
        cache.set("kept".to_string(), "v".to_string()).unwrap();

        assert_eq!(sweep_once(&cache), 1);
        assert_eq!(sweep_once(&cache), 0);
        assert!(cache.contains_key("kept"));
        assert_eq!(cache.counters().expirations, 1);
        assert_eq!(cache.counters().misses, 0);
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let cache = cache(50);
        cache
            .set_with_ttl("expire_soon".to_string(), "value".to_string(), Ttl::millis(50))
            .unwrap();

        let sweeper = spawn_sweep_task(cache.clone());

        // Two sweep cycles, no reads in between
        tokio::time::sleep(Duration::from_millis(160)).await;

        assert!(!cache.contains_key("expire_soon"));
        assert_eq!(cache.counters().expirations, 1);
        assert_eq!(cache.counters().misses, 0);

        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let cache = cache(30);
        cache
            .set_with_ttl("long_lived".to_string(), "value".to_string(), Ttl::secs(3600))
            .unwrap();

        let sweeper = spawn_sweep_task(cache.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.get("long_lived"), Some("value".to_string()));

        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_joins_task() {
        let cache = cache(10_000);
        let sweeper = spawn_sweep_task(cache.clone());

        tokio::time::timeout(Duration::from_secs(1), sweeper.shutdown())
            .await
            .expect("shutdown should not wait for the next tick");

        // The store is not left locked
        cache.set("after".to_string(), "ok".to_string()).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_task() {
        let cache = cache(20);
        let sweeper = spawn_sweep_task(cache.clone());
        let SweepHandle { stop, handle } = sweeper;
        drop(stop);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task should stop once the sender is dropped")
            .unwrap();
    }
}
