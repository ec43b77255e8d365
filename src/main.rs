//! TTL Cache demo
//!
//! Runs the cache engine in-process: direct calls, a memoized computation and
//! the background sweep, until interrupted.

use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{spawn_sweep_task, Cache, CacheConfig, Ttl};

/// Entry point for the cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache with configured parameters
/// 4. Start background TTL sweep task
/// 5. Exercise direct and memoized access, log the stats report
/// 6. Wait for SIGINT/SIGTERM, then stop the sweep and release all entries
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TTL cache demo");

    let config = CacheConfig::from_env().context("failed to load cache configuration")?;
    let cache: Cache<String, Value> = Cache::new(config).context("failed to build cache")?;

    let sweeper = spawn_sweep_task(cache.clone());
    info!("Background sweep task started");

    run_demo(&cache).await?;

    let report = serde_json::to_string(&cache.stats())?;
    info!("Cache stats: {}", report);

    shutdown_signal().await;

    sweeper.shutdown().await;
    cache.clear();
    info!("Shutdown complete");
    Ok(())
}

async fn run_demo(cache: &Cache<String, Value>) -> anyhow::Result<()> {
    cache.set("key1".to_string(), json!("value1"))?;
    cache.set("key2".to_string(), json!({ "count": 2 }))?;

    info!("Get key1: {:?}", cache.get("key1"));
    info!("Get key2: {:?}", cache.get("key2"));
    info!("Get key3: {:?}", cache.get("key3"));

    let sum_range = cache
        .memoize("sum_range", |(start, end): (u64, u64)| async move {
            // Stand-in for an expensive aggregate query
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, anyhow::Error>(json!((start..end).sum::<u64>()))
        })
        .with_ttl(Ttl::secs(10));

    let name = sum_range.name();
    info!("{} first call: {}", name, sum_range.call_async((0, 1_000)).await?);
    info!("{} second call (cached): {}", name, sum_range.call_async((0, 1_000)).await?);
    info!("{} different args: {}", name, sum_range.call_async((10, 20)).await?);

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
