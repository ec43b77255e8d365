//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::Ttl;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// TTL for entries stored without an explicit one
    pub default_ttl: Ttl,
    /// Interval between background sweeps of expired entries
    pub sweep_interval: Duration,
    /// When false, memoized computations bypass the cache
    pub enabled: bool,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `CACHE_TTL` - Default TTL in seconds, or `never` (default: 300)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_ENABLED` - `true` or `false` (default: true)
    ///
    /// # Errors
    /// A variable that is set but cannot be parsed, or a configuration that
    /// fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            capacity: match lookup("CACHE_MAX_SIZE") {
                Some(raw) => parse_number("CACHE_MAX_SIZE", &raw)?,
                None => defaults.capacity,
            },
            default_ttl: match lookup("CACHE_TTL") {
                Some(raw) => parse_ttl(&raw)?,
                None => defaults.default_ttl,
            },
            sweep_interval: match lookup("CACHE_SWEEP_INTERVAL") {
                Some(raw) => Duration::from_secs(parse_number("CACHE_SWEEP_INTERVAL", &raw)?),
                None => defaults.sweep_interval,
            },
            enabled: match lookup("CACHE_ENABLED") {
                Some(raw) => parse_flag(&raw)?,
                None => defaults.enabled,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects a zero capacity or a zero sweep interval.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be a positive integer".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            default_ttl: Ttl::secs(300),
            sweep_interval: Duration::from_secs(60),
            enabled: true,
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| CacheError::InvalidConfig(format!("{name} is not a valid number: {raw:?}")))
}

fn parse_ttl(raw: &str) -> Result<Ttl> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "never" | "none" => Ok(Ttl::Never),
        _ => parse_number("CACHE_TTL", raw).map(Ttl::secs),
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(CacheError::InvalidConfig(format!(
            "CACHE_ENABLED must be true or false: {raw:?}"
        ))),
    }
}
