//! Memoization Module
//!
//! Caches results of deterministic computations keyed by their arguments.
//!
//! ```ignore
//! let cache: Cache<String, u64> = Cache::new(CacheConfig::default())?;
//! let total = cache
//!     .memoize("daily_total", |(region, day): (String, u32)| load_total(&region, day))
//!     .with_ttl(Ttl::secs(30));
//! let value = total.call(("eu".to_string(), 12))?;
//! ```

mod canonical;
mod key;
mod memoized;

pub use key::derive_key;
pub use memoized::Memoized;
