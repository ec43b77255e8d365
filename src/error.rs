//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::collections::TryReserveError;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Lookups never fail: a missing or expired key is reported as `None`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage for a new entry could not be reserved
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = CacheError::InvalidConfig("capacity must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: capacity must be positive"
        );
    }

    #[test]
    fn test_allocation_from_try_reserve() {
        let mut v: Vec<u8> = Vec::new();
        let reserve_err = v.try_reserve(usize::MAX).unwrap_err();
        let err: CacheError = reserve_err.into();
        assert!(matches!(err, CacheError::Allocation(_)));
        assert!(err.to_string().starts_with("Allocation failed"));
    }
}
