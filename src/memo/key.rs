//! Memoization key derivation
//!
//! Keys are `"{name}:{sha256 hex}"` over a canonical encoding of the arguments.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::memo::canonical::to_canonical;

/// Derives the cache key for calling computation `name` with `args`.
///
/// Arguments are first converted to a tagged canonical form that keeps exact
/// float bits and `Option` tags and sorts map entries, so equal arguments
/// always encode the same way and different ones never share an encoding.
///
/// # Errors
/// The arguments' `Serialize` implementation failed.
pub fn derive_key<A>(name: &str, args: &A) -> serde_json::Result<String>
where
    A: Serialize + ?Sized,
{
    let canonical = serde_json::to_vec(&to_canonical(args)?)?;
    let digest = Sha256::digest(&canonical);
    Ok(format!("{}:{}", name, hex::encode(digest)))
}
