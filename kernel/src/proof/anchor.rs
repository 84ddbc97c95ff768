//! Integrity anchor: `digest(encode(value))`.
//!
//! This is the one composition of [`super::canon`] and [`super::hash`] that
//! bundle verification, ledger audits, custody binding and the CLI all share.
//! Hashing a record anywhere else is a bug.

use super::canon::{canonical_json_bytes, CanonError};
use super::hash::{digest_hex, HashAlgorithm};

/// Compute the integrity anchor of a JSON value.
///
/// # Errors
///
/// Returns [`CanonError`] if the value cannot be canonicalized.
pub fn anchor_hash(
    value: &serde_json::Value,
    algorithm: HashAlgorithm,
) -> Result<String, CanonError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(digest_hex(&bytes, algorithm))
}
