//! Proof module: canonical encoding, integrity hashing, and the anchor that
//! composes them.
//!
//! Nothing outside `proof` produces bytes that are hashed.

pub mod anchor;
pub mod canon;
pub mod hash;
