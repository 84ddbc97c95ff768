//! PLRS Kernel: the deterministic integrity core of the Public Legal Record System.
//!
//! # API Surface
//!
//! - [`proof::canon::canonical_json_bytes`] -- canonical bytes of a record
//! - [`proof::hash::digest_hex`] -- named digest over bytes
//! - [`proof::anchor::anchor_hash`] -- the integrity anchor, `digest(encode(value))`
//! - [`record::Record`] -- tagged Event / Challenge records
//!
//! # Module Dependency Direction
//!
//! `proof` ← `record`
//!
//! `record` hashes only through `proof::anchor`. `proof` depends on nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod proof;
pub mod record;
