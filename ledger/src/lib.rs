//! PLRS Ledger: verification and file formats over the kernel's integrity anchors.
//!
//! The ledger audits what others have claimed about records: hashes stored in
//! evidence bundles, sequence numbers and hashes in public indexes, cross-links
//! between the event and challenge ledgers, and the ordering of chain-of-custody
//! logs.
//!
//! The ledger does NOT hash on its own. Every recomputed hash comes from
//! `plrs_kernel::proof::anchor::anchor_hash`.
//!
//! # Crate dependency graph
//!
//! ```text
//! plrs_kernel  ←  plrs_ledger  ←  plrs_cli
//! (canon, hash)   (audits, files)  (process, exit codes)
//! ```
//!
//! Verification entry points are read-only; only [`custody`] and
//! [`index::IndexLedger::append`] build new state, and neither locks files.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod audit;
pub mod bundle;
pub mod custody;
pub mod finding;
pub mod index;
pub mod io;
pub mod store;
pub mod timestamp;
