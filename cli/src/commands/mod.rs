//! Subcommand implementations.

pub mod bundle;
pub mod custody;
pub mod hash;
pub mod index;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_kernel::record::{Record, RecordKind};
use plrs_ledger::io::load_json_file;

/// Hash algorithm selection shared by every hashing subcommand.
///
/// The name is resolved after parsing so an unknown algorithm surfaces as a
/// command error (exit 1) rather than a usage error.
#[derive(Args, Debug, Clone)]
pub struct AlgorithmArg {
    /// Hash algorithm (sha224, sha256, sha384, sha512, sha512_224, sha512_256)
    #[arg(long = "algo", env = "PLRS_HASH_ALGO", default_value = "sha256")]
    pub name: String,
}

impl AlgorithmArg {
    pub fn resolve(&self) -> Result<HashAlgorithm> {
        Ok(HashAlgorithm::from_name(&self.name)?)
    }
}

/// Load a record file as a record of `kind`.
pub fn load_record(path: &Path, kind: RecordKind) -> Result<Record> {
    let payload = load_json_file(path)?;
    Record::from_value(kind, payload).with_context(|| format!("invalid record in {}", path.display()))
}
