//! `plrs hash`: the integrity anchor of one record file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use plrs_kernel::proof::anchor::anchor_hash;
use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_ledger::io::{load_json_file, write_text};
use serde::Serialize;

use crate::output::{status, OutputFormat};

#[derive(Serialize)]
struct HashOutput<'a> {
    algorithm: &'a str,
    hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
}

/// `<record>.hash`, next to the record.
fn hash_file_path(record: &Path) -> PathBuf {
    let mut name = OsString::from(record.as_os_str());
    name.push(".hash");
    PathBuf::from(name)
}

pub fn run(
    record: &Path,
    algorithm: HashAlgorithm,
    write: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let payload = load_json_file(record)?;
    let digest = anchor_hash(&payload, algorithm)
        .with_context(|| format!("failed to hash {}", record.display()))?;
    tracing::debug!(path = %record.display(), %algorithm, "hashed record");

    let written_to = if write {
        let path = hash_file_path(record);
        write_text(&path, &format!("{digest}\n"))?;
        Some(path)
    } else {
        None
    };

    let out = HashOutput {
        algorithm: algorithm.name(),
        hash: &digest,
        written_to: written_to.as_ref().map(|p| p.display().to_string()),
    };
    status("HASH", &digest, &out, format)?;
    if let (Some(path), OutputFormat::Text) = (&written_to, format) {
        println!("[SAVED] {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
