//! `plrs export-bundle` and `plrs verify-bundle`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Args;
use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_kernel::record::RecordKind;
use plrs_ledger::bundle::{build_bundle, verify_bundle, EvidenceBundle};
use plrs_ledger::index::IndexLedger;
use serde_json::json;

use super::{load_record, AlgorithmArg};
use crate::output::{report, status, OutputFormat};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Record JSON file
    pub record: PathBuf,

    /// Record kind (event, challenge)
    #[arg(long)]
    pub kind: RecordKind,

    /// Index file to embed the record's entry from
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Output path [default: PLRS_<Kind>_Bundle_<ID>.json]
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub algo: AlgorithmArg,
}

fn default_bundle_path(kind: RecordKind, record_id: &str) -> PathBuf {
    PathBuf::from(format!(
        "PLRS_{}_Bundle_{record_id}.json",
        kind.bundle_record_key()
    ))
}

pub fn export(args: &ExportArgs, format: OutputFormat) -> Result<ExitCode> {
    let algorithm = args.algo.resolve()?;
    let record = load_record(&args.record, args.kind)?;

    let index = match &args.index {
        Some(path) => Some(IndexLedger::load(args.kind, path)?),
        None => None,
    };
    let entry = match &index {
        Some(ledger) => {
            let Some(entry) = ledger.find(record.record_id()) else {
                bail!(
                    "{} {} is not listed in the index",
                    args.kind,
                    record.record_id()
                );
            };
            Some(entry)
        },
        None => None,
    };

    let reference = args.index.as_ref().map(|p| p.display().to_string());
    let bundle = build_bundle(&record, algorithm, entry, reference.as_deref())?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_bundle_path(args.kind, record.record_id()));
    bundle.save(&out)?;
    tracing::info!(record_id = record.record_id(), path = %out.display(), "bundle exported");

    status(
        "BUNDLE WRITTEN",
        &out.display().to_string(),
        &json!({
            "bundle": out.display().to_string(),
            "record_id": record.record_id(),
            "hash": bundle.record_hash(),
        }),
        format,
    )?;
    Ok(ExitCode::SUCCESS)
}

pub fn verify(path: &Path, algorithm: HashAlgorithm, format: OutputFormat) -> Result<ExitCode> {
    let bundle = EvidenceBundle::load(path)?;
    let result = verify_bundle(&bundle, algorithm)?;
    report("BUNDLE VERIFICATION", &result, format)
}
