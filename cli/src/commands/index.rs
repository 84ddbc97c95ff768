//! `plrs verify-index`, `plrs audit-ledger` and `plrs index ...`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use plrs_kernel::record::RecordKind;
use plrs_ledger::audit::{LedgerAuditor, LedgerPaths};
use plrs_ledger::index::IndexLedger;
use plrs_ledger::io::InputError;
use plrs_ledger::store::DirRecordStore;

use super::{load_record, AlgorithmArg};
use crate::output::{report, status, OutputFormat};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Index JSON file
    pub index: PathBuf,

    /// Directory holding `<ID>.json` record files
    #[arg(long, default_value = ".")]
    pub records_dir: PathBuf,

    /// Record kind listed in the index (event, challenge)
    #[arg(long, default_value = "event")]
    pub kind: RecordKind,

    #[command(flatten)]
    pub algo: AlgorithmArg,
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Event index file
    #[arg(long, default_value = "public_index.json")]
    pub event_index: PathBuf,

    /// Challenge index file
    #[arg(long, default_value = "public_challenge_index.json")]
    pub challenge_index: PathBuf,

    /// Directory holding event records
    #[arg(long, default_value = ".")]
    pub events_dir: PathBuf,

    /// Directory holding challenge records
    #[arg(long, default_value = ".")]
    pub challenges_dir: PathBuf,

    #[command(flatten)]
    pub algo: AlgorithmArg,
}

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Append a record to an index, creating the index if absent
    Append {
        /// Index JSON file
        index: PathBuf,

        /// Record JSON file
        record: PathBuf,

        /// Record kind (event, challenge)
        #[arg(long)]
        kind: RecordKind,

        #[command(flatten)]
        algo: AlgorithmArg,
    },
}

pub fn verify(args: &VerifyArgs, format: OutputFormat) -> Result<ExitCode> {
    let auditor = LedgerAuditor::new(args.algo.resolve()?);
    let ledger = IndexLedger::load(args.kind, &args.index)?;
    let store = DirRecordStore::new(&args.records_dir);
    let result = auditor.audit_index(&ledger, &store);
    report("INDEX VERIFICATION", &result, format)
}

pub fn audit(args: &AuditArgs, format: OutputFormat) -> Result<ExitCode> {
    let paths = LedgerPaths {
        event_index: args.event_index.clone(),
        challenge_index: args.challenge_index.clone(),
        events_dir: args.events_dir.clone(),
        challenges_dir: args.challenges_dir.clone(),
    };
    let result = LedgerAuditor::new(args.algo.resolve()?).run_files(&paths);
    report("LEDGER INTEGRITY AUDIT", &result, format)
}

pub fn run_index(cmd: IndexCommands, format: OutputFormat) -> Result<ExitCode> {
    match cmd {
        IndexCommands::Append {
            index,
            record,
            kind,
            algo,
        } => {
            let algorithm = algo.resolve()?;
            let record = load_record(&record, kind)?;
            let mut ledger = match IndexLedger::load(kind, &index) {
                Ok(ledger) => ledger,
                Err(InputError::NotFound { .. }) => IndexLedger::new(kind),
                Err(e) => return Err(e.into()),
            };
            let entry = ledger
                .append(&record, algorithm)
                .with_context(|| format!("cannot append to {}", index.display()))?
                .raw()
                .clone();
            ledger.save(&index)?;
            status(
                "INDEX UPDATED",
                &format!(
                    "{} {} as Index_Seq {}",
                    index.display(),
                    record.record_id(),
                    entry["Index_Seq"]
                ),
                &entry,
                format,
            )?;
            Ok(ExitCode::SUCCESS)
        },
    }
}
