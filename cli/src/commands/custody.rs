//! `plrs custody append` and `plrs custody verify`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use plrs_ledger::bundle::EvidenceBundle;
use plrs_ledger::custody::{default_file_name, verify_custody, CustodyFields, CustodyLog};
use plrs_ledger::io::load_json_file;
use serde_json::json;

use crate::output::{report, status, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum CustodyCommands {
    /// Append a handling entry to the custody log of a bundled record
    Append {
        /// Evidence bundle the log is bound to
        bundle: PathBuf,

        /// Person or entity handling the evidence
        holder_name: String,

        /// Role of the holder (e.g. Attorney, Court_Clerk)
        holder_role: String,

        /// Action taken (e.g. Created, Transferred, Submitted_to_Court)
        action: String,

        /// Where the action took place
        #[arg(long, default_value = "")]
        location: String,

        /// Free-text notes
        #[arg(long, default_value = "")]
        notes: String,

        /// Custody log file [default: PLRS_ChainOfCustody_<ID>.json]
        #[arg(long)]
        coc_file: Option<PathBuf>,
    },

    /// Verify bindings, entry fields and timestamp order of a custody log
    Verify {
        /// Custody log JSON file
        coc_file: PathBuf,
    },
}

pub fn run_custody(cmd: CustodyCommands, format: OutputFormat) -> Result<ExitCode> {
    match cmd {
        CustodyCommands::Append {
            bundle,
            holder_name,
            holder_role,
            action,
            location,
            notes,
            coc_file,
        } => {
            let loaded = EvidenceBundle::load(&bundle)?;
            let kind = loaded.kind();
            let record_id = loaded.record_id().ok_or_else(|| {
                anyhow!("bundle does not contain a {kind} with {}", kind.id_field())
            })?;
            let record_hash = loaded
                .record_hash()
                .ok_or_else(|| anyhow!("bundle does not contain {}", kind.bundle_hash_key()))?;

            let path = coc_file.unwrap_or_else(|| PathBuf::from(default_file_name(record_id)));
            let mut log = CustodyLog::load_or_init(&path)?;
            let fields = CustodyFields::new(holder_name, holder_role, action)
                .with_location(location)
                .with_notes(notes);
            let bundle_ref = bundle.display().to_string();
            log.append(record_id, record_hash, Some(&bundle_ref), fields)
                .with_context(|| format!("cannot append to {}", path.display()))?;
            log.save(&path)?;

            status(
                "CoC UPDATED",
                &path.display().to_string(),
                &json!({
                    "coc_file": path.display().to_string(),
                    "record_id": record_id,
                    "entries": log.entries().len(),
                }),
                format,
            )?;
            Ok(ExitCode::SUCCESS)
        },
        CustodyCommands::Verify { coc_file } => {
            let value = load_json_file(&coc_file)?;
            let result = verify_custody(&value)?;
            report("CHAIN OF CUSTODY VERIFICATION", &result, format)
        },
    }
}
