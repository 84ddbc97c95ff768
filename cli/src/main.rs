//! plrs - Public Legal Record System integrity tool
//!
//! Hashes records, exports and verifies evidence bundles, audits index
//! ledgers, and maintains chain-of-custody logs.
//!
//! Exit code 0 means everything checked is consistent; 1 means at least one
//! finding was reported or the input could not be processed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::AlgorithmArg;
use output::OutputFormat;

/// plrs - Public Legal Record System integrity tool
#[derive(Parser, Debug)]
#[command(name = "plrs")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, env = "PLRS_LOG", default_value = "warn", global = true)]
    log_level: String,

    /// Result output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the integrity hash of a record file
    Hash {
        /// Record JSON file
        record: PathBuf,

        #[command(flatten)]
        algo: AlgorithmArg,

        /// Also write the hash to `<record>.hash`
        #[arg(long)]
        write: bool,
    },

    /// Export a record as a self-verifying evidence bundle
    ExportBundle(commands::bundle::ExportArgs),

    /// Verify an evidence bundle's internal consistency
    VerifyBundle {
        /// Bundle JSON file
        bundle: PathBuf,

        #[command(flatten)]
        algo: AlgorithmArg,
    },

    /// Verify one index against its record directory
    VerifyIndex(commands::index::VerifyArgs),

    /// Audit the event and challenge ledgers together
    AuditLedger(commands::index::AuditArgs),

    /// Index maintenance
    #[command(subcommand)]
    Index(commands::index::IndexCommands),

    /// Chain-of-custody logs
    #[command(subcommand)]
    Custody(commands::custody::CustodyCommands),
}

fn run(cli: Cli) -> Result<ExitCode> {
    let format = cli.format;
    match cli.command {
        Commands::Hash {
            record,
            algo,
            write,
        } => commands::hash::run(&record, algo.resolve()?, write, format),
        Commands::ExportBundle(args) => commands::bundle::export(&args, format),
        Commands::VerifyBundle { bundle, algo } => {
            commands::bundle::verify(&bundle, algo.resolve()?, format)
        },
        Commands::VerifyIndex(args) => commands::index::verify(&args, format),
        Commands::AuditLedger(args) => commands::index::audit(&args, format),
        Commands::Index(cmd) => commands::index::run_index(cmd, format),
        Commands::Custody(cmd) => commands::custody::run_custody(cmd, format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[ERROR] {e:#}");
            ExitCode::FAILURE
        },
    }
}
