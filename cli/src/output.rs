//! Result rendering for stdout.
//!
//! Text output keeps the `[TAG] message` line layout PLRS tooling has always
//! printed; JSON output is one pretty-printed object per invocation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::ValueEnum;
use plrs_ledger::finding::AuditReport;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// JSON envelope around an audit report.
#[derive(Serialize)]
struct ReportOutput<'a> {
    check: &'a str,
    #[serde(flatten)]
    report: &'a AuditReport,
}

/// Print an audit report and map it to the process exit code.
pub fn report(check: &str, report: &AuditReport, format: OutputFormat) -> Result<ExitCode> {
    match format {
        OutputFormat::Text => {
            for finding in report.findings() {
                println!("[ERROR] {finding}");
            }
            if report.is_ok() {
                println!("[RESULT] {check} PASSED.");
            } else {
                println!(
                    "[RESULT] {check} FAILED: {} finding(s).",
                    report.findings().len()
                );
            }
        },
        OutputFormat::Json => json(&ReportOutput { check, report })?,
    }
    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print a one-line status in text mode, or `value` in JSON mode.
pub fn status<T: Serialize>(tag: &str, message: &str, value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("[{tag}] {message}");
            Ok(())
        },
        OutputFormat::Json => json(value),
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{text}");
    Ok(())
}
