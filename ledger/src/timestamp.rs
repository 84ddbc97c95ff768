//! UTC timestamps in the one fixed layout the ledger writes and compares.
//!
//! Layout: `YYYY-MM-DDTHH:MM:SSZ`. Fixed width, zero padded, UTC only, so
//! plain string comparison orders timestamps chronologically.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format an instant at second precision with a `Z` designator.
#[must_use]
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The current UTC time in ledger layout.
#[must_use]
pub fn utc_now() -> String {
    format_utc(Utc::now())
}

/// Whether `ts` carries a date/time separator and an explicit UTC designator.
///
/// Deliberately shallow: numeric offsets (`+00:00`) are rejected, everything
/// else about the layout is left to the upstream normalizer.
#[must_use]
pub fn is_utc_designated(ts: &str) -> bool {
    ts.contains('T') && ts.ends_with('Z')
}
