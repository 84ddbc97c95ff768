//! Integrity findings: structured, accumulated audit results.
//!
//! A finding is not an error. Audits never stop at the first defect; they
//! collect every finding into an [`AuditReport`] so one run yields the
//! complete defect list. Terminal problems (unreadable input, unknown
//! algorithm, unencodable record) are errors in the owning module instead.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

use plrs_kernel::record::RecordKind;

/// A single integrity defect.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    /// The bundle lacks a usable record or hash; nothing was recomputed.
    MalformedBundle { kind: RecordKind, detail: String },
    /// A recomputed anchor differs from the stored claim.
    HashMismatch {
        kind: RecordKind,
        record_id: Option<String>,
        claimed: String,
        computed: String,
    },
    /// A bundle's embedded index entry carries a different hash than the bundle.
    IndexHashMismatch {
        kind: RecordKind,
        index_hash: Option<String>,
        bundle_hash: String,
    },
    /// `Index_Seq` broke the strictly increasing, gapless sequence.
    SequenceGap {
        kind: RecordKind,
        expected: i64,
        found: Value,
        position: usize,
        record_id: Option<String>,
    },
    /// An index entry is missing its record ID or hash.
    MalformedEntry {
        kind: RecordKind,
        position: usize,
        detail: String,
    },
    /// The record named by an index entry is absent or unreadable.
    MissingRecord {
        kind: RecordKind,
        record_id: String,
        detail: String,
    },
    /// The record named by an index entry could not be canonicalized.
    Unhashable {
        kind: RecordKind,
        record_id: String,
        detail: String,
    },
    /// A challenge names an event that is not in the event ledger.
    DanglingReference {
        challenge_id: Option<String>,
        position: usize,
        event_id: String,
    },
    /// An index file could not be loaded at all.
    IndexUnreadable { kind: RecordKind, detail: String },
    /// A custody log lacks its record binding.
    CustodyBindingMissing { field: &'static str },
    /// A custody entry timestamp is missing or not UTC-designated.
    CustodyTimestampInvalid { entry: usize, timestamp: Value },
    /// A custody entry is missing a required field.
    CustodyFieldMissing { entry: usize, field: &'static str },
    /// A custody entry is not strictly later than its predecessor.
    CustodyOrderViolation {
        entry: usize,
        timestamp: String,
        previous: String,
    },
}

fn or_unknown(id: Option<&String>) -> &str {
    id.map_or("<unknown>", String::as_str)
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedBundle { kind, detail } => {
                write!(f, "[{kind} bundle] {detail}")
            }
            Self::HashMismatch {
                kind,
                record_id,
                claimed,
                computed,
            } => write!(
                f,
                "[HASH MISMATCH] {kind} {}: claimed={claimed}, computed={computed}",
                or_unknown(record_id.as_ref())
            ),
            Self::IndexHashMismatch {
                kind,
                index_hash,
                bundle_hash,
            } => write!(
                f,
                "[INDEX HASH MISMATCH] {kind} bundle: index={}, bundle={bundle_hash}",
                index_hash.as_deref().unwrap_or("<missing>")
            ),
            Self::SequenceGap {
                kind,
                expected,
                found,
                position,
                record_id,
            } => write!(
                f,
                "[{kind} index] Index_Seq error: expected {expected}, found {found} \
                 at position {position} ({})",
                or_unknown(record_id.as_ref())
            ),
            Self::MalformedEntry {
                kind,
                position,
                detail,
            } => write!(f, "[{kind} index] entry at position {position}: {detail}"),
            Self::MissingRecord {
                kind,
                record_id,
                detail,
            } => write!(f, "[MISSING/INVALID {kind}] {record_id}: {detail}"),
            Self::Unhashable {
                kind,
                record_id,
                detail,
            } => write!(f, "[HASH ERROR] {kind} {record_id}: {detail}"),
            Self::DanglingReference {
                challenge_id,
                position,
                event_id,
            } => write!(
                f,
                "[challenge index] Challenged_Event_ID={event_id} for challenge {} \
                 (position {position}) does not exist in the event index",
                or_unknown(challenge_id.as_ref())
            ),
            Self::IndexUnreadable { kind, detail } => {
                write!(f, "[{kind} index] {detail}")
            }
            Self::CustodyBindingMissing { field } => {
                write!(f, "missing or invalid {field}")
            }
            Self::CustodyTimestampInvalid { entry, timestamp } => {
                write!(f, "entry {entry} has invalid or non-UTC timestamp: {timestamp}")
            }
            Self::CustodyFieldMissing { entry, field } => {
                write!(f, "entry {entry} missing {field}")
            }
            Self::CustodyOrderViolation {
                entry,
                timestamp,
                previous,
            } => write!(
                f,
                "entry {entry} timestamp {timestamp} is not strictly later than previous entry ({previous})"
            ),
        }
    }
}

/// Accumulated findings of one verification run.
///
/// `ok` iff no findings were recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    findings: Vec<Finding>,
}

impl AuditReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finding.
    pub fn push(&mut self, finding: Finding) {
        tracing::debug!(%finding, "integrity finding");
        self.findings.push(finding);
    }

    /// Absorb another report's findings, preserving order.
    pub fn merge(&mut self, other: AuditReport) {
        self.extend(other.findings);
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }

    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    #[must_use]
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

impl Extend<Finding> for AuditReport {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        for finding in iter {
            self.push(finding);
        }
    }
}

impl From<Vec<Finding>> for AuditReport {
    fn from(findings: Vec<Finding>) -> Self {
        let mut report = Self::new();
        report.extend(findings);
        report
    }
}

impl Serialize for AuditReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AuditReport", 2)?;
        state.serialize_field("ok", &self.is_ok())?;
        state.serialize_field("findings", &self.findings)?;
        state.end()
    }
}
