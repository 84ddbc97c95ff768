//! Public index ledgers and their audit algorithms.
//!
//! An index file is a JSON array of entry objects. Array position is the
//! asserted order; `Index_Seq` must count 1, 2, 3, ... along it. Entries are
//! kept as raw JSON so that malformed entries still flow through the audits
//! and are reported, not rejected at load time.
//!
//! # Audits
//!
//! - [`audit_sequence`]: gapless, strictly increasing `Index_Seq`
//! - [`audit_hashes`]: every entry's `Hash` matches its record's recomputed anchor
//! - [`audit_cross_links`]: every challenge's `Challenged_Event_ID` names a known event
//!
//! All three check every entry; none stops at the first finding.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::{Map, Value};

use plrs_kernel::proof::anchor::anchor_hash;
use plrs_kernel::proof::canon::CanonError;
use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_kernel::record::{Record, RecordKind, CHALLENGED_EVENT_ID_FIELD};

use crate::finding::Finding;
use crate::io::{load_json_array, write_json_pretty, InputError};
use crate::store::RecordStore;
use crate::timestamp::utc_now;

pub const INDEX_SEQ_FIELD: &str = "Index_Seq";
pub const HASH_FIELD: &str = "Hash";
pub const TIMESTAMP_FIELD: &str = "Timestamp_UTC";

/// Error appending to an index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The record's kind does not match the ledger's.
    #[error("cannot append a {record} record to the {ledger} index")]
    KindMismatch {
        ledger: RecordKind,
        record: RecordKind,
    },
    /// The record is already indexed; the index is append-only.
    #[error("{kind} {record_id} is already listed in the index")]
    DuplicateRecord { kind: RecordKind, record_id: String },
    /// The record could not be canonicalized.
    #[error(transparent)]
    Encoding(#[from] CanonError),
}

/// One index entry, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    raw: Value,
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

impl IndexEntry {
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The asserted sequence number, exactly as stored.
    #[must_use]
    pub fn seq(&self) -> Option<&Value> {
        self.raw.get(INDEX_SEQ_FIELD)
    }

    /// The record identifier under `kind`'s ID field.
    #[must_use]
    pub fn record_id(&self, kind: RecordKind) -> Option<&str> {
        non_empty_str(self.raw.get(kind.id_field()))
    }

    /// The hash this entry claims for its record.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        non_empty_str(self.raw.get(HASH_FIELD))
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        non_empty_str(self.raw.get(TIMESTAMP_FIELD))
    }

    /// The raw `Challenged_Event_ID` value, if present and not null.
    #[must_use]
    pub fn challenged_event_id(&self) -> Option<&Value> {
        self.raw
            .get(CHALLENGED_EVENT_ID_FIELD)
            .filter(|v| !v.is_null())
    }
}

/// An ordered index of one record kind.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLedger {
    kind: RecordKind,
    entries: Vec<IndexEntry>,
}

impl IndexLedger {
    /// An empty ledger.
    #[must_use]
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// A ledger over already-parsed entries, in asserted order.
    #[must_use]
    pub fn from_entries(kind: RecordKind, entries: Vec<Value>) -> Self {
        Self {
            kind,
            entries: entries.into_iter().map(IndexEntry::new).collect(),
        }
    }

    /// Load an index file.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the file is missing, malformed, or not an array.
    pub fn load(kind: RecordKind, path: &Path) -> Result<Self, InputError> {
        let entries = load_json_array(path)?;
        tracing::debug!(%kind, path = %path.display(), entries = entries.len(), "loaded index");
        Ok(Self::from_entries(kind, entries))
    }

    /// Write the index back as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Io`] on write failure.
    pub fn save(&self, path: &Path) -> Result<(), InputError> {
        write_json_pretty(path, &self.to_value())
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(self.entries.iter().map(|e| e.raw.clone()).collect())
    }

    /// Every record ID named by an entry.
    #[must_use]
    pub fn record_ids(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter_map(|e| e.record_id(self.kind))
            .map(str::to_string)
            .collect()
    }

    /// The first entry naming `record_id`.
    #[must_use]
    pub fn find(&self, record_id: &str) -> Option<&IndexEntry> {
        self.entries
            .iter()
            .find(|e| e.record_id(self.kind) == Some(record_id))
    }

    /// The `Index_Seq` the next appended entry receives: the audit's
    /// expected counter after the last entry.
    #[must_use]
    pub fn next_seq(&self) -> i64 {
        sequence_fold(self).0
    }

    /// Append `record`, stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// See [`IndexLedger::append_at`].
    pub fn append(
        &mut self,
        record: &Record,
        algorithm: HashAlgorithm,
    ) -> Result<&IndexEntry, IndexError> {
        self.append_at(record, algorithm, &utc_now())
    }

    /// Append `record` with an explicit `Timestamp_UTC`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KindMismatch`] for a record of the other kind,
    /// [`IndexError::DuplicateRecord`] if the record is already listed, or
    /// [`IndexError::Encoding`] if the record cannot be hashed. The ledger is
    /// unchanged on error.
    pub fn append_at(
        &mut self,
        record: &Record,
        algorithm: HashAlgorithm,
        timestamp: &str,
    ) -> Result<&IndexEntry, IndexError> {
        if record.kind() != self.kind {
            return Err(IndexError::KindMismatch {
                ledger: self.kind,
                record: record.kind(),
            });
        }
        let record_id = record.record_id();
        if self.find(record_id).is_some() {
            return Err(IndexError::DuplicateRecord {
                kind: self.kind,
                record_id: record_id.to_string(),
            });
        }
        let hash = record.integrity_hash(algorithm)?;

        let mut entry = Map::new();
        entry.insert(INDEX_SEQ_FIELD.to_string(), Value::from(self.next_seq()));
        entry.insert(
            self.kind.id_field().to_string(),
            Value::String(record_id.to_string()),
        );
        entry.insert(HASH_FIELD.to_string(), Value::String(hash));
        entry.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(timestamp.to_string()),
        );
        if let Some(event_id) = record.challenged_event_id() {
            entry.insert(
                CHALLENGED_EVENT_ID_FIELD.to_string(),
                Value::String(event_id.to_string()),
            );
        }

        tracing::info!(kind = %self.kind, record_id, "appending index entry");
        self.entries.push(IndexEntry::new(Value::Object(entry)));
        Ok(&self.entries[self.entries.len() - 1])
    }
}

/// Whether an observed `Index_Seq` equals the expected counter.
fn seq_matches(observed: Option<&Value>, expected: i64) -> bool {
    let Some(Value::Number(n)) = observed else {
        return false;
    };
    if let Some(i) = n.as_i64() {
        return i == expected;
    }
    #[allow(clippy::cast_precision_loss)]
    let expected = expected as f64;
    n.is_f64() && n.as_f64() == Some(expected)
}

/// The integer an observed `Index_Seq` resynchronizes the counter to, if any.
///
/// JSON integers, finite floats (truncated) and strings holding a base-10
/// integer count. `null`, booleans, arrays and objects do not.
#[allow(clippy::cast_possible_truncation)]
fn resync_value(observed: Option<&Value>) -> Option<i64> {
    match observed? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < 9.0e18)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Fold over the entries with `expected = 1`, returning the counter after the
/// last entry and the sequence findings.
///
/// On mismatch the counter resyncs to the observed value when that value is an
/// integer, so a single gap is reported once instead of cascading onto every
/// later entry. The counter then always advances by one.
fn sequence_fold(ledger: &IndexLedger) -> (i64, Vec<Finding>) {
    let kind = ledger.kind;
    ledger.entries.iter().enumerate().fold(
        (1_i64, Vec::new()),
        |(expected, mut findings), (i, entry)| {
            let observed = entry.seq();
            let current = if seq_matches(observed, expected) {
                expected
            } else {
                findings.push(Finding::SequenceGap {
                    kind,
                    expected,
                    found: observed.cloned().unwrap_or(Value::Null),
                    position: i + 1,
                    record_id: entry.record_id(kind).map(str::to_string),
                });
                resync_value(observed).unwrap_or(expected)
            };
            (current.saturating_add(1), findings)
        },
    )
}

/// Check that `Index_Seq` is strictly increasing and gapless from 1.
#[must_use]
pub fn audit_sequence(ledger: &IndexLedger) -> Vec<Finding> {
    tracing::debug!(kind = %ledger.kind, entries = ledger.len(), "auditing index sequence");
    sequence_fold(ledger).1
}

/// Recompute every entry's record anchor and compare it to the entry's `Hash`.
#[must_use]
pub fn audit_hashes(
    ledger: &IndexLedger,
    store: &dyn RecordStore,
    algorithm: HashAlgorithm,
) -> Vec<Finding> {
    let kind = ledger.kind;
    tracing::debug!(%kind, entries = ledger.len(), %algorithm, "auditing index hashes");

    let mut findings = Vec::new();
    for (i, entry) in ledger.entries.iter().enumerate() {
        let (Some(record_id), Some(claimed)) = (entry.record_id(kind), entry.hash()) else {
            findings.push(Finding::MalformedEntry {
                kind,
                position: i + 1,
                detail: format!("missing {} or {HASH_FIELD}", kind.id_field()),
            });
            continue;
        };

        let payload = match store.load(record_id) {
            Ok(payload) => payload,
            Err(e) => {
                findings.push(Finding::MissingRecord {
                    kind,
                    record_id: record_id.to_string(),
                    detail: e.to_string(),
                });
                continue;
            }
        };

        match anchor_hash(&payload, algorithm) {
            Ok(computed) if computed == claimed => {}
            Ok(computed) => findings.push(Finding::HashMismatch {
                kind,
                record_id: Some(record_id.to_string()),
                claimed: claimed.to_string(),
                computed,
            }),
            Err(e) => findings.push(Finding::Unhashable {
                kind,
                record_id: record_id.to_string(),
                detail: e.to_string(),
            }),
        }
    }
    findings
}

/// Check every challenge entry's `Challenged_Event_ID` against the known event IDs.
///
/// Entries without a challenged event (absent, null, or empty string) are
/// skipped. A non-string value never names a known event.
#[must_use]
pub fn audit_cross_links(challenges: &IndexLedger, known_event_ids: &BTreeSet<String>) -> Vec<Finding> {
    tracing::debug!(
        entries = challenges.len(),
        known_events = known_event_ids.len(),
        "auditing challenge cross-links"
    );
    challenges
        .entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let event_id = match entry.challenged_event_id()? {
                Value::String(s) if s.is_empty() => return None,
                Value::String(s) if known_event_ids.contains(s) => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(Finding::DanglingReference {
                challenge_id: entry.record_id(challenges.kind).map(str::to_string),
                position: i + 1,
                event_id,
            })
        })
        .collect()
}
