//! Chain-of-custody logs: who held a record's evidence, in what role, and when.
//!
//! A log is bound to exactly one record by `Record_ID` + `Record_Hash`. The
//! first append fixes both; every later append must present the same pair,
//! so versions of the same evidence can never be mixed in one log.
//!
//! Entries are append-only and their `Entry_Timestamp_UTC` values strictly
//! increase in list order. [`CustodyLog::append`] refuses to break that, and
//! [`verify_custody`] reports every log that does.
//!
//! Logs written before records were generalized use `Event_ID` / `Event_Hash`
//! as binding keys. They load unchanged and are saved with the `Record_*` keys.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::finding::{AuditReport, Finding};
use crate::io::{load_json_file, write_json_pretty, InputError};
use crate::timestamp::{is_utc_designated, utc_now};

pub const COC_VERSION: &str = "1.0";
pub const RECORD_ID_KEY: &str = "Record_ID";
pub const RECORD_HASH_KEY: &str = "Record_Hash";
pub const LEGACY_RECORD_ID_KEY: &str = "Event_ID";
pub const LEGACY_RECORD_HASH_KEY: &str = "Event_Hash";
pub const ENTRIES_KEY: &str = "Chain_Of_Custody";
pub const TIMESTAMP_KEY: &str = "Entry_Timestamp_UTC";

const REQUIRED_ENTRY_FIELDS: [&str; 3] = ["Holder_Name", "Holder_Role", "Action"];

/// Error loading, appending to or verifying a custody log.
#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    /// The log does not have the custody log shape.
    #[error("chain of custody log has invalid structure: {detail}")]
    MalformedLog { detail: String },
    /// The log is bound to a different record.
    #[error(
        "chain of custody log is bound to Record_ID {bound}, \
         but attempted to append for Record_ID {attempted}"
    )]
    RecordIdentityMismatch { bound: String, attempted: String },
    /// The log is bound to a different version of the record.
    #[error(
        "Record_Hash {bound} in chain of custody log does not match {attempted}; \
         refusing to mix different versions of evidence"
    )]
    HashIdentityMismatch { bound: String, attempted: String },
    /// The new entry would not be strictly later than the last one.
    #[error("new entry timestamp {attempted} is not later than the last entry ({last})")]
    TimestampNotIncreasing { last: String, attempted: String },
    /// The log could not be serialized.
    #[error("failed to serialize chain of custody log: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// One handling event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEntry {
    #[serde(rename = "Entry_Timestamp_UTC")]
    pub timestamp: String,
    #[serde(rename = "Holder_Name")]
    pub holder_name: String,
    #[serde(rename = "Holder_Role")]
    pub holder_role: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Notes")]
    pub notes: Option<String>,
}

/// Caller-supplied part of a custody entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustodyFields {
    pub holder_name: String,
    pub holder_role: String,
    pub action: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl CustodyFields {
    pub fn new(
        holder_name: impl Into<String>,
        holder_role: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            holder_name: holder_name.into(),
            holder_role: holder_role.into(),
            action: action.into(),
            location: None,
            notes: None,
        }
    }

    /// Set the location; an empty string clears it.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into()).filter(|s| !s.is_empty());
        self
    }

    /// Set the notes; an empty string clears them.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into()).filter(|s| !s.is_empty());
        self
    }

    fn stamp(self, timestamp: &str) -> CustodyEntry {
        CustodyEntry {
            timestamp: timestamp.to_string(),
            holder_name: self.holder_name,
            holder_role: self.holder_role,
            action: self.action,
            location: self.location,
            notes: self.notes,
        }
    }
}

fn default_version() -> String {
    COC_VERSION.to_string()
}

/// A chain-of-custody log.
///
/// Entries are kept as raw JSON so that a hand-edited log still loads and
/// its defects surface in [`CustodyLog::verify`] instead of at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyLog {
    #[serde(rename = "CoC_Version", default = "default_version")]
    version: String,
    #[serde(rename = "Record_ID", default)]
    record_id: Option<String>,
    #[serde(rename = "Record_Hash", default)]
    record_hash: Option<String>,
    #[serde(rename = "Evidence_Bundle_File", default)]
    evidence_bundle_file: Option<String>,
    #[serde(rename = "Chain_Of_Custody")]
    entries: Vec<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for CustodyLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CustodyLog {
    /// A fresh, unbound log with no entries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: default_version(),
            record_id: None,
            record_hash: None,
            evidence_bundle_file: None,
            entries: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Start a new log, or take over an existing one after a shape check.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::MalformedLog`] if `existing` is not an object
    /// with a `Chain_Of_Custody` list, or a binding field is not a string.
    pub fn init_or_load(existing: Option<Value>) -> Result<Self, CustodyError> {
        match existing {
            None => Ok(Self::new()),
            Some(value) => Self::from_value(value),
        }
    }

    /// Parse an existing log.
    ///
    /// # Errors
    ///
    /// See [`CustodyLog::init_or_load`].
    pub fn from_value(value: Value) -> Result<Self, CustodyError> {
        let Value::Object(mut map) = value else {
            return Err(CustodyError::MalformedLog {
                detail: "top level must be a JSON object".to_string(),
            });
        };
        for (legacy, key) in [
            (LEGACY_RECORD_ID_KEY, RECORD_ID_KEY),
            (LEGACY_RECORD_HASH_KEY, RECORD_HASH_KEY),
        ] {
            if !map.contains_key(key) {
                if let Some(bound) = map.remove(legacy) {
                    map.insert(key.to_string(), bound);
                }
            }
        }
        serde_json::from_value(Value::Object(map)).map_err(|e| CustodyError::MalformedLog {
            detail: e.to_string(),
        })
    }

    /// Load the log at `path`, or start a new one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::Input`] if the file exists but cannot be read
    /// or parsed, or [`CustodyError::MalformedLog`] on a bad shape.
    pub fn load_or_init(path: &Path) -> Result<Self, CustodyError> {
        match load_json_file(path) {
            Ok(value) => {
                let log = Self::from_value(value)?;
                tracing::debug!(path = %path.display(), entries = log.entries.len(), "loaded custody log");
                Ok(log)
            }
            Err(InputError::NotFound { .. }) => {
                tracing::debug!(path = %path.display(), "starting new custody log");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the log as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::Serialize`] or [`CustodyError::Input`].
    pub fn save(&self, path: &Path) -> Result<(), CustodyError> {
        write_json_pretty(path, &self.to_value()?)?;
        Ok(())
    }

    /// The log as JSON, with the current binding keys.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::Serialize`] if serialization fails.
    pub fn to_value(&self) -> Result<Value, CustodyError> {
        serde_json::to_value(self).map_err(CustodyError::Serialize)
    }

    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    #[must_use]
    pub fn record_hash(&self) -> Option<&str> {
        self.record_hash.as_deref()
    }

    #[must_use]
    pub fn evidence_bundle_file(&self) -> Option<&str> {
        self.evidence_bundle_file.as_deref()
    }

    #[must_use]
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Append an entry stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// See [`CustodyLog::append_at`].
    pub fn append(
        &mut self,
        record_id: &str,
        record_hash: &str,
        bundle_file: Option<&str>,
        fields: CustodyFields,
    ) -> Result<(), CustodyError> {
        self.append_at(record_id, record_hash, bundle_file, fields, &utc_now())
    }

    /// Append an entry with an explicit timestamp.
    ///
    /// Binds the log to `record_id` / `record_hash` on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::RecordIdentityMismatch`] or
    /// [`CustodyError::HashIdentityMismatch`] if the log is bound to another
    /// record or version, and [`CustodyError::TimestampNotIncreasing`] if
    /// `timestamp` is not strictly later than the last entry's. The log is
    /// unchanged on error.
    pub fn append_at(
        &mut self,
        record_id: &str,
        record_hash: &str,
        bundle_file: Option<&str>,
        fields: CustodyFields,
        timestamp: &str,
    ) -> Result<(), CustodyError> {
        if let Some(bound) = self.record_id.as_deref().filter(|b| *b != record_id) {
            return Err(CustodyError::RecordIdentityMismatch {
                bound: bound.to_string(),
                attempted: record_id.to_string(),
            });
        }
        if let Some(bound) = self.record_hash.as_deref().filter(|b| *b != record_hash) {
            return Err(CustodyError::HashIdentityMismatch {
                bound: bound.to_string(),
                attempted: record_hash.to_string(),
            });
        }
        let last = self
            .entries
            .last()
            .and_then(|e| e.get(TIMESTAMP_KEY))
            .and_then(Value::as_str);
        if let Some(last) = last.filter(|last| timestamp <= *last) {
            return Err(CustodyError::TimestampNotIncreasing {
                last: last.to_string(),
                attempted: timestamp.to_string(),
            });
        }
        let entry =
            serde_json::to_value(fields.stamp(timestamp)).map_err(CustodyError::Serialize)?;

        self.record_id.get_or_insert_with(|| record_id.to_string());
        self.record_hash
            .get_or_insert_with(|| record_hash.to_string());
        if self.evidence_bundle_file.is_none() {
            self.evidence_bundle_file = bundle_file.map(str::to_string);
        }
        tracing::info!(record_id, timestamp, entry = self.entries.len() + 1, "appending custody entry");
        self.entries.push(entry);
        Ok(())
    }

    /// Verify bindings, entry fields and timestamp ordering.
    #[must_use]
    pub fn verify(&self) -> AuditReport {
        audit_log(
            self.record_id.as_deref(),
            self.record_hash.as_deref(),
            &self.entries,
        )
    }
}

/// Default file name of the custody log for `record_id`.
#[must_use]
pub fn default_file_name(record_id: &str) -> String {
    format!("PLRS_ChainOfCustody_{record_id}.json")
}

fn binding<'a>(log: &'a Map<String, Value>, key: &str, legacy: &str) -> Option<&'a str> {
    log.get(key)
        .or_else(|| log.get(legacy))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Verify a custody log given as raw JSON.
///
/// Unlike [`CustodyLog::from_value`], binding fields of the wrong type are
/// reported as findings, not rejected.
///
/// # Errors
///
/// Returns [`CustodyError::MalformedLog`] if the top level is not an object
/// or `Chain_Of_Custody` is not a list. Every other defect is a finding.
pub fn verify_custody(log: &Value) -> Result<AuditReport, CustodyError> {
    let Value::Object(map) = log else {
        return Err(CustodyError::MalformedLog {
            detail: "top level must be a JSON object".to_string(),
        });
    };
    let Some(Value::Array(entries)) = map.get(ENTRIES_KEY) else {
        return Err(CustodyError::MalformedLog {
            detail: format!("{ENTRIES_KEY} must be a list"),
        });
    };
    Ok(audit_log(
        binding(map, RECORD_ID_KEY, LEGACY_RECORD_ID_KEY),
        binding(map, RECORD_HASH_KEY, LEGACY_RECORD_HASH_KEY),
        entries,
    ))
}

fn audit_log(record_id: Option<&str>, record_hash: Option<&str>, entries: &[Value]) -> AuditReport {
    let mut report = AuditReport::new();
    if !record_id.is_some_and(|s| !s.is_empty()) {
        report.push(Finding::CustodyBindingMissing {
            field: RECORD_ID_KEY,
        });
    }
    if !record_hash.is_some_and(|s| !s.is_empty()) {
        report.push(Finding::CustodyBindingMissing {
            field: RECORD_HASH_KEY,
        });
    }

    let mut previous: Option<&Value> = None;
    for (i, entry) in entries.iter().enumerate() {
        let position = i + 1;
        let timestamp = entry.get(TIMESTAMP_KEY);

        if !timestamp
            .and_then(Value::as_str)
            .is_some_and(is_utc_designated)
        {
            report.push(Finding::CustodyTimestampInvalid {
                entry: position,
                timestamp: timestamp.cloned().unwrap_or(Value::Null),
            });
        }

        for field in REQUIRED_ENTRY_FIELDS {
            let present = entry
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !present {
                report.push(Finding::CustodyFieldMissing {
                    entry: position,
                    field,
                });
            }
        }

        if let (Some(Value::String(prev)), Some(Value::String(ts))) = (previous, timestamp) {
            if ts <= prev {
                report.push(Finding::CustodyOrderViolation {
                    entry: position,
                    timestamp: ts.clone(),
                    previous: prev.clone(),
                });
            }
        }
        previous = timestamp;
    }

    tracing::debug!(entries = entries.len(), ok = report.is_ok(), "verified custody log");
    report
}
