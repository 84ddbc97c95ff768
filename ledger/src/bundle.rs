//! Evidence bundles: one record exported with its hash and, optionally, its
//! index entry.
//!
//! A bundle is self-verifying. [`verify_bundle`] recomputes the record's
//! anchor and checks it against the bundle's own hash claim and against the
//! embedded index entry, so a recipient needs nothing but the file.
//!
//! # Layout
//!
//! ```text
//! {
//!   "Bundle_Type":          "PLRS_Event_Evidence_Bundle" | "PLRS_Challenge_Evidence_Bundle",
//!   "Bundle_Version":       "1.0",
//!   "Generated_At_UTC":     "2025-01-12T18:42:10Z",
//!   "Event" | "Challenge":  { record },
//!   "Event_Hash" | "Challenge_Hash": "<hex>",
//!   "Index_Entry":          { entry } | null,
//!   "Index_File_Reference": "<path>" | null
//! }
//! ```
//!
//! Unknown keys are preserved on load and save.

use std::path::Path;

use serde_json::{Map, Value};

use plrs_kernel::proof::anchor::anchor_hash;
use plrs_kernel::proof::canon::CanonError;
use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_kernel::record::{Record, RecordKind};

use crate::finding::{AuditReport, Finding};
use crate::index::{IndexEntry, HASH_FIELD};
use crate::io::{load_json_file, write_json_pretty, InputError};
use crate::timestamp::utc_now;

pub const BUNDLE_VERSION: &str = "1.0";
pub const BUNDLE_TYPE_KEY: &str = "Bundle_Type";
pub const BUNDLE_VERSION_KEY: &str = "Bundle_Version";
pub const GENERATED_AT_KEY: &str = "Generated_At_UTC";
pub const INDEX_ENTRY_KEY: &str = "Index_Entry";
pub const INDEX_FILE_REFERENCE_KEY: &str = "Index_File_Reference";

/// Error loading, building or verifying a bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// The bundle's top level is not a JSON object.
    #[error("evidence bundle must be a JSON object")]
    NotAnObject,
    /// `Bundle_Type` is missing or names no known bundle.
    #[error(
        "unknown or missing Bundle_Type: {found}; expected \
         \"PLRS_Event_Evidence_Bundle\" or \"PLRS_Challenge_Evidence_Bundle\""
    )]
    UnknownType { found: String },
    /// The embedded record could not be canonicalized.
    #[error("failed to compute record hash: {0}")]
    Encoding(#[from] CanonError),
    /// The bundle file could not be read or written.
    #[error(transparent)]
    Input(#[from] InputError),
}

/// A parsed evidence bundle of a known kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceBundle {
    kind: RecordKind,
    raw: Map<String, Value>,
}

impl EvidenceBundle {
    /// Interpret a JSON value as a bundle, resolving its kind from `Bundle_Type`.
    ///
    /// Only the top-level shape and the type tag are checked here; record and
    /// hash defects are findings of [`verify_bundle`].
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::NotAnObject`] or [`BundleError::UnknownType`].
    pub fn from_value(value: Value) -> Result<Self, BundleError> {
        let Value::Object(raw) = value else {
            return Err(BundleError::NotAnObject);
        };
        let kind = match raw.get(BUNDLE_TYPE_KEY) {
            Some(Value::String(tag)) => RecordKind::from_bundle_type(tag),
            _ => None,
        };
        let Some(kind) = kind else {
            let found = raw
                .get(BUNDLE_TYPE_KEY)
                .map_or_else(|| "<missing>".to_string(), Value::to_string);
            return Err(BundleError::UnknownType { found });
        };
        Ok(Self { kind, raw })
    }

    /// Load a bundle file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Input`] if the file is missing or malformed,
    /// plus everything [`EvidenceBundle::from_value`] returns.
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let bundle = Self::from_value(load_json_file(path)?)?;
        tracing::debug!(kind = %bundle.kind, path = %path.display(), "loaded bundle");
        Ok(bundle)
    }

    /// Write the bundle as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Input`] on write failure.
    pub fn save(&self, path: &Path) -> Result<(), BundleError> {
        write_json_pretty(path, &self.to_value())?;
        Ok(())
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The embedded record, whatever its shape.
    #[must_use]
    pub fn record(&self) -> Option<&Value> {
        self.raw.get(self.kind.bundle_record_key())
    }

    /// The record's identifier, when the record is an object carrying one.
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.record()
            .and_then(|r| r.get(self.kind.id_field()))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The hash the bundle claims for its record, when it is a non-empty string.
    #[must_use]
    pub fn record_hash(&self) -> Option<&str> {
        self.raw
            .get(self.kind.bundle_hash_key())
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The embedded index entry, if present and not null.
    #[must_use]
    pub fn index_entry(&self) -> Option<&Value> {
        self.raw.get(INDEX_ENTRY_KEY).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn index_file_reference(&self) -> Option<&str> {
        self.raw.get(INDEX_FILE_REFERENCE_KEY).and_then(Value::as_str)
    }

    #[must_use]
    pub fn generated_at(&self) -> Option<&str> {
        self.raw.get(GENERATED_AT_KEY).and_then(Value::as_str)
    }

    /// Mutable access to the raw object, for tooling that edits bundles in place.
    pub fn raw_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.raw
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.raw.clone())
    }
}

/// Build an export bundle for `record`, stamped with the current UTC time.
///
/// # Errors
///
/// See [`build_bundle_at`].
pub fn build_bundle(
    record: &Record,
    algorithm: HashAlgorithm,
    index_entry: Option<&IndexEntry>,
    index_file_reference: Option<&str>,
) -> Result<EvidenceBundle, BundleError> {
    build_bundle_at(
        record,
        algorithm,
        index_entry,
        index_file_reference,
        &utc_now(),
    )
}

/// Build an export bundle with an explicit `Generated_At_UTC`.
///
/// # Errors
///
/// Returns [`BundleError::Encoding`] if the record cannot be canonicalized.
pub fn build_bundle_at(
    record: &Record,
    algorithm: HashAlgorithm,
    index_entry: Option<&IndexEntry>,
    index_file_reference: Option<&str>,
    generated_at: &str,
) -> Result<EvidenceBundle, BundleError> {
    let kind = record.kind();
    let hash = record.integrity_hash(algorithm)?;

    let mut raw = Map::new();
    raw.insert(
        BUNDLE_TYPE_KEY.to_string(),
        Value::from(kind.bundle_type()),
    );
    raw.insert(BUNDLE_VERSION_KEY.to_string(), Value::from(BUNDLE_VERSION));
    raw.insert(GENERATED_AT_KEY.to_string(), Value::from(generated_at));
    raw.insert(
        kind.bundle_record_key().to_string(),
        record.payload().clone(),
    );
    raw.insert(kind.bundle_hash_key().to_string(), Value::String(hash));
    raw.insert(
        INDEX_ENTRY_KEY.to_string(),
        index_entry.map_or(Value::Null, |e| e.raw().clone()),
    );
    raw.insert(
        INDEX_FILE_REFERENCE_KEY.to_string(),
        index_file_reference.map_or(Value::Null, Value::from),
    );

    tracing::debug!(%kind, record_id = record.record_id(), %algorithm, "built bundle");
    Ok(EvidenceBundle { kind, raw })
}

/// Verify a bundle's internal consistency.
///
/// 1. The record must be an object and the hash a non-empty string; any
///    defect here is reported and nothing else is checked.
/// 2. The record's anchor is recomputed and compared with the bundle hash.
/// 3. An embedded index entry's `Hash` is compared with the bundle hash.
///
/// Checks 2 and 3 are independent; both are always reported.
///
/// # Errors
///
/// Returns [`BundleError::Encoding`] if the record cannot be canonicalized.
pub fn verify_bundle(
    bundle: &EvidenceBundle,
    algorithm: HashAlgorithm,
) -> Result<AuditReport, BundleError> {
    let kind = bundle.kind;
    let mut report = AuditReport::new();

    let record = bundle.record().filter(|r| r.is_object());
    if record.is_none() {
        report.push(Finding::MalformedBundle {
            kind,
            detail: format!(
                "missing or invalid '{}' object",
                kind.bundle_record_key()
            ),
        });
    }
    let claimed = bundle.record_hash();
    if claimed.is_none() {
        report.push(Finding::MalformedBundle {
            kind,
            detail: format!("missing or invalid '{}'", kind.bundle_hash_key()),
        });
    }
    let (Some(record), Some(claimed)) = (record, claimed) else {
        return Ok(report);
    };

    let computed = anchor_hash(record, algorithm)?;
    if computed != claimed {
        report.push(Finding::HashMismatch {
            kind,
            record_id: bundle.record_id().map(str::to_string),
            claimed: claimed.to_string(),
            computed,
        });
    }

    if let Some(entry) = bundle.index_entry() {
        let index_hash = entry.get(HASH_FIELD);
        if index_hash.and_then(Value::as_str) != Some(claimed) {
            report.push(Finding::IndexHashMismatch {
                kind,
                index_hash: index_hash.filter(|v| !v.is_null()).map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }),
                bundle_hash: claimed.to_string(),
            });
        }
    }

    tracing::debug!(%kind, ok = report.is_ok(), "verified bundle");
    Ok(report)
}
