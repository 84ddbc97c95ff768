//! Record stores: lookup of a record's payload by ID.
//!
//! The store is an external collaborator of the audits. Absence is terminal
//! for the entry being checked and never retried; the audit reports it as a
//! `MissingRecord` finding and moves on.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   E-2025-0001.json   one record per file, named <ID>.json
//!   E-2025-0002.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::io::{load_json_file, InputError};

/// Error loading a record from a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this ID exists.
    #[error("record {record_id} not found at {location}")]
    NotFound { record_id: String, location: String },
    /// The record exists but is unreadable or not valid JSON.
    #[error("record {record_id} is unreadable: {detail}")]
    Malformed { record_id: String, detail: String },
    /// The ID cannot name a file inside the store.
    #[error("record ID {record_id:?} is not a valid file name")]
    InvalidId { record_id: String },
}

/// Lookup of record payloads by ID.
pub trait RecordStore {
    /// Load the payload of `record_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record is absent, unreadable, or the ID is invalid.
    fn load(&self, record_id: &str) -> Result<Value, StoreError>;
}

/// A directory of `<ID>.json` files.
#[derive(Debug, Clone)]
pub struct DirRecordStore {
    root: PathBuf,
}

impl DirRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `record_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidId`] for IDs that are empty, contain path
    /// separators or NUL, or are `.`/`..`, so no lookup escapes the root.
    pub fn path_for(&self, record_id: &str) -> Result<PathBuf, StoreError> {
        let invalid = record_id.is_empty()
            || record_id == "."
            || record_id == ".."
            || record_id.contains(['/', '\\', '\0']);
        if invalid {
            return Err(StoreError::InvalidId {
                record_id: record_id.to_string(),
            });
        }
        Ok(self.root.join(format!("{record_id}.json")))
    }
}

impl RecordStore for DirRecordStore {
    fn load(&self, record_id: &str) -> Result<Value, StoreError> {
        let path = self.path_for(record_id)?;
        tracing::trace!(record_id, path = %path.display(), "loading record");
        load_json_file(&path).map_err(|e| match e {
            InputError::NotFound { path } => StoreError::NotFound {
                record_id: record_id.to_string(),
                location: path.display().to_string(),
            },
            other => StoreError::Malformed {
                record_id: record_id.to_string(),
                detail: other.to_string(),
            },
        })
    }
}

/// An in-memory store, keyed by record ID.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<String, Value>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, record_id: impl Into<String>, payload: Value) {
        self.records.insert(record_id.into(), payload);
    }

    /// Mutable access for tamper simulations.
    pub fn get_mut(&mut self, record_id: &str) -> Option<&mut Value> {
        self.records.get_mut(record_id)
    }

    /// Remove a record.
    pub fn remove(&mut self, record_id: &str) -> Option<Value> {
        self.records.remove(record_id)
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, record_id: &str) -> Result<Value, StoreError> {
        self.records
            .get(record_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                record_id: record_id.to_string(),
                location: "memory".to_string(),
            })
    }
}
