//! Ledger records: the tagged Event / Challenge variants the ledger protects.
//!
//! Records carry their validated payload verbatim. Structural validation runs
//! before a record reaches the kernel; the only shape enforced here is the one
//! hashing and indexing rely on: a JSON object with a non-empty string
//! identifier under the kind's ID field.
//!
//! Payloads are not frozen. Mutation is always detectable because it changes
//! the record's [`LedgerRecord::integrity_hash`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::proof::anchor::anchor_hash;
use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::HashAlgorithm;

/// Field naming the event a challenge disputes.
pub const CHALLENGED_EVENT_ID_FIELD: &str = "Challenged_Event_ID";

/// The two record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Event,
    Challenge,
}

impl RecordKind {
    /// Both kinds, events first.
    pub const ALL: &[RecordKind] = &[Self::Event, Self::Challenge];

    /// The payload field holding the record identifier.
    #[must_use]
    pub const fn id_field(self) -> &'static str {
        match self {
            Self::Event => "Event_ID",
            Self::Challenge => "Challenge_ID",
        }
    }

    /// Lowercase label used on the CLI and in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Challenge => "challenge",
        }
    }

    /// `Bundle_Type` tag of an evidence bundle carrying this kind.
    #[must_use]
    pub const fn bundle_type(self) -> &'static str {
        match self {
            Self::Event => "PLRS_Event_Evidence_Bundle",
            Self::Challenge => "PLRS_Challenge_Evidence_Bundle",
        }
    }

    /// Bundle key holding the record itself.
    #[must_use]
    pub const fn bundle_record_key(self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::Challenge => "Challenge",
        }
    }

    /// Bundle key holding the record's hash.
    #[must_use]
    pub const fn bundle_hash_key(self) -> &'static str {
        match self {
            Self::Event => "Event_Hash",
            Self::Challenge => "Challenge_Hash",
        }
    }

    /// Resolve a `Bundle_Type` tag.
    #[must_use]
    pub fn from_bundle_type(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.bundle_type() == tag)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RecordError::UnknownKind {
                name: s.to_string(),
            })
    }
}

/// Error constructing a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The payload is not a JSON object.
    #[error("{kind} record must be a JSON object")]
    NotAnObject { kind: RecordKind },
    /// The identifier field is missing, empty, or not a string.
    #[error("{kind} record is missing a non-empty string {field}")]
    MissingId {
        kind: RecordKind,
        field: &'static str,
    },
    /// A record kind name was not recognized.
    #[error("unknown record kind: {name} (expected \"event\" or \"challenge\")")]
    UnknownKind { name: String },
}

/// The shared "encodable + identifiable" capability of ledger records.
pub trait LedgerRecord {
    /// Which ledger this record belongs to.
    const KIND: RecordKind;

    /// The full record payload (always a JSON object).
    fn payload(&self) -> &Value;

    /// The record identifier.
    fn record_id(&self) -> &str {
        string_field(self.payload(), Self::KIND.id_field()).unwrap_or_default()
    }

    /// Canonical bytes of the payload.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if the payload cannot be canonicalized.
    fn canonical_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(self.payload())
    }

    /// The record's integrity anchor under `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if the payload cannot be canonicalized.
    fn integrity_hash(&self, algorithm: HashAlgorithm) -> Result<String, CanonError> {
        anchor_hash(self.payload(), algorithm)
    }
}

fn string_field<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn checked_payload(kind: RecordKind, payload: Value) -> Result<Value, RecordError> {
    if !payload.is_object() {
        return Err(RecordError::NotAnObject { kind });
    }
    if string_field(&payload, kind.id_field()).is_none() {
        return Err(RecordError::MissingId {
            kind,
            field: kind.id_field(),
        });
    }
    Ok(payload)
}

/// An Event record.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    payload: Value,
}

impl EventRecord {
    /// Wrap a payload.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the payload is not an object with a non-empty `Event_ID`.
    pub fn new(payload: Value) -> Result<Self, RecordError> {
        Ok(Self {
            payload: checked_payload(RecordKind::Event, payload)?,
        })
    }
}

impl LedgerRecord for EventRecord {
    const KIND: RecordKind = RecordKind::Event;

    fn payload(&self) -> &Value {
        &self.payload
    }
}

/// A Challenge record disputing an Event.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeRecord {
    payload: Value,
}

impl ChallengeRecord {
    /// Wrap a payload.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the payload is not an object with a non-empty `Challenge_ID`.
    pub fn new(payload: Value) -> Result<Self, RecordError> {
        Ok(Self {
            payload: checked_payload(RecordKind::Challenge, payload)?,
        })
    }

    /// The disputed event, if named.
    #[must_use]
    pub fn challenged_event_id(&self) -> Option<&str> {
        string_field(&self.payload, CHALLENGED_EVENT_ID_FIELD)
    }
}

impl LedgerRecord for ChallengeRecord {
    const KIND: RecordKind = RecordKind::Challenge;

    fn payload(&self) -> &Value {
        &self.payload
    }
}

/// A record of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Event(EventRecord),
    Challenge(ChallengeRecord),
}

impl Record {
    /// Wrap a payload as a record of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the payload is not an object carrying the
    /// kind's identifier field.
    pub fn from_value(kind: RecordKind, payload: Value) -> Result<Self, RecordError> {
        match kind {
            RecordKind::Event => EventRecord::new(payload).map(Self::Event),
            RecordKind::Challenge => ChallengeRecord::new(payload).map(Self::Challenge),
        }
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Event(_) => RecordKind::Event,
            Self::Challenge(_) => RecordKind::Challenge,
        }
    }

    #[must_use]
    pub fn payload(&self) -> &Value {
        match self {
            Self::Event(r) => r.payload(),
            Self::Challenge(r) => r.payload(),
        }
    }

    #[must_use]
    pub fn record_id(&self) -> &str {
        match self {
            Self::Event(r) => r.record_id(),
            Self::Challenge(r) => r.record_id(),
        }
    }

    /// The disputed event for challenges; always `None` for events.
    #[must_use]
    pub fn challenged_event_id(&self) -> Option<&str> {
        match self {
            Self::Event(_) => None,
            Self::Challenge(r) => r.challenged_event_id(),
        }
    }

    /// The record's integrity anchor under `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if the payload cannot be canonicalized.
    pub fn integrity_hash(&self, algorithm: HashAlgorithm) -> Result<String, CanonError> {
        match self {
            Self::Event(r) => r.integrity_hash(algorithm),
            Self::Challenge(r) => r.integrity_hash(algorithm),
        }
    }
}
