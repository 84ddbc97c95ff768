//! Shared fixture builders for PLRS benchmark suites.

use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_kernel::record::{Record, RecordKind};
use plrs_ledger::index::IndexLedger;
use plrs_ledger::store::MemoryRecordStore;
use serde_json::{json, Map, Value};

/// Fixed timestamp for every synthetic index entry.
pub const BENCH_TIMESTAMP: &str = "2025-01-12T18:42:10Z";

/// An event payload with `fields` extra narrative fields of mixed types.
///
/// Keys are inserted in reverse order so canonical encoding has to sort them.
#[must_use]
pub fn synthetic_event(id: usize, fields: usize) -> Value {
    let mut payload = Map::new();
    for i in (0..fields).rev() {
        let value = match i % 4 {
            0 => json!(format!("Statement {i} for event {id}: «quoted» text\n")),
            1 => json!(i),
            2 => json!(f64::from(u32::try_from(i).unwrap_or(0)) * 0.25),
            _ => json!({"Witness": format!("W-{i}"), "Confirmed": i % 2 == 0}),
        };
        payload.insert(format!("Field_{i:04}"), value);
    }
    payload.insert("Event_ID".to_string(), json!(format!("E-{id:06}")));
    Value::Object(payload)
}

/// A challenge disputing `E-<event_id>`.
#[must_use]
pub fn synthetic_challenge(id: usize, event_id: usize) -> Value {
    json!({
        "Statement": format!("Challenge {id} disputes the account"),
        "Challenged_Event_ID": format!("E-{event_id:06}"),
        "Challenge_ID": format!("C-{id:06}"),
    })
}

/// Event and challenge ledgers with their in-memory stores.
pub struct LedgerSetup {
    pub events: IndexLedger,
    pub challenges: IndexLedger,
    pub event_store: MemoryRecordStore,
    pub challenge_store: MemoryRecordStore,
}

/// Build a consistent ledger of `events` events and one challenge per ten events.
///
/// # Panics
///
/// Panics if a synthetic record fails to index. Benchmark setup failures are fatal.
#[must_use]
pub fn build_ledger(events: usize, fields: usize) -> LedgerSetup {
    let mut setup = LedgerSetup {
        events: IndexLedger::new(RecordKind::Event),
        challenges: IndexLedger::new(RecordKind::Challenge),
        event_store: MemoryRecordStore::new(),
        challenge_store: MemoryRecordStore::new(),
    };
    for id in 0..events {
        let payload = synthetic_event(id, fields);
        let record = Record::from_value(RecordKind::Event, payload.clone()).unwrap();
        setup
            .events
            .append_at(&record, HashAlgorithm::Sha256, BENCH_TIMESTAMP)
            .unwrap();
        setup.event_store.insert(record.record_id(), payload);
    }
    for id in 0..events / 10 {
        let payload = synthetic_challenge(id, id * 10);
        let record = Record::from_value(RecordKind::Challenge, payload.clone()).unwrap();
        setup
            .challenges
            .append_at(&record, HashAlgorithm::Sha256, BENCH_TIMESTAMP)
            .unwrap();
        setup.challenge_store.insert(record.record_id(), payload);
    }
    setup
}
