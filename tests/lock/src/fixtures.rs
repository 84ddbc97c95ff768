//! Fixed records with published digests, and an on-disk ledger builder.
//!
//! The digests below were produced by the reference encoder (sorted keys,
//! compact separators, non-ASCII unescaped) and must never change. A change
//! here means every previously published PLRS hash stops verifying.

use std::path::Path;

use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_kernel::record::{Record, RecordKind};
use plrs_ledger::audit::LedgerPaths;
use plrs_ledger::index::IndexLedger;
use serde_json::Value;

/// A record with its locked canonical form and digests.
pub struct GoldenRecord {
    pub name: &'static str,
    pub kind: RecordKind,
    /// Source JSON, deliberately not in canonical key order.
    pub source: &'static str,
    pub canonical: &'static str,
    pub sha256: &'static str,
    pub sha512: &'static str,
    pub sha512_256: &'static str,
}

impl GoldenRecord {
    /// Parse the source JSON.
    ///
    /// # Panics
    ///
    /// Panics if the fixture source is not valid JSON (a fixture bug).
    #[must_use]
    pub fn value(&self) -> Value {
        serde_json::from_str(self.source).unwrap()
    }

    /// The fixture as a typed record.
    ///
    /// # Panics
    ///
    /// Panics if the fixture is not a valid record of its kind.
    #[must_use]
    pub fn record(&self) -> Record {
        Record::from_value(self.kind, self.value()).unwrap()
    }
}

pub const GOLDEN_EVENT: GoldenRecord = GoldenRecord {
    name: "event_minimal",
    kind: RecordKind::Event,
    source: r#"{"Narrative_Statement": "X", "Event_ID": "E-1"}"#,
    canonical: r#"{"Event_ID":"E-1","Narrative_Statement":"X"}"#,
    sha256: "1bb1e48d246ea3a136593f50741cae2f9757c8db69cdf24fd44b401c4569eb59",
    sha512: "cc9e0c2a23926ef7cd16d836e31c4b1c537e364e53a0753de8b2aa91f09fc0ee15b5d4d9ab306c37ccf60182d9f79f646eda863a2e103083ddae3f94f81da71e",
    sha512_256: "7a4ef78f0390584c8eef3e40a55b447fc629b284ccdd64a05a86271b9ffa917d",
};

pub const GOLDEN_CHALLENGE: GoldenRecord = GoldenRecord {
    name: "challenge_minimal",
    kind: RecordKind::Challenge,
    source: r#"{"Statement": "disputed", "Challenged_Event_ID": "E-1", "Challenge_ID": "C-1"}"#,
    canonical: r#"{"Challenge_ID":"C-1","Challenged_Event_ID":"E-1","Statement":"disputed"}"#,
    sha256: "7730cb5db16467f370308b75418b25e958d7c8f5f2b340467868d1342f775a45",
    sha512: "74d869c623a96991f155876892e78ebb1395741c9e6200ba5c0515819720955ec6cbf4ccd24fe6360fdc62ae21460b39debde8f538dd1c4501deb3ac6d77c824",
    sha512_256: "81f3ceb27333be04c91bbb1040432d0e55c1662f679f2e4b9586d3c72e20f2c3",
};

pub const GOLDEN_EVENT_RICH: GoldenRecord = GoldenRecord {
    name: "event_rich",
    kind: RecordKind::Event,
    source: r#"{
        "Witnesses": {"b": 2, "a": 1},
        "Narrative_Statement": "Père Noël «quoted» \"x\"\n\ttab",
        "Flags": [true, false, null],
        "Event_ID": "E-2025-0002",
        "Amounts": [100.0, 1.5, 3e-05, 1e16, -0.0]
    }"#,
    canonical: "{\"Amounts\":[100.0,1.5,3e-05,1e+16,-0.0],\"Event_ID\":\"E-2025-0002\",\
                \"Flags\":[true,false,null],\
                \"Narrative_Statement\":\"Père Noël «quoted» \\\"x\\\"\\n\\ttab\",\
                \"Witnesses\":{\"a\":1,\"b\":2}}",
    sha256: "3e81a4f93024dfda8136aa5f4d7f523e6e54a148041d6a4de40f374395e1c790",
    sha512: "70fd12c7fe6d8db048913a27de4d204b8d7ef83c257d31f9b1aa473f481b4c2c7a2687aaa63125708ca6d598249f44ffd8b75afb743adc1644e355d11670ccc8",
    sha512_256: "901997572996d383a1ea179564d6b7fb88caf3e573be8f7bd6c3d0c12ec1e61a",
};

pub const GOLDEN_RECORDS: [GoldenRecord; 3] = [GOLDEN_EVENT, GOLDEN_CHALLENGE, GOLDEN_EVENT_RICH];

/// Timestamp used for every fixture index entry.
pub const FIXTURE_TIMESTAMP: &str = "2025-01-12T18:42:10Z";

/// Write `<dir>/events`, `<dir>/challenges` and both index files for the
/// golden records, and return their paths.
///
/// # Panics
///
/// Panics on any I/O failure (test-only helper).
#[must_use]
pub fn write_golden_ledger(dir: &Path) -> LedgerPaths {
    let paths = LedgerPaths {
        event_index: dir.join("public_index.json"),
        challenge_index: dir.join("public_challenge_index.json"),
        events_dir: dir.join("events"),
        challenges_dir: dir.join("challenges"),
    };
    std::fs::create_dir_all(&paths.events_dir).unwrap();
    std::fs::create_dir_all(&paths.challenges_dir).unwrap();

    let mut events = IndexLedger::new(RecordKind::Event);
    let mut challenges = IndexLedger::new(RecordKind::Challenge);
    for golden in &GOLDEN_RECORDS {
        let record = golden.record();
        let (ledger, records_dir) = match golden.kind {
            RecordKind::Event => (&mut events, &paths.events_dir),
            RecordKind::Challenge => (&mut challenges, &paths.challenges_dir),
        };
        ledger
            .append_at(&record, HashAlgorithm::Sha256, FIXTURE_TIMESTAMP)
            .unwrap();
        std::fs::write(
            records_dir.join(format!("{}.json", record.record_id())),
            golden.source,
        )
        .unwrap();
    }
    events.save(&paths.event_index).unwrap();
    challenges.save(&paths.challenge_index).unwrap();
    paths
}

/// Rewrite the record file `<dir>/<id>.json` through `modify`.
///
/// # Panics
///
/// Panics if the record file is missing or not JSON.
pub fn edit_record(dir: &Path, record_id: &str, modify: impl FnOnce(&mut Value)) {
    let path = dir.join(format!("{record_id}.json"));
    let mut value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    modify(&mut value);
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}
