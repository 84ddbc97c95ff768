//! Evidence bundle lock tests: export, persist, reload, verify.
//!
//! Proves:
//! 1. A bundle exported from an indexed record verifies after a disk round trip
//! 2. Mutating any record field yields `HashMismatch`
//! 3. Bundle-hash and index-entry checks are independent
//! 4. The hash claimed by an exported bundle is the golden anchor

use lock_tests::fixtures::{write_golden_ledger, GOLDEN_CHALLENGE, GOLDEN_EVENT_RICH, GOLDEN_RECORDS};
use plrs_kernel::proof::hash::HashAlgorithm;
use plrs_ledger::bundle::{build_bundle, verify_bundle, EvidenceBundle};
use plrs_ledger::finding::Finding;
use plrs_ledger::index::IndexLedger;
use serde_json::{json, Value};

fn exported(dir: &std::path::Path, golden: &lock_tests::fixtures::GoldenRecord) -> std::path::PathBuf {
    let paths = write_golden_ledger(dir);
    let index_path = match golden.kind {
        plrs_kernel::record::RecordKind::Event => paths.event_index,
        plrs_kernel::record::RecordKind::Challenge => paths.challenge_index,
    };
    let ledger = IndexLedger::load(golden.kind, &index_path).unwrap();
    let record = golden.record();
    let entry = ledger.find(record.record_id()).unwrap();
    let bundle = build_bundle(
        &record,
        HashAlgorithm::Sha256,
        Some(entry),
        Some(&index_path.display().to_string()),
    )
    .unwrap();
    let out = dir.join(format!("{}.bundle.json", golden.name));
    bundle.save(&out).unwrap();
    out
}

#[test]
fn exported_bundles_verify_after_round_trip() {
    for golden in &GOLDEN_RECORDS {
        let dir = tempfile::tempdir().unwrap();
        let path = exported(dir.path(), golden);
        let bundle = EvidenceBundle::load(&path).unwrap();
        assert_eq!(bundle.kind(), golden.kind);
        assert_eq!(bundle.record_hash(), Some(golden.sha256));
        let report = verify_bundle(&bundle, HashAlgorithm::Sha256).unwrap();
        assert!(report.is_ok(), "{}: {:?}", golden.name, report.findings());
    }
}

#[test]
fn every_field_mutation_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let path = exported(dir.path(), &GOLDEN_EVENT_RICH);
    let pristine = EvidenceBundle::load(&path).unwrap().to_value();
    let fields: Vec<String> = pristine["Event"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();

    for field in fields {
        let mut value = pristine.clone();
        value["Event"][&field] = json!("mutated");
        let bundle = EvidenceBundle::from_value(value).unwrap();
        let report = verify_bundle(&bundle, HashAlgorithm::Sha256).unwrap();
        assert!(
            matches!(report.findings(), [Finding::HashMismatch { .. }]),
            "mutation of {field} not detected exactly once: {:?}",
            report.findings()
        );
    }
}

#[test]
fn index_and_bundle_hash_checks_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = exported(dir.path(), &GOLDEN_CHALLENGE);
    let mut value: Value = EvidenceBundle::load(&path).unwrap().to_value();
    value["Challenge"]["Statement"] = json!("rewritten");
    value["Index_Entry"]["Hash"] = json!("0000");
    let report = verify_bundle(&EvidenceBundle::from_value(value).unwrap(), HashAlgorithm::Sha256).unwrap();
    let findings = report.findings();
    assert_eq!(findings.len(), 2, "{findings:?}");
    assert!(matches!(findings[0], Finding::HashMismatch { .. }));
    assert!(matches!(findings[1], Finding::IndexHashMismatch { .. }));
}

#[test]
fn bundle_verified_under_other_algorithm_mismatches() {
    let dir = tempfile::tempdir().unwrap();
    let path = exported(dir.path(), &GOLDEN_CHALLENGE);
    let bundle = EvidenceBundle::load(&path).unwrap();
    let report = verify_bundle(&bundle, HashAlgorithm::Sha512).unwrap();
    assert!(matches!(report.findings(), [Finding::HashMismatch { computed, .. }] if computed == GOLDEN_CHALLENGE.sha512));
}
