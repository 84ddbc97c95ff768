//! Golden-vector lock: canonical bytes and digests of fixed records.
//!
//! Proves:
//! 1. Canonical bytes match the reference encoder exactly
//! 2. Digests match the published values for every locked algorithm
//! 3. The anchor equals an independent sha2 digest of the canonical bytes
//! 4. Typed records, the tagged enum and the raw anchor agree

use lock_tests::fixtures::{GOLDEN_EVENT, GOLDEN_RECORDS};
use plrs_kernel::proof::anchor::anchor_hash;
use plrs_kernel::proof::canon::canonical_json_bytes;
use plrs_kernel::proof::hash::HashAlgorithm;
use sha2::Digest;

#[test]
fn canonical_bytes_locked() {
    for golden in &GOLDEN_RECORDS {
        let bytes = canonical_json_bytes(&golden.value()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            golden.canonical,
            "{}: canonical form drifted",
            golden.name
        );
    }
}

#[test]
fn digests_locked() {
    for golden in &GOLDEN_RECORDS {
        let value = golden.value();
        for (algorithm, expected) in [
            (HashAlgorithm::Sha256, golden.sha256),
            (HashAlgorithm::Sha512, golden.sha512),
            (HashAlgorithm::Sha512t256, golden.sha512_256),
        ] {
            assert_eq!(
                anchor_hash(&value, algorithm).unwrap(),
                expected,
                "{}: {algorithm} digest drifted",
                golden.name
            );
        }
    }
}

#[test]
fn anchor_is_plain_sha256_of_canonical_bytes() {
    for golden in &GOLDEN_RECORDS {
        let independent = hex::encode(sha2::Sha256::digest(golden.canonical.as_bytes()));
        assert_eq!(independent, golden.sha256, "{}", golden.name);
    }
}

#[test]
fn record_hash_paths_agree() {
    for golden in &GOLDEN_RECORDS {
        let record = golden.record();
        assert_eq!(
            record.integrity_hash(HashAlgorithm::Sha256).unwrap(),
            golden.sha256,
            "{}",
            golden.name
        );
    }
}

#[test]
fn insignificant_formatting_does_not_change_anchor() {
    let reformatted: serde_json::Value = serde_json::from_str(
        "{\n    \"Event_ID\"   :   \"E-1\",\n\n    \"Narrative_Statement\": \"X\"\n}\n",
    )
    .unwrap();
    assert_eq!(
        anchor_hash(&reformatted, HashAlgorithm::Sha256).unwrap(),
        GOLDEN_EVENT.sha256
    );
}

#[test]
fn any_field_change_changes_anchor() {
    let mut value = GOLDEN_EVENT.value();
    value["Narrative_Statement"] = serde_json::json!("X ");
    assert_ne!(
        anchor_hash(&value, HashAlgorithm::Sha256).unwrap(),
        GOLDEN_EVENT.sha256
    );
}
