//! Hash authority lock: exactly one place defines integrity hashing.
//!
//! Scans ledger/ and cli/ production source for direct digest or canonical
//! encoder use. Everything outside the kernel must go through
//! `plrs_kernel::proof::anchor::anchor_hash` (or a record's `integrity_hash`),
//! so a second, subtly different hash path cannot appear.

use std::path::{Path, PathBuf};

const FORBIDDEN: [&str; 4] = ["sha2::", "digest_hex(", "canonical_json_bytes(", "serde_json::to_vec("];

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_files(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

/// Production part of a source file: everything before `#[cfg(test)]`.
fn production_source(path: &Path) -> String {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match content.find("#[cfg(test)]") {
        Some(cut) => content[..cut].to_string(),
        None => content,
    }
}

#[test]
fn no_hashing_outside_kernel() {
    let dirs = [
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../ledger/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../cli/src"),
    ];
    let mut files = Vec::new();
    for dir in dirs {
        rust_files(Path::new(dir), &mut files);
    }
    assert!(!files.is_empty(), "no production sources found");

    let mut violations = Vec::new();
    for file in &files {
        let source = production_source(file);
        for (n, line) in source.lines().enumerate() {
            if line.trim_start().starts_with("//") {
                continue;
            }
            for pattern in FORBIDDEN {
                if line.contains(pattern) {
                    violations.push(format!("{}:{}: {pattern}", file.display(), n + 1));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "hashing outside plrs-kernel:\n{}",
        violations.join("\n")
    );
}
