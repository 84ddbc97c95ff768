//! Cross-process determinism of canonical encoding and hashing.
//!
//! Spawns the `anchor_fixture` binary under several environment variants
//! and asserts that all produce identical output. Canonical bytes and
//! digests must not depend on cwd, locale, timezone or unrelated env vars.

use std::path::Path;
use std::process::Command;

use lock_tests::fixtures::GOLDEN_RECORDS;

/// Resolve the path to the compiled `anchor_fixture` binary.
///
/// `cargo test` puts test binaries in `target/debug/deps/`; the crate's
/// own binaries live one level up.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("anchor_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the binary with the given cwd and environment overrides.
/// Returns stdout as a string.
fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();

    let mut command = Command::new(&bin);
    command.current_dir(work_dir);

    // Clear locale-related env to establish baseline, then apply overrides.
    command
        .env_remove("LC_ALL")
        .env_remove("LC_NUMERIC")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");

    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });

    assert!(
        output.status.success(),
        "anchor_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    let alt_cwd = if cfg!(target_os = "windows") {
        "C:\\"
    } else {
        "/tmp"
    };
    assert_eq!(
        baseline,
        run_variant(alt_cwd, &[]),
        "output differs when cwd changes from {root} to {alt_cwd}"
    );

    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "de_DE.UTF-8"), ("LANG", "de_DE.UTF-8")]),
        "output differs under a comma-decimal locale"
    );

    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );

    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[
                ("PLRS_HASH_ALGO", "sha512"),
                ("TZ", "America/New_York"),
                ("HOME", "/nonexistent"),
            ],
        ),
        "output differs with spurious env vars (PLRS_HASH_ALGO, TZ, HOME)"
    );
}

#[test]
fn crossproc_output_matches_golden_values() {
    let output = run_variant(&workspace_root(), &[]);
    let lines: Vec<&str> = output.lines().collect();

    for golden in &GOLDEN_RECORDS {
        let canonical = format!(
            "{}.canonical_hex={}",
            golden.name,
            hex::encode(golden.canonical.as_bytes())
        );
        assert!(lines.contains(&canonical.as_str()), "missing {canonical}");
        for (alg, digest) in [
            ("sha256", golden.sha256),
            ("sha512", golden.sha512),
            ("sha512_256", golden.sha512_256),
        ] {
            let line = format!("{}.{alg}={digest}", golden.name);
            assert!(lines.contains(&line.as_str()), "missing {line}");
        }
    }
    // canonical_hex plus six algorithms per record.
    assert_eq!(lines.len(), GOLDEN_RECORDS.len() * 7);
}
