//! CLI integration tests for vbase64
//!
//! Tests the binary as a user would interact with it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Run from an empty directory with an empty config home so no settings
/// file on the host leaks in.
fn vbase64(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vbase64").unwrap();
    cmd.current_dir(home)
        .env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("VBASE64_KERNEL")
        .env_remove("RUST_LOG");
    cmd
}

fn sandbox() -> TempDir {
    tempfile::tempdir().unwrap()
}

// ============================================================================
// Basic Commands
// ============================================================================

#[test]
fn test_help() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SIMD-accelerated base64"));
}

#[test]
fn test_version() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vbase64"));
}

#[test]
fn test_missing_subcommand_fails() {
    let dir = sandbox();
    vbase64(dir.path()).assert().failure();
}

// ============================================================================
// Encode
// ============================================================================

#[test]
fn test_encode_stdin() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("encode")
        .write_stdin("Man")
        .assert()
        .success()
        .stdout("TWFu\n");
}

#[test]
fn test_encode_no_newline() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["encode", "--no-newline"])
        .write_stdin("Ma")
        .assert()
        .success()
        .stdout("TWE=");
}

#[test]
fn test_encode_wrap() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["encode", "--wrap", "4"])
        .write_stdin("ManMan")
        .assert()
        .success()
        .stdout("TWFu\nTWFu\n");
}

#[test]
fn test_encode_empty_input() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("encode")
        .write_stdin("")
        .assert()
        .success()
        .stdout("\n");
}

#[test]
fn test_encode_missing_file() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["encode", "does-not-exist.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ============================================================================
// Decode
// ============================================================================

#[test]
fn test_decode_stdin() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("decode")
        .write_stdin("TWFu\n")
        .assert()
        .success()
        .stdout("Man");
}

#[test]
fn test_decode_strict_accepts_trailing_newline() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["decode", "--strict"])
        .write_stdin("SGVsbG8sIFdvcmxkIQ==\n")
        .assert()
        .success()
        .stdout("Hello, World!");
}

#[test]
fn test_decode_strict_rejects_junk() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["decode", "--strict"])
        .write_stdin("TW*u")
        .assert()
        .failure()
        .stderr(predicate::str::contains("only base64 data is allowed"));
}

#[test]
fn test_decode_lenient_skips_junk() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("decode")
        .write_stdin("TW*Fu\nTWFu")
        .assert()
        .success()
        .stdout("ManMan");
}

#[test]
fn test_decode_lenient_skipped_junk_still_counts_quads() {
    // Dropping '*' leaves seven data characters
    let dir = sandbox();
    vbase64(dir.path())
        .arg("decode")
        .write_stdin("TW*u\nTWFu")
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect padding"));
}

#[test]
fn test_decode_invalid_length() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("decode")
        .write_stdin("TWFuT")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be 1 more than a multiple of 4"));
}

#[test]
fn test_decode_incorrect_padding() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("decode")
        .write_stdin("TWE")
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect padding"));
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_file_round_trip() {
    let dir = sandbox();
    let data: Vec<u8> = (0..100_000u32).map(|i| (i * 31 % 251) as u8).collect();
    std::fs::write(dir.path().join("input.bin"), &data).unwrap();

    vbase64(dir.path())
        .args(["encode", "input.bin", "-o", "encoded.txt", "--wrap", "76"])
        .assert()
        .success();
    vbase64(dir.path())
        .args(["decode", "encoded.txt", "-o", "decoded.bin"])
        .assert()
        .success();

    assert_eq!(std::fs::read(dir.path().join("decoded.bin")).unwrap(), data);
}

#[test]
fn test_round_trip_with_every_kernel_name() {
    let dir = sandbox();
    for kernel in ["auto", "scalar"] {
        let encoded = vbase64(dir.path())
            .args(["--kernel", kernel, "encode"])
            .write_stdin(vec![0xABu8; 1000])
            .output()
            .unwrap()
            .stdout;
        vbase64(dir.path())
            .args(["--kernel", kernel, "decode", "--strict"])
            .write_stdin(encoded)
            .assert()
            .success()
            .stdout(vec![0xABu8; 1000]);
    }
}

// ============================================================================
// Kernel selection & settings
// ============================================================================

#[test]
fn test_unknown_kernel() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["--kernel", "avx2", "encode"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown kernel 'avx2'"));
}

#[test]
fn test_kernel_env_override() {
    let dir = sandbox();
    vbase64(dir.path())
        .env("VBASE64_KERNEL", "scalar")
        .arg("detect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected:    Scalar"));
}

#[test]
fn test_explicit_config_file() {
    let dir = sandbox();
    std::fs::write(
        dir.path().join("custom.toml"),
        "[codec]\nnewline = false\nwrap = 4\n",
    )
    .unwrap();
    vbase64(dir.path())
        .args(["--config", "custom.toml", "encode"])
        .write_stdin("ManMa")
        .assert()
        .success()
        .stdout("TWFu\nTWE=");
}

#[test]
fn test_local_config_file() {
    let dir = sandbox();
    std::fs::write(dir.path().join("vbase64.toml"), "[codec]\nstrict = true\n").unwrap();
    vbase64(dir.path())
        .arg("decode")
        .write_stdin("TW Fu")
        .assert()
        .failure()
        .stderr(predicate::str::contains("only base64 data is allowed"));
}

#[test]
fn test_broken_local_config_is_ignored() {
    let dir = sandbox();
    std::fs::write(dir.path().join("vbase64.toml"), "[codec\n").unwrap();
    vbase64(dir.path())
        .arg("encode")
        .write_stdin("Man")
        .assert()
        .success()
        .stdout("TWFu\n");
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["--config", "nope.toml", "encode"])
        .write_stdin("Man")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// ============================================================================
// Detect & bench
// ============================================================================

#[test]
fn test_detect() {
    let dir = sandbox();
    vbase64(dir.path())
        .arg("detect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform:"))
        .stdout(predicate::str::contains("Available:"))
        .stdout(predicate::str::contains("scalar"));
}

#[test]
fn test_detect_json() {
    let dir = sandbox();
    vbase64(dir.path())
        .args(["detect", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"arch\""))
        .stdout(predicate::str::contains("\"available\""))
        .stdout(predicate::str::contains(std::env::consts::ARCH));
}

#[test]
fn test_bench_small() {
    let dir = sandbox();
    std::fs::write(dir.path().join("vbase64.toml"), "[bench]\ntarget_ms = 1\n").unwrap();
    vbase64(dir.path())
        .args(["bench", "--sizes", "64,256", "--iterations", "1", "--warmup", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("encode(newline)"))
        .stdout(predicate::str::contains("decode(strict)"))
        .stdout(predicate::str::contains("Scalar"));
}
