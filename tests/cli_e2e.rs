//! End-to-end CLI tests for the gutenmill binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command rooted in the temp dir, with config resolution pinned inside it
/// so a developer's real config can never leak into a test.
fn gutenmill(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gutenmill").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .arg("--quiet")
        .arg("--root")
        .arg(dir.path());
    cmd
}

/// Test that --help displays usage information and the subcommands.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("gutenmill").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetch, unpack, and normalize"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("normalize"))
        .stdout(predicate::str::contains("status"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("gutenmill").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gutenmill"));
}

/// Test that invoking without a subcommand fails with usage help.
#[test]
fn test_binary_without_subcommand_fails() {
    let mut cmd = Command::cargo_bin("gutenmill").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("gutenmill").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that status reports an untouched root without failing.
#[test]
fn test_status_on_empty_root_reports_nothing_built() {
    let dir = TempDir::new().expect("failed to create temp dir");
    gutenmill(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not built"))
        .stdout(predicate::str::contains("zipped archives:  0"))
        .stdout(predicate::str::contains("unzipped texts:   0"))
        .stdout(predicate::str::contains("normalized books: 0"));
}

/// Test that unpack is a clean no-op when nothing was fetched.
#[test]
fn test_unpack_on_empty_root_succeeds() {
    let dir = TempDir::new().expect("failed to create temp dir");
    gutenmill(&dir).arg("unpack").assert().success();
}

/// Test that normalize refuses to run before a manifest exists.
#[test]
fn test_normalize_without_manifest_fails_with_hint() {
    let dir = TempDir::new().expect("failed to create temp dir");
    gutenmill(&dir)
        .arg("normalize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No manifest"))
        .stderr(predicate::str::contains("run the fetch command first"));
}
