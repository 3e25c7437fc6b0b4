//! Smoke tests for the todo-probador CLI
//!
//! Everything here runs against the in-memory backend so no browser is needed.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the todo-probador binary
fn probador() -> Command {
    let mut cmd = Command::cargo_bin("todo-probador").expect("todo-probador binary should exist");
    cmd.env_remove("TODO_PROBAR_URL")
        .env_remove("CHROMIUM_PATH")
        .env_remove("RUST_LOG");
    cmd
}

/// A mock run with a short readiness timeout
fn mock_run() -> Command {
    let mut cmd = probador();
    cmd.args(["run", "--backend", "mock", "--timeout-ms", "500", "--color", "never"]);
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    probador()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    probador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_shows_help() {
    probador().assert().failure();
}

#[test]
fn test_run_subcommand_help() {
    probador()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--backend"))
        .stdout(predicate::str::contains("--fault"));
}

// ============================================================================
// Journey Runs
// ============================================================================

#[test]
fn test_clean_mock_run_exits_zero() {
    mock_run()
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The title of this page is: To-Do List Website.",
        ))
        .stdout(predicate::str::contains(
            "Testing complete. Found 0 errors in the test run.",
        ))
        .stdout(predicate::str::contains("ERROR-").not());
}

#[test]
fn test_defects_exit_one() {
    mock_run()
        .args(["--fault", "wrong-title"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR- Wrong Website."))
        .stdout(predicate::str::contains("Found 1 error in the test run."));
}

#[test]
fn test_unreachable_app_exits_two() {
    mock_run()
        .args(["--fault", "unreachable"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_crash_mid_journey_prints_defects_and_exits_two() {
    mock_run()
        .args(["--fault", "wrong-title", "--fault", "crash-on-delete"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("ERROR- Wrong Website."))
        .stdout(predicate::str::contains("Found 1 error in the test run."))
        .stderr(predicate::str::contains("Journey failed: delete first task"));
}

#[test]
fn test_json_report() {
    let output = mock_run()
        .args(["--fault", "delete-noop", "--format", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let json = String::from_utf8(output).unwrap();
    assert!(json.contains("\"total_defects\": 2"));
    assert!(json.contains("delete first task"));
}

#[test]
fn test_junit_report_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xml");
    mock_run()
        .args(["--fault", "delete-noop", "--format", "junit", "-o"])
        .arg(&path)
        .assert()
        .code(1);
    let xml = fs::read_to_string(&path).unwrap();
    assert!(xml.contains("tests=\"15\""));
    assert!(xml.contains("failures=\"1\""));
}

#[test]
fn test_fault_requires_mock_backend() {
    probador()
        .args(["run", "--fault", "wrong-title"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--backend mock"));
}

#[test]
fn test_unknown_fault_is_rejected() {
    probador()
        .args(["run", "--backend", "mock", "--fault", "gremlins"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gremlins"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_prints_defaults() {
    probador()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "url: https://ngo500.github.io/todo_website/",
        ))
        .stdout(predicate::str::contains("headless: true"));
}

#[test]
fn test_config_file_and_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todo.yaml");
    fs::write(&path, "url: http://from-file/\nwait:\n  timeout_ms: 900\n").unwrap();
    probador()
        .args(["config", "--headed", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("url: http://from-file/"))
        .stdout(predicate::str::contains("timeout_ms: 900"))
        .stdout(predicate::str::contains("headless: false"));
}

#[test]
fn test_url_from_environment() {
    probador()
        .arg("config")
        .env("TODO_PROBAR_URL", "http://env-host/")
        .assert()
        .success()
        .stdout(predicate::str::contains("url: http://env-host/"));
}

#[test]
fn test_invalid_config_file_exits_two() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "url: \"\"\n").unwrap();
    probador()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("url must not be empty"));
}
