//! Smoke tests for the storeprobe CLI
//!
//! Every run here uses the mock backend, so no browser is needed.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the storeprobe binary
fn storeprobe() -> Command {
    let mut cmd = Command::cargo_bin("storeprobe").expect("storeprobe binary should exist");
    cmd.env_remove("STOREPROBE_CONFIG")
        .env_remove("STOREPROBE_BASE_URL")
        .env_remove("STOREPROBE_BROWSER")
        .env_remove("STOREPROBE_HEADLESS")
        .env_remove("RUST_LOG");
    cmd
}

/// Settings file with short waits
fn fast_config(dir: &TempDir) -> String {
    let path = dir.path().join("config.yaml");
    let yaml = format!(
        "settings:\n  base_url: https://www.saucedemo.com/\n  browser: chrome\n  explicit_wait: 2\n  poll_interval_ms: 10\npaths:\n  screenshot_path: {}\n",
        dir.path().join("shots").display()
    );
    fs::write(&path, yaml).unwrap();
    path.display().to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    storeprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_flag() {
    storeprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_subcommand_fails() {
    storeprobe().assert().failure();
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_shows_scenarios() {
    storeprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("test_valid_login"))
        .stdout(predicate::str::contains("test_full_e2e_flow"));
}

#[test]
fn test_list_by_tag() {
    storeprobe()
        .args(["list", "--tag", "smoke"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test_valid_login"))
        .stdout(predicate::str::contains("test_invalid_username").not());
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_shows_file_values() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    storeprobe()
        .args(["config", "--config", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url"))
        .stdout(predicate::str::contains("poll_interval_ms: 10"));
}

#[test]
fn test_config_flag_overrides_file() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    storeprobe()
        .args(["config", "--format", "json", "--config", &config])
        .args(["--base-url", "http://localhost:3000/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:3000/"));
}

#[test]
fn test_config_missing_file_fails() {
    storeprobe()
        .args(["config", "--config", "/nonexistent/storeprobe.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_login_scenarios() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    storeprobe()
        .args(["run", "--tag", "login", "--no-screenshots", "--color", "never"])
        .args(["--config", &config])
        .assert()
        .success()
        .stderr(predicate::str::contains("PASSED 8 scenarios"));
}

#[test]
fn test_run_logs_start_and_finish() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    storeprobe()
        .env("RUST_LOG", "storeprobe_cli=info")
        .args(["run", "--tag", "smoke", "--no-screenshots", "--color", "never"])
        .args(["--config", &config])
        .assert()
        .success()
        .stderr(predicate::str::contains("starting run"))
        .stderr(predicate::str::contains("run finished"));
}

#[test]
fn test_run_json_report() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    let output = storeprobe()
        .args(["run", "--tag", "checkout", "--json", "--no-screenshots"])
        .args(["--config", &config])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["suite_name"], "swag-labs");
    assert_eq!(report["results"].as_array().unwrap().len(), 10);
    assert!(report["results"][0]["duration_ms"].is_u64());
}

#[test]
fn test_run_unsupported_browser_fails() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    storeprobe()
        .args(["run", "--filter", "test_valid_login", "--no-screenshots"])
        .args(["--config", &config, "--browser", "firefox", "--color", "never"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn test_run_rejects_bad_wait() {
    storeprobe()
        .args(["run", "--explicit-wait", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--explicit-wait"));
}

#[cfg(not(feature = "browser"))]
#[test]
fn test_chromium_backend_needs_feature() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    storeprobe()
        .args(["run", "--backend", "chromium", "--config", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("browser"));
}
