//! Integration tests for the `netop` binary.
//!
//! Everything runs against the demo dataset or fails before any network
//! call, so no API or identity provider is needed.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// A `netop` command whose config and state live in `home`, with every
/// `NETOP_*` variable cleared.
fn netop_cmd(home: &TempDir) -> assert_cmd::Command {
    let root = home.path();
    let mut cmd = cargo_bin_cmd!("netop");
    cmd.env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join("config"))
        .env("XDG_STATE_HOME", root.join("state"))
        .env("XDG_DATA_HOME", root.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("NETOP_PROFILE")
        .env_remove("NETOP_API_URL")
        .env_remove("NETOP_DEMO")
        .env_remove("NETOP_OUTPUT")
        .env_remove("NETOP_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = netop_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("incidents")
            .and(predicate::str::contains("notifications"))
            .and(predicate::str::contains("dashboard")),
    );
}

#[test]
fn version_flag() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netop"));
}

#[test]
fn completions_zsh() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn invalid_status_value_is_usage_error() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["--demo", "incidents", "list", "--status", "bogus"])
        .assert()
        .code(2);
}

// ── Demo mode ───────────────────────────────────────────────────────

#[test]
fn demo_incidents_list() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["--demo", "incidents", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Network Connectivity Issue"));
}

#[test]
fn demo_incidents_plain_filters_by_status() {
    let home = TempDir::new().unwrap();
    let output = netop_cmd(&home)
        .args(["--demo", "-o", "plain", "incidents", "list", "--status", "resolved"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<&str> = stdout.lines().collect();
    assert!(!ids.is_empty());
    assert!(!ids.contains(&"inc-001"), "inc-001 is open:\n{stdout}");
}

#[test]
fn demo_incident_json_is_enriched() {
    let home = TempDir::new().unwrap();
    let output = netop_cmd(&home)
        .args(["--demo", "-o", "json", "incidents", "get", "inc-001"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], "inc-001");
    assert!(value["site_name"].is_string(), "site name resolved: {value}");
}

#[test]
fn missing_incident_exits_not_found() {
    let home = TempDir::new().unwrap();
    let output = netop_cmd(&home)
        .args(["--demo", "incidents", "get", "missing-id"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("missing-id"));
}

#[test]
fn demo_dashboard_json() {
    let home = TempDir::new().unwrap();
    let output = netop_cmd(&home)
        .args(["--demo", "-o", "json", "dashboard"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["active_incidents"], 4);
    assert_eq!(value["sites_total"], 4);
    assert_eq!(value["recent"].as_array().map(Vec::len), Some(5));
}

#[test]
fn demo_notifications_summary() {
    let home = TempDir::new().unwrap();
    let output = netop_cmd(&home)
        .args(["--demo", "-o", "json", "notifications", "summary"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["active"], 8);
    assert_eq!(value["push"], 8);
    assert_eq!(value["email"], 4);
}

#[test]
fn demo_counts_by_severity() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["--demo", "incidents", "counts", "--by", "severity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("critical").and(predicate::str::contains("Count")));
}

#[test]
fn demo_token_and_status() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["--demo", "auth", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo-token-123"));
    netop_cmd(&home)
        .args(["--demo", "-o", "plain", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn demo_mode_persists_until_logout() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["--demo", "sites", "list"])
        .assert()
        .success();

    // No --demo: the persisted flag still selects the demo dataset.
    netop_cmd(&home)
        .args(["sites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Headquarters"));

    netop_cmd(&home)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Left demo mode"));

    netop_cmd(&home).args(["sites", "list"]).assert().failure();
}

#[test]
fn demo_login_is_rejected() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["--demo", "auth", "login", "--code", "abc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("demo mode"));
}

// ── Without configuration ───────────────────────────────────────────

#[test]
fn incidents_without_identity_fail() {
    let home = TempDir::new().unwrap();
    let output = netop_cmd(&home).args(["incidents", "list"]).output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output).to_lowercase();
    assert!(
        text.contains("identity") || text.contains("config"),
        "expected a configuration hint:\n{text}"
    );
}

#[test]
fn config_show_and_path() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
    netop_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_use_unknown_profile() {
    let home = TempDir::new().unwrap();
    netop_cmd(&home)
        .args(["config", "use", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}
