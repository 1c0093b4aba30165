//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "curfew-cli", "--"])
        .args(args)
        .env("CURFEW_DATA_DIR", data_dir)
        .env("CURFEW_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[test]
fn test_status_json() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_ok(dir.path(), &["status"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["type"], "StatusSnapshot");
    assert!(json["in_curfew"].is_boolean());
    assert_eq!(json["home"], "unknown");
    assert_eq!(json["sent_this_cycle"], serde_json::json!([]));
}

#[test]
fn test_status_text() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_ok(dir.path(), &["status", "--text"]);
    assert!(stdout.contains("Curfew"));
    assert!(stdout.contains("Home location not set."));
}

#[test]
fn test_rules_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["rules", "add", "30"]);
    run_ok(dir.path(), &["rules", "add", "60", "--message", "One hour left"]);

    let (_, stderr, code) = run_cli(dir.path(), &["rules", "add", "30"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    run_ok(dir.path(), &["rules", "disable", "30"]);
    run_ok(dir.path(), &["rules", "edit", "60", "--to", "45"]);

    let stdout = run_ok(dir.path(), &["rules", "list"]);
    let rules: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rules[0]["minutesBefore"], 45);
    assert_eq!(rules[0]["message"], "One hour left");
    assert_eq!(rules[1]["minutesBefore"], 30);
    assert_eq!(rules[1]["enabled"], false);

    run_ok(dir.path(), &["rules", "remove", "30"]);
    let stdout = run_ok(dir.path(), &["rules", "list"]);
    let rules: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rules.as_array().unwrap().len(), 1);
}

#[test]
fn test_emulate_posts_notification() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["rules", "add", "15"]);
    let stdout = run_ok(dir.path(), &["emulate", "15"]);
    let first: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(first["id"], 116);
    assert_eq!(first["body"], "Emulated notification 15 minutes before curfew!");

    let (_, _, code) = run_cli(dir.path(), &["emulate", "99"]);
    assert_eq!(code, 1);
}

#[test]
fn test_home_set_check_clear() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["home", "set", "50.45", "30.52"]);

    let stdout = run_ok(dir.path(), &["home", "check", "--lat", "50.45", "--lon", "30.52"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["status"], "at_home");
    assert_eq!(json["message"], "You are home.");

    let stdout = run_ok(dir.path(), &["home", "check", "--lat", "50.46", "--lon", "30.52"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["status"], "away");

    run_ok(dir.path(), &["home", "clear"]);
    assert_eq!(run_ok(dir.path(), &["home", "show"]).trim(), "null");
}

#[test]
fn test_home_rejects_bad_latitude() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["home", "set", "91", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(dir.path(), &["config", "get", "curfew.start"]).trim(), "23:00");
    run_ok(dir.path(), &["config", "set", "curfew.start", "22:00"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "curfew.start"]).trim(), "22:00");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "curfew.start", "late"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);

    run_ok(dir.path(), &["config", "reset"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "curfew.start"]).trim(), "23:00");
}

#[test]
fn test_news_failure_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["config", "set", "news.url", "http://127.0.0.1:9/rss"]);
    let stdout = run_ok(dir.path(), &["news", "--json"]);
    assert_eq!(stdout.trim(), "[]");
}
