//! CLI integration tests
//!
//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get the knowhub binary for testing
fn knowhub_cmd() -> Command {
    let mut cmd = Command::cargo_bin("knowhub").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("KNOWHUB_API_URL")
        .env_remove("KNOWHUB_LOG_LEVEL");
    cmd
}

/// Write a config file whose debug state lives inside `dir`.
fn write_config(dir: &TempDir, base_url: &str) -> std::path::PathBuf {
    let config_path = dir.path().join("knowhub.toml");
    let contents = format!(
        "[api]\nbase_url = \"{}\"\n\n[debug]\nstate_dir = \"{}\"\n",
        base_url,
        dir.path().join("state").display()
    );
    std::fs::write(&config_path, contents).unwrap();
    config_path
}

#[test]
fn test_version_output() {
    knowhub_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("knowhub"));
}

#[test]
fn test_help_shows_all_commands() {
    knowhub_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("request"))
        .stdout(predicate::str::contains("entities"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("debug-panel"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("knowhub.toml");

    knowhub_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    let contents = std::fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[api]"));
    assert!(contents.contains("[debug]"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("knowhub.toml");
    std::fs::write(&config_path, "# mine").unwrap();

    knowhub_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "# mine");
}

#[test]
fn test_debug_panel_preferences_persist_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, "http://localhost:8000/api");
    let config = config_path.to_str().unwrap();

    knowhub_cmd()
        .args(["debug-panel", "open", "--config", config])
        .assert()
        .success();
    knowhub_cmd()
        .args(["debug-panel", "filter", "error", "--config", config])
        .assert()
        .success();

    knowhub_cmd()
        .args(["debug-panel", "show", "--config", config])
        .assert()
        .success()
        .stdout(predicate::str::contains("open"))
        .stdout(predicate::str::contains("error"));

    let saved = std::fs::read_to_string(temp_dir.path().join("state/debug-panel.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["isOpen"], true);
    assert_eq!(saved["filter"], "error");
}

#[test]
fn test_debug_panel_rejects_unknown_filter() {
    knowhub_cmd()
        .args(["debug-panel", "filter", "warnings"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("knowhub.toml");
    std::fs::write(&config_path, "[api]\ncaller = \"agent\"\n").unwrap();

    knowhub_cmd()
        .args(["debug-panel", "show", "--config", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_prints_envelope_and_debug_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/entities"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"entities": []}})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &format!("{}/api", server.uri()));

    let assert = tokio::task::spawn_blocking(move || {
        knowhub_cmd()
            .args([
                "request",
                "get",
                "/entities",
                "-q",
                "type=Project",
                "--show-debug",
                "--config",
                config_path.to_str().unwrap(),
            ])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stderr(predicate::str::contains("type=Project"))
        .stderr(predicate::str::contains("200"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_debug_log_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/entities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &format!("{}/api", server.uri()));

    let output = tokio::task::spawn_blocking(move || {
        knowhub_cmd()
            .args([
                "request",
                "get",
                "/entities",
                "--show-debug",
                "--debug-json",
                "--config",
                config_path.to_str().unwrap(),
            ])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let log: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(log["entries"][0]["status"], 200);
    assert_eq!(log["entries"][0]["method"], "GET");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_failure_shows_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/entities/p1"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"success": false, "msg": "forbidden"})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &format!("{}/api", server.uri()));

    let assert = tokio::task::spawn_blocking(move || {
        knowhub_cmd()
            .args([
                "entities",
                "delete",
                "p1",
                "--config",
                config_path.to_str().unwrap(),
            ])
            .assert()
    })
    .await
    .unwrap();

    assert
        .failure()
        .stderr(predicate::str::contains("Error: forbidden"));
}

#[test]
fn test_completions_bash() {
    knowhub_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("knowhub"));
}
