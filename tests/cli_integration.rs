//! Integration tests for the `orchestrator` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const CONFIG: &str = r#"
[routing]
default_profile = "balanced"

[[models]]
id = "A"
quality = 0.9
latency_ms = 500
cost_per_million = 10.0
base_url = "http://localhost:9001"

[[models]]
id = "B"
quality = 0.5
latency_ms = 100
cost_per_million = 1.0
base_url = "http://localhost:9002"
"#;

fn orchestrator() -> Command {
    Command::cargo_bin("orchestrator").unwrap()
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("orchestrator.toml");
    std::fs::write(&path, CONFIG).unwrap();
    path
}

#[test]
fn test_version() {
    orchestrator()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("orchestrator"));
}

#[test]
fn test_help_lists_commands() {
    orchestrator()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("route"))
        .stdout(predicate::str::contains("profiles"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn test_config_init_writes_example() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("generated.toml");

    orchestrator()
        .args(["config", "init", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("[[models]]"));

    orchestrator()
        .args(["config", "init", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_route_json_budget_prefers_cheap_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let output = orchestrator()
        .args(["route", "Hello", "--profile", "budget", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["profile"], "budget");
    assert_eq!(json["chain"][0]["model_id"], "B");
    assert_eq!(json["chain"][1]["model_id"], "A");
}

#[test]
fn test_route_quality_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    orchestrator()
        .args(["route", "Hello", "--profile", "quality", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("A"));
}

#[test]
fn test_route_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    orchestrator()
        .args(["route", "Hello", "--profile", "nonexistent", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn test_route_without_models_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    orchestrator()
        .args(["route", "Hello", "--config"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_profiles_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let output = orchestrator()
        .args(["profiles", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["default_profile"], "balanced");
    assert_eq!(json["profiles"].as_array().unwrap().len(), 5);
}

#[test]
fn test_models_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let output = orchestrator()
        .args(["models", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["id"], "A");
}

#[test]
fn test_completions_bash() {
    orchestrator()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("orchestrator"));
}
