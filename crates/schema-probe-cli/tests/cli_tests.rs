//! CLI integration tests for schema-probe.
//!
//! These tests verify command-line argument parsing, help output,
//! the engine listing and exit codes for configuration errors. None of
//! them needs a live database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the schema-probe binary.
fn cmd() -> Command {
    Command::cargo_bin("schema-probe").unwrap()
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("engines"))
        .stdout(predicate::str::contains("test-connection"))
        .stdout(predicate::str::contains("databases"))
        .stdout(predicate::str::contains("schema"))
        .stdout(predicate::str::contains("query"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("schema-probe"));
}

#[test]
fn test_query_requires_sql() {
    cmd()
        .args(["query", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sql"));

    cmd().arg("query").assert().failure().code(2);
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_global_flag_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("[default: probe.yaml]"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("[default: info]"));
}

// =============================================================================
// Engine Listing Tests
// =============================================================================

#[test]
fn test_engines_lists_builtins_without_config() {
    cmd()
        .args(["--config", "nonexistent_probe.yaml", "engines"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres - Postgres [fan-out]"))
        .stdout(predicate::str::contains("mssql - SQL Server [batch]"))
        .stdout(predicate::str::contains("trustServerCertificate"));
}

#[test]
fn test_engines_json_output() {
    let output = cmd()
        .args(["--output-json", "engines"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let engines: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = engines
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["mssql", "postgres"]);
    assert_eq!(engines[1]["strategy"], "fan_out");
}

// =============================================================================
// Exit Code Tests - Config Errors (Exit Code 2)
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_2() {
    cmd()
        .args(["--config", "nonexistent_probe.yaml", "schema"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_query_with_missing_config_exits_with_code_2() {
    cmd()
        .args(["--config", "nonexistent_probe.yaml", "query", "--sql", "SELECT 1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_yaml_exits_with_code_2() {
    let file = config_file("invalid: yaml: content: [\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "databases"])
        .assert()
        .code(2);
}

#[test]
fn test_empty_config_exits_with_code_2() {
    let file = config_file("");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "test-connection"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_engine_exits_with_code_2() {
    let file = config_file(
        "connection:\n  engine: oracle\n  host: localhost\n  database: app\n  user: app\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "schema"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("oracle"));
}

#[test]
fn test_missing_required_fields_exits_with_code_2() {
    let file = config_file("connection:\n  engine: postgres\n  host: localhost\n  database: app\n  user: \"\"\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "schema"])
        .assert()
        .code(2);
}
