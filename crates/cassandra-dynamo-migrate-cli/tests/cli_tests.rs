//! CLI integration tests for cassandra-dynamo-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for configuration errors. Only the driver test opens a
//! connection, and it targets a closed local port.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the cassandra-dynamo-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("cassandra-dynamo-migrate").unwrap()
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
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("seed"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_seed_subcommand_help() {
    cmd()
        .args(["seed", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("[default: 100000]"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cassandra-dynamo-migrate"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

// =============================================================================
// Exit Code Tests - Config Errors (Exit Code 1)
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .code(1);
}

#[test]
fn test_wrong_store_type_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "source:").unwrap();
    writeln!(file, "  type: mssql").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("source.type must be 'cassandra'"));
}

#[test]
fn test_unbounded_retries_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "retry:").unwrap();
    writeln!(file, "  max_retries: 1000").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("retry.max_retries"));
}

#[test]
fn test_default_build_includes_store_drivers() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "source:").unwrap();
    writeln!(file, "  endpoint: 127.0.0.1:1").unwrap();
    writeln!(file, "retry:").unwrap();
    writeln!(file, "  max_retries: 0").unwrap();
    writeln!(file, "  backoff_unit_ms: 1").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Stage connect-source failed after 1 attempt(s)"))
        .stderr(predicate::str::contains("without store drivers").not());
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
