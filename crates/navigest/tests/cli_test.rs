//! Integration tests for the `navigest` CLI binary.
//!
//! Argument parsing, canonicalization commands, client file handling and
//! config management, all against temporary files.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `navigest` binary with env isolation.
///
/// Clears `NAVIGEST_*` variables and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn navigest_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("navigest");
    cmd.env("HOME", "/tmp/navigest-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/navigest-cli-test-nonexistent")
        .env_remove("NAVIGEST_OUTPUT")
        .env_remove("NAVIGEST_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const CLIENTS_JSON: &str = r#"[
  {"code": "CL000002", "name": "Maria Costa", "phone_body": "912 345 678", "dial_prefix": "+351",
   "email": "maria@example.pt", "salesperson": "ANA", "credit_value": "0,00€"},
  {"code": "CL000001", "name": "João Silva", "phone_body": "600 000 000", "dial_prefix": "+34",
   "email": "joao@example.es", "salesperson": "RUI", "credit_value": "1 234,50€", "external_flag": true}
]"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = navigest_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    navigest_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("phone")
            .and(predicate::str::contains("currency"))
            .and(predicate::str::contains("clients"))
            .and(predicate::str::contains("dial-codes")),
    );
}

#[test]
fn test_version_flag() {
    navigest_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("navigest"));
}

#[test]
fn test_completions_zsh() {
    navigest_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Phone ───────────────────────────────────────────────────────────

#[test]
fn test_phone_split_json() {
    navigest_cmd()
        .args(["phone", "split", "-o", "json", "+351 912345678"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""prefix": "+351""#)
                .and(predicate::str::contains(r#""body": "912 345 678""#))
                .and(predicate::str::contains(r#""short_code": "PT""#))
                .and(predicate::str::contains(r#""external": false"#)),
        );
}

#[test]
fn test_phone_split_foreign_is_external() {
    navigest_cmd()
        .args(["phone", "split", "-o", "json-compact", "0034 600000000"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""prefix":"+34""#)
                .and(predicate::str::contains(r#""external":true"#)),
        );
}

#[test]
fn test_phone_split_plain_with_stored_prefix() {
    navigest_cmd()
        .args(["phone", "split", "-o", "plain", "--prefix", "00351", "912345678"])
        .assert()
        .success()
        .stdout("+351 912 345 678\n");
}

#[test]
fn test_phone_prefix_and_body() {
    navigest_cmd()
        .args(["phone", "prefix", "-o", "plain", "00351"])
        .assert()
        .success()
        .stdout("+351\n");

    navigest_cmd()
        .args(["phone", "body", "-o", "plain", "912-345-678"])
        .assert()
        .success()
        .stdout("912 345 678\n");
}

// ── Currency ────────────────────────────────────────────────────────

#[test]
fn test_currency_plain() {
    navigest_cmd()
        .args(["currency", "-o", "plain", "1.234,5", "1234.5", "-0,001", "abc"])
        .assert()
        .success()
        .stdout("1 234,50€\n1 234,50€\n0,00€\n0,00€\n");
}

#[test]
fn test_currency_requires_a_value() {
    navigest_cmd().arg("currency").assert().failure().code(2);
}

// ── Dial codes ──────────────────────────────────────────────────────

#[test]
fn test_dial_codes_search() {
    navigest_cmd()
        .args(["dial-codes", "--search", "portugal", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PT +351"));
}

#[test]
fn test_dial_codes_include_configured_extras() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(
        dir.path(),
        "config.toml",
        "[[dial_codes]]\niso = \"XK\"\nname = \"Kosovo\"\ndigits = \"383\"\n",
    );

    navigest_cmd()
        .args(["dial-codes", "-s", "kosovo", "-o", "json-compact"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""normalized_prefix":"+383""#));
}

// ── Clients ─────────────────────────────────────────────────────────

#[test]
fn test_clients_list_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "clients.json", CLIENTS_JSON);

    navigest_cmd()
        .args(["clients", "list", "-o", "plain", "--from-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout("CL000001\nCL000002\n");
}

#[test]
fn test_clients_list_search() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "clients.json", CLIENTS_JSON);

    navigest_cmd()
        .args(["clients", "list", "--search", "joão", "-o", "plain", "--from-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout("CL000001\n");
}

#[test]
fn test_clients_list_rejects_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "clients.json", "{not json");

    navigest_cmd()
        .args(["clients", "list", "--from-file"])
        .arg(&file)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn test_clients_check_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "clients.json", CLIENTS_JSON);

    navigest_cmd()
        .args(["clients", "check", "-o", "plain", "--from-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout("CL000002\tok\nCL000001\tok\n");
}

#[test]
fn test_clients_check_reports_invalid_records() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(
        dir.path(),
        "clients.json",
        r#"[{"code": "CL9", "name": "Sem Email", "phone_body": "912345678", "salesperson": "ANA"}]"#,
    );

    navigest_cmd()
        .args(["clients", "check", "-o", "plain", "--from-file"])
        .arg(&file)
        .assert()
        .failure()
        .code(3)
        .stdout(predicate::str::contains("CL9\tEmail is required"))
        .stderr(predicate::str::contains("1 of 1 client records failed validation"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    navigest_cmd()
        .args(["config", "path", "--config", "/tmp/navigest-test/config.toml"])
        .assert()
        .success()
        .stdout("/tmp/navigest-test/config.toml\n");
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    navigest_cmd()
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    navigest_cmd()
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    navigest_cmd()
        .args(["config", "init", "--force", "--config"])
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn test_config_show_includes_defaults() {
    navigest_cmd()
        .args(["config", "show", "--config", "/tmp/navigest-cli-test-nonexistent/c.toml"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("prefix = \"CL\"")
                .and(predicate::str::contains("default_country = \"PT\"")),
        );
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(dir.path(), "config.toml", "[phone]\nbody_max = 50\n");

    navigest_cmd()
        .arg("phone")
        .arg("body")
        .arg("--config")
        .arg(&config)
        .arg("912345678")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("phone.body_max"));
}

#[test]
fn test_currency_ignores_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(dir.path(), "config.toml", "[phone]\nbody_max = 50\n");

    navigest_cmd()
        .args(["currency", "-o", "plain", "--config"])
        .arg(&config)
        .arg("10")
        .assert()
        .success()
        .stdout("10,00€\n");
}
