// crates/lineage-gate-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for config validation and offline classify.
// Purpose: Ensure exit codes and output match the documented CLI contract.
// Dependencies: lineage-gate-cli binary
// ============================================================================
//! ## Overview
//! Runs the `lineage-gate` binary for `config validate` and `classify` and
//! checks exit status plus stdout/stderr content.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn lineage_gate_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lineage-gate"))
}

fn run(args: &[&str]) -> Output {
    Command::new(lineage_gate_bin())
        .args(args)
        .env_remove("LINEAGE_GATE_CONFIG")
        .env_remove("ConnectionString")
        .env_remove("ContainerName")
        .output()
        .expect("run lineage-gate")
}

const RELEVANT_BODY: &str = r#"{"eventType":"COMPLETE","run":{"runId":"r1","facets":{"logicalPlan":{"plan":[{"@class":"org.apache.spark.sql.execution.datasources.CreateTable"}]}}},"job":{"name":"etl_job.py"}}"#;

// ============================================================================
// SECTION: Config Validate
// ============================================================================

#[test]
fn config_validate_accepts_valid_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lineage-gate.toml");
    fs::write(&path, "[server]\nbind = \"127.0.0.1:9000\"\n[archive]\ncontainer = \"lineage\"\n")
        .unwrap();
    let output = run(&["config", "validate", "--config", path.to_string_lossy().as_ref()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "config ok");
}

#[test]
fn config_validate_rejects_invalid_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lineage-gate.toml");
    fs::write(&path, "[server]\nmax_body_bytes = 0\n").unwrap();
    let output = run(&["config", "validate", "--config", path.to_string_lossy().as_ref()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_body_bytes"), "unexpected stderr: {stderr}");
}

// ============================================================================
// SECTION: Classify
// ============================================================================

#[test]
fn classify_prints_relevant_decision() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("event.json");
    fs::write(&path, RELEVANT_BODY).unwrap();
    let output = run(&["classify", "--input", path.to_string_lossy().as_ref()]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["decision"], "relevant");
    assert_eq!(report["event"]["job_name"], "etl_job.py");
}

#[test]
fn classify_honors_event_type_override() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("event.json");
    fs::write(&path, RELEVANT_BODY).unwrap();
    let output = run(&[
        "classify",
        "--input",
        path.to_string_lossy().as_ref(),
        "--event-type",
        "START",
    ]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["decision"], "skipped");
}

#[test]
fn classify_fails_on_missing_required_fields() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("event.json");
    fs::write(&path, r#"{"eventType":"COMPLETE","job":{"name":"nb"}}"#).unwrap();
    let output = run(&["classify", "--input", path.to_string_lossy().as_ref()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required fields"), "unexpected stderr: {stderr}");
}
