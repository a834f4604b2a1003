//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Build command for the v2g-audit-cli binary (finds it in target/debug when run via cargo test).
fn audit_cli() -> Command {
    cargo_bin_cmd!("v2g-audit-cli")
}

/// Path to v2g-audit library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("v2g-audit")
        .join("tests")
        .join("fixtures")
}

fn audit_cmd(primitives: &str, out: &std::path::Path) -> Command {
    let fixtures = fixtures_dir();
    let mut cmd = audit_cli();
    cmd.arg("audit")
        .arg("--primitives")
        .arg(fixtures.join(primitives))
        .arg("--config")
        .arg(fixtures.join("config.json"))
        .arg("--rules")
        .arg(fixtures.join("rules.json"))
        .arg("--out")
        .arg(out);
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = audit_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("schematic"));
}

#[test]
fn test_cli_version() {
    let mut cmd = audit_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_audit_writes_reports() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    audit_cmd("grounded_loop.json", &out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph: 7 nodes, 5 edges"))
        .stdout(predicate::str::contains(
            "[PASS] check_grounding_uniqueness @ All: Exactly one grounding node.",
        ))
        .stdout(predicate::str::contains("[FAIL] check_phase_rotation @ All: Unknown function"));

    assert!(out.join("graph.json").exists());
    assert!(out.join("report.json").exists());
    let summary = std::fs::read_to_string(out.join("report.txt")).unwrap();
    assert_eq!(summary.lines().count(), 6);
}

#[test]
fn test_cli_audit_fail_on_failure() {
    let dir = tempfile::tempdir().unwrap();

    audit_cmd("dangling.json", dir.path())
        .arg("--fail-on-failure")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Multiple grounding nodes: 2."));
}

#[test]
fn test_cli_audit_json_output() {
    let dir = tempfile::tempdir().unwrap();

    let output = audit_cmd("dangling.json", dir.path())
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["passed"], false);
    assert_eq!(json["results"].as_array().unwrap().len(), 6);
    assert_eq!(json["results"][1]["suspects"], serde_json::json!(["EP3"]));
}

#[test]
fn test_cli_audit_tau_override() {
    let dir = tempfile::tempdir().unwrap();

    audit_cmd("dangling.json", dir.path())
        .arg("--tau")
        .arg("0.1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph: 7 nodes"));
}

#[test]
fn test_cli_audit_rejects_negative_tau() {
    let dir = tempfile::tempdir().unwrap();

    audit_cmd("dangling.json", dir.path())
        .arg("--tau=-1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("tau_endpoint_snap"));
}

#[test]
fn test_cli_audit_nonexistent_file() {
    let dir = tempfile::tempdir().unwrap();

    audit_cmd("does_not_exist.json", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_verify_saved_graph() {
    let fixtures = fixtures_dir();
    let mut cmd = audit_cli();

    cmd.arg("verify")
        .arg("--graph")
        .arg(fixtures.join("polarity_graph.json"))
        .arg("--rules")
        .arg(fixtures.join("rules.json"))
        .arg("--fail-on-failure");

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("Graph: 4 nodes, 3 edges"))
        .stdout(predicate::str::contains("(EP0, EP1, +, -)"));
}

#[test]
fn test_cli_verify_round_trips_audit_output() {
    let dir = tempfile::tempdir().unwrap();
    audit_cmd("grounded_loop.json", dir.path()).assert().success();

    let mut cmd = audit_cli();
    cmd.arg("verify")
        .arg("--graph")
        .arg(dir.path().join("graph.json"))
        .arg("--rules")
        .arg(fixtures_dir().join("rules.json"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["results"][0]["ground_count"], 1);
}

#[test]
fn test_cli_verify_rejects_invalid_graph() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("graph.json");
    std::fs::write(
        &graph,
        r#"{"nodes": [{"id": "EP0", "type": "ENDPOINT", "x": 0, "y": 0}],
            "edges": [{"u": "EP0", "v": "EP9", "attrs": {"kind": "WIRE"}}]}"#,
    )
    .unwrap();

    let mut cmd = audit_cli();
    cmd.arg("verify")
        .arg("--graph")
        .arg(&graph)
        .arg("--rules")
        .arg(fixtures_dir().join("rules.json"));

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("EP9"));
}

#[test]
fn test_cli_inspect() {
    let mut cmd = audit_cli();

    cmd.arg("inspect")
        .arg("--graph")
        .arg(fixtures_dir().join("polarity_graph.json"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ENDPOINT"))
        .stdout(predicate::str::contains("GROUND_CONN"))
        .stdout(predicate::str::contains("\"id\": \"GROUND_3\""));
}

#[test]
fn test_cli_rules_command() {
    let mut cmd = audit_cli();

    cmd.arg("rules");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("check_grounding_uniqueness"))
        .stdout(predicate::str::contains("check_polarity_consistency"))
        .stdout(predicate::str::contains("exactly one grounding").not());
}

#[test]
fn test_cli_rules_verbose() {
    let mut cmd = audit_cli();

    cmd.arg("rules").arg("--verbose");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("exactly one grounding symbol"));
}

#[test]
fn test_cli_output_formats_are_different() {
    let dir = tempfile::tempdir().unwrap();

    let human_output = audit_cmd("grounded_loop.json", dir.path()).output().unwrap();
    let json_output = audit_cmd("grounded_loop.json", dir.path())
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert_ne!(
        human_output.stdout,
        json_output.stdout,
        "Different formats should produce different output"
    );
}
