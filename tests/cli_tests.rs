//! CLI integration tests.
//!
//! Runs the mrup-oracle binary as a subprocess and checks stdout and exit codes.

use std::path::{Path, PathBuf};
use std::process::Command;

const PASS_CASE: &str = r#"{
    "id": "cli-pass",
    "columns": ["dept", "salary", "wf_result"],
    "window": "OVER (PARTITION BY dept ORDER BY salary)",
    "function": "SUM",
    "t1": [["eng", 1, 1], ["eng", 2, 3]],
    "t2": [["sales", 5, 5]],
    "union": [["sales", 5, 5], ["eng", 2, 3], ["eng", 1, 1]]
}"#;

fn oracle() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mrup-oracle"))
}

fn run(args: &[&str]) -> (i32, String, String) {
    let output = oracle()
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to spawn mrup-oracle: {}", e));
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn write_case(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

// ============================================================================
// compare
// ============================================================================

#[test]
fn test_compare_pass() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path(), "pass.json", PASS_CASE);

    let (code, stdout, _) = run(&["compare", case.to_str().unwrap()]);
    assert_eq!(code, 0, "stdout: {}", stdout);

    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["verdict"], "PASS");
    assert_eq!(outcome["diagnostics"]["partitions_compared"], 2);
}

#[test]
fn test_compare_mismatch_writes_repro() {
    let dir = tempfile::tempdir().unwrap();
    let body = PASS_CASE.replace(r#"["sales", 5, 5], ["eng", 2, 3]"#, r#"["sales", 5, 5], ["eng", 2, 4]"#);
    let case = write_case(dir.path(), "fail.json", &body);
    let repro = dir.path().join("repro.sql");

    let (code, stdout, _) = run(&[
        "compare",
        case.to_str().unwrap(),
        "--max-samples",
        "1",
        "--repro",
        repro.to_str().unwrap(),
    ]);
    assert_eq!(code, 1, "stdout: {}", stdout);

    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["verdict"], "FAIL_PARTITION_MISMATCH");
    assert_eq!(outcome["diagnostics"]["mismatches"][0]["key"], "eng");

    let report = std::fs::read_to_string(&repro).unwrap();
    assert!(report.contains("-- H(t1 UNION ALL t2) != H(t1) UNION ALL H(t2)"));
    assert!(report.contains("-- Case: cli-pass"));
}

#[test]
fn test_compare_cardinality() {
    let dir = tempfile::tempdir().unwrap();
    let body = PASS_CASE.replace(r#"["sales", 5, 5], ["eng", 2, 3]"#, r#"["eng", 2, 3]"#);
    let case = write_case(dir.path(), "short.json", &body);

    let (code, stdout, _) = run(&["compare", case.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stdout.contains("\"FAIL_CARDINALITY\""));
}

#[test]
fn test_compare_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let body = PASS_CASE.replace(r#""t2": [["sales""#, r#""t2": [["eng""#);
    let case = write_case(dir.path(), "overlap.json", &body);

    let (code, stdout, _) = run(&["compare", case.to_str().unwrap()]);
    assert_eq!(code, 2);
    let error: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(error["error"]["code"], 400);
}

#[test]
fn test_compare_missing_file() {
    let (code, stdout, _) = run(&["compare", "/nonexistent/case.json"]);
    assert_eq!(code, 2);
    assert!(stdout.contains("\"code\":101"), "stdout: {}", stdout);
}

#[test]
fn test_compare_debug_logs_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path(), "pass.json", PASS_CASE);

    let output = oracle()
        .args(["--verbosity", "debug", "compare", case.to_str().unwrap()])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("verdict PASS"), "stderr: {}", stderr);
    // stdout stays machine-readable.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
}

// ============================================================================
// corpus
// ============================================================================

#[test]
fn test_corpus_fixture() {
    let corpus = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/corpus.json");
    let (code, stdout, _) = run(&["corpus", corpus.to_str().unwrap()]);
    // The fixture holds one deliberately unsound case.
    assert_eq!(code, 1, "stdout: {}", stdout);
    assert!(stdout.starts_with("5 passed, 0 failed, 1 inconclusive (total: 6)"));
    assert!(stdout.contains("INCONCLUSIVE nondeterministic-function"));
}

#[test]
fn test_corpus_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_case(dir.path(), "bad.json", "{\"manifest\": {}}");
    let (code, stdout, _) = run(&["corpus", path.to_str().unwrap()]);
    assert_eq!(code, 2);
    assert!(stdout.contains("\"code\":100"), "stdout: {}", stdout);
}

// ============================================================================
// check-window and version
// ============================================================================

#[test]
fn test_check_window_sound() {
    let (code, stdout, _) = run(&[
        "check-window",
        "OVER (PARTITION BY dept ORDER BY salary DESC)",
        "--function",
        "RANK",
        "--columns",
        "dept,salary,wf_result",
    ]);
    assert_eq!(code, 0, "stdout: {}", stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["checks"].as_array().unwrap().len(), 6);
    assert_eq!(report["order_by"], "ORDER BY salary DESC NULLS LAST");
    assert_eq!(report["sound"], true);
}

#[test]
fn test_check_window_unsound() {
    let (code, stdout, _) = run(&["check-window", "OVER (ORDER BY salary)"]);
    assert_eq!(code, 1);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let checks = report["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 4);
    assert_eq!(checks[0]["id"], "C0");
    assert_eq!(checks[0]["passed"], false);
}

#[test]
fn test_check_window_order_by_wf_result() {
    let (code, stdout, _) = run(&[
        "check-window",
        "OVER (PARTITION BY dept ORDER BY wf_result)",
        "--function",
        "SUM",
        "--columns",
        "dept,salary,wf_result",
    ]);
    assert_eq!(code, 1, "stdout: {}", stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["checks"][2]["id"], "C2");
    assert_eq!(report["checks"][2]["passed"], false);
    assert_eq!(report["sound"], false);
}

#[test]
fn test_check_window_partition_not_leading() {
    let (code, stdout, _) = run(&[
        "check-window",
        "OVER (PARTITION BY salary)",
        "--columns",
        "dept,salary,wf_result",
    ]);
    assert_eq!(code, 2);
    assert!(stdout.contains("\"code\":303"), "stdout: {}", stdout);
}

#[test]
fn test_version() {
    let (code, stdout, _) = run(&["version"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("mrup-oracle v"));
}

#[test]
fn test_help_lists_commands() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0);
    for command in ["compare", "corpus", "check-window", "version"] {
        assert!(stdout.contains(command), "missing {}", command);
    }
    assert!(stdout.contains("--log-format"));
}
