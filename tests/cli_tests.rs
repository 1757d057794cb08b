//! CLI interface tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  { "path": "config.port", "format": "integer" },
  { "path": "a.b" },
  { "path": "a.c" }
]"#;

fn workspace(template: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("template.yaml"), template).unwrap();
    fs::write(temp_dir.path().join("catalog.json"), CATALOG).unwrap();
    temp_dir
}

fn valuegraft(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("valuegraft").unwrap();
    cmd.current_dir(dir)
        .env_remove("VALUEGRAFT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("valuegraft").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("valuegraft"));
}

#[test]
fn test_help_flag() {
    let mut cmd = Command::cargo_bin("valuegraft").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Uncomment known parameters in commented YAML configuration templates",
        ))
        .stdout(predicate::str::contains("--repair-strategy"));
}

#[test]
fn test_missing_template_error() {
    let temp_dir = TempDir::new().unwrap();

    valuegraft(temp_dir.path())
        .args(["--template", "missing.yaml"])
        .assert()
        .failure()
        .code(2) // Input error
        .stderr(predicate::str::contains("Failed to read template"));
}

#[test]
fn test_transformed_document_goes_to_stdout() {
    let temp_dir = workspace("config:\n  # port: 8080\n  # unknown: 1\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml", "--catalog", "catalog.json"])
        .assert()
        .success()
        .stdout("config:\n  port: 8080\n  # unknown: 1\n");
}

#[test]
fn test_output_file() {
    let temp_dir = workspace("config:\n  # port: 8080\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml", "--catalog", "catalog.json"])
        .args(["--output", "values.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(temp_dir.path().join("values.yaml")).unwrap();
    assert_eq!(written, "config:\n  port: 8080\n");
}

#[test]
fn test_missing_output_directory_error() {
    let temp_dir = workspace("config:\n  # port: 8080\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml"])
        .args(["--output", "no/such/dir/values.yaml"])
        .assert()
        .failure()
        .code(3); // Output error
}

#[test]
fn test_lint_errors_exit_with_partial_success() {
    let temp_dir = workspace("a:\n    b: 1\n#  c: 2\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml", "--catalog", "catalog.json"])
        .assert()
        .failure()
        .code(6)
        .stdout("a:\n    b: 1\n  c: 2\n");
}

#[test]
fn test_revert_strategy_repairs_lint_errors() {
    let temp_dir = workspace("a:\n    b: 1\n#  c: 2\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml", "--catalog", "catalog.json"])
        .args(["--repair-strategy", "revert"])
        .assert()
        .success()
        .stdout("a:\n    b: 1\n#  c: 2\n");
}

#[test]
fn test_report_file() {
    let temp_dir = workspace("config:\n  # port: 8080\n# mandatory in production\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml", "--catalog", "catalog.json"])
        .args(["--report", "report.json", "--quiet"])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["summary"]["lines_uncommented"], 1);
    assert_eq!(report["summary"]["constraints_seen"], 1);
    assert_eq!(report["summary"]["catalog_records_ingested"], 3);
}

#[test]
fn test_invalid_options_file_error() {
    let temp_dir = workspace("config:\n  # port: 8080\n");
    fs::write(temp_dir.path().join("valuegraft.yaml"), "indent_step: 0\n").unwrap();

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml"])
        .assert()
        .failure()
        .code(1); // Configuration error
}

#[test]
fn test_missing_explicit_options_file_error() {
    let temp_dir = workspace("config:\n  # port: 8080\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml", "--config", "nope.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Options file not found"));
}

#[test]
fn test_indent_step_option() {
    let temp_dir = workspace("config:\n# port: 8080\n");

    valuegraft(temp_dir.path())
        .args(["--template", "template.yaml", "--catalog", "catalog.json"])
        .args(["--indent-step", "4"])
        .assert()
        .success()
        .stdout("config:\n    port: 8080\n");
}
