use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const NOTEBOOK: &str = r#"{
  "cells": [
    {
      "cell_type": "markdown",
      "metadata": {},
      "source": [
        "Energy \\(E\\) satisfies \\[E=mc^2\\]"
      ]
    },
    {
      "cell_type": "code",
      "execution_count": null,
      "metadata": {},
      "outputs": [],
      "source": [
        "x = r'\\(y\\)'"
      ]
    }
  ],
  "metadata": {},
  "nbformat": 4,
  "nbformat_minor": 5
}
"#;

fn write_notebook(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("notebook.ipynb");
    fs::write(&path, text).unwrap();
    path
}

fn markdown_line(path: &Path) -> String {
    let text = fs::read_to_string(path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    json["cells"][0]["source"][0].as_str().unwrap().to_string()
}

#[test]
#[allow(deprecated)]
fn test_rewrites_in_place() {
    let dir = tempdir().unwrap();
    let path = write_notebook(dir.path(), NOTEBOOK);

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg(&path);

    cmd.assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("Rewrote 4 delimiter(s) in 1 cell(s)"));
    assert_eq!(markdown_line(&path), "Energy $E$ satisfies $$E=mc^2$$");

    let text = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["cells"][1]["source"][0], "x = r'\\(y\\)'");
}

#[test]
#[allow(deprecated)]
fn test_second_run_is_clean() {
    let dir = tempdir().unwrap();
    let path = write_notebook(dir.path(), NOTEBOOK);

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg(&path);
    cmd.assert().success();
    let after_first = fs::read_to_string(&path).unwrap();

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg(&path);
    cmd.assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("No delimiters to rewrite"));
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
#[allow(deprecated)]
fn test_check_does_not_write() {
    let dir = tempdir().unwrap();
    let path = write_notebook(dir.path(), NOTEBOOK);

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg("--check").arg(&path);

    cmd.assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("Would rewrite 4 delimiter(s)"));
    assert_eq!(fs::read_to_string(&path).unwrap(), NOTEBOOK);
}

#[test]
#[allow(deprecated)]
fn test_check_clean_notebook() {
    let dir = tempdir().unwrap();
    let clean = NOTEBOOK.replace("Energy \\\\(E\\\\) satisfies \\\\[E=mc^2\\\\]", "Energy");
    let path = write_notebook(dir.path(), &clean);

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg("--check").arg(&path);

    cmd.assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("No delimiters to rewrite"));
}

#[test]
#[allow(deprecated)]
fn test_clean_notebook_keeps_its_formatting() {
    let dir = tempdir().unwrap();
    let compact = "{\"cells\":[{\"cell_type\":\"markdown\",\"metadata\":{},\"source\":[\"$x$\"]}],\"nbformat\":4}";
    let path = write_notebook(dir.path(), compact);

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg(&path);

    cmd.assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("No delimiters to rewrite"));
    assert_eq!(fs::read_to_string(&path).unwrap(), compact);
}

#[test]
#[allow(deprecated)]
fn test_json_output() {
    let dir = tempdir().unwrap();
    let path = write_notebook(dir.path(), NOTEBOOK);

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg("--json").arg(&path);

    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["written"], true);
    assert_eq!(json["report"]["markdown_cells"], 1);
    assert_eq!(json["report"]["cells_changed"], 1);
    assert_eq!(json["report"]["lines_changed"], 1);
    assert_eq!(json["report"]["replacements"]["display_open"], 1);
    assert_eq!(json["report"]["replacements"]["inline_close"], 1);
}

#[test]
#[allow(deprecated)]
fn test_json_check_output() {
    let dir = tempdir().unwrap();
    let path = write_notebook(dir.path(), NOTEBOOK);

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg("--check").arg("--json").arg(&path);

    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["written"], false);
    assert_eq!(fs::read_to_string(&path).unwrap(), NOTEBOOK);
}

#[test]
#[allow(deprecated)]
fn test_command_errors() {
    let dir = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg(dir.path().join("missing.ipynb"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: IO error"));

    let broken = write_notebook(dir.path(), "{\"cells\": [");
    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg(&broken);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Parse error"));
    assert_eq!(fs::read_to_string(&broken).unwrap(), "{\"cells\": [");

    let no_source = write_notebook(dir.path(), r#"{"cells": [{"cell_type": "markdown"}]}"#);
    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.arg(&no_source);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Schema error in cell 0"));
}

#[test]
#[allow(deprecated)]
fn test_path_is_required() {
    let mut cmd = Command::cargo_bin("nb-delim").unwrap();
    cmd.assert().failure().code(2);
}
