//! End-to-end tests for the `quill` binary

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCHEMA: &str = r#"
struct Pool {
    pools: [struct { rolls: int @ 1.., }],
}
struct Pig {
    Saddle?: boolean,
}
dispatch minecraft:entity[pig] to Pig
"#;

fn quill() -> Command {
    cargo_bin_cmd!("quill")
}

/// A project with a loot table category and one function file
fn project(loot_table: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "schema.mcdoc", SCHEMA);
    write(
        dir.path(),
        "quill.json",
        r#"{"schemas": ["schema.mcdoc"], "categories": {"loot_table": "Pool"}}"#,
    );
    write(dir.path(), "data/foo/loot_table/chest.json", loot_table);
    write(dir.path(), "data/foo/function/tick.mcfunction", "kill @e[type=pig,nbt={Saddle: 1b}]\n");
    dir
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(path, text).expect("write file");
}

// === Help ===

#[test]
fn test_help() {
    quill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema-directed checker"));
}

// === check ===

#[test]
fn test_check_clean_project() {
    let dir = project(r#"{"pools": [{"rolls": 1}]}"#);
    quill()
        .arg("check")
        .arg(dir.path())
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("0 errors, 0 warnings, 0 hints"));
}

#[test]
fn test_check_reports_schema_errors() {
    let dir = project(r#"{"pools": [{"rolls": 0}]}"#);
    quill()
        .arg("check")
        .arg(dir.path())
        .arg("--root")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 errors, 0 warnings, 0 hints"))
        .stderr(predicate::str::contains("expected a value in range 1.."));
}

#[test]
fn test_check_reports_command_nbt_errors() {
    let dir = project(r#"{"pools": []}"#);
    write(dir.path(), "data/foo/function/tick.mcfunction", "kill @e[type=pig,nbt={Saddle: 2b}]\n");
    quill()
        .arg("check")
        .arg(dir.path().join("data/foo/function"))
        .arg("--root")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected a boolean"));
}

#[test]
fn test_check_rejects_bad_release() {
    let dir = project("{}");
    quill()
        .arg("check")
        .arg(dir.path())
        .args(["--release", "soon"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid release version: soon"));
}

#[test]
fn test_check_missing_schema_file() {
    let dir = project("{}");
    write(dir.path(), "quill.json", r#"{"schemas": ["nope.mcdoc"]}"#);
    quill()
        .arg("check")
        .arg(dir.path())
        .arg("--root")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot read"));
}

// === parse ===

#[test]
fn test_parse_outputs_json_tree() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a.snbt", "{a: 1b}");
    let output = quill()
        .arg("parse")
        .arg(dir.path().join("a.snbt"))
        .output()
        .expect("run quill");
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON tree");
    assert_eq!(tree["range"]["start"], 0);
    assert_eq!(tree["range"]["end"], 7);
    assert_eq!(tree["children"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_parse_reports_syntax_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a.txt", "{a: }");
    quill()
        .arg("parse")
        .arg(dir.path().join("a.txt"))
        .args(["--grammar", "snbt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected a value"));
}

#[test]
fn test_parse_unknown_grammar() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a.txt", "{}");
    quill()
        .arg("parse")
        .arg(dir.path().join("a.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pass --grammar"));
}

// === complete ===

#[test]
fn test_complete_lists_struct_keys() {
    let dir = project(r#"{"pools": [{}]}"#);
    let output = quill()
        .arg("complete")
        .arg(dir.path().join("data/foo/loot_table/chest.json"))
        .args(["--offset", "12", "--root"])
        .arg(dir.path())
        .output()
        .expect("run quill");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON items");
    let items = items.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["label"], "rolls");
    assert_eq!(items[0]["kind"], "field");
    assert_eq!(items[0]["range"]["start"], 12);
}

#[test]
fn test_complete_offset_out_of_bounds() {
    let dir = project("{}");
    quill()
        .arg("complete")
        .arg(dir.path().join("data/foo/loot_table/chest.json"))
        .args(["--offset", "99"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("past the end"));
}
