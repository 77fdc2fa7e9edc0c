//! Integration tests for the structgen binary.
//!
//! Each test runs the compiled binary inside a temporary working directory.

#![allow(non_snake_case)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = r#"{
  "modules": {
    "Sample": {
      "aliases": {
        "Sample.User": {
          "type": "object",
          "properties": [
            { "name": "name", "type": { "type": "primitive", "kind": "string" } },
            { "name": "manager", "optional": true, "type": { "type": "alias", "name": "Sample.User" } }
          ]
        }
      },
      "methods": [
        {
          "name": "getUser",
          "params": [{ "name": "id", "type": { "type": "primitive", "kind": "number" } }],
          "returnType": { "type": "alias", "name": "Sample.User" }
        }
      ]
    },
    "Broken": {
      "methods": [
        { "name": "walk", "params": [{ "name": "start", "type": { "type": "alias", "name": "Missing" } }] }
      ]
    }
  }
}"#;

/// Helper to create a working directory holding `schema.json`.
fn workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("schema.json"), SCHEMA).unwrap();
    temp_dir
}

fn structgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_structgen"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// generate
// =============================================================================

#[test]
fn generate___single_module___writes_header() {
    let dir = workspace();

    let output = structgen(
        dir.path(),
        &["generate", "--schema", "schema.json", "--output", "out", "--module", "Sample"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let header = fs::read_to_string(dir.path().join("out/SampleStructs.h")).unwrap();
    assert!(header.contains("struct Sample_User {"));
    assert!(header.contains("#endif // STRUCTGEN_SAMPLE_H"));
    assert!(!dir.path().join("out/BrokenStructs.h").exists());
}

#[test]
fn generate___failing_module___writes_others_and_exits_non_zero() {
    let dir = workspace();

    let output = structgen(dir.path(), &["generate", "--schema", "schema.json", "-o", "out"]);

    assert!(!output.status.success());
    assert!(dir.path().join("out/SampleStructs.h").exists());
    assert!(!dir.path().join("out/BrokenStructs.h").exists());
}

#[test]
fn generate___manifest_in_working_directory___applies_settings() {
    let dir = workspace();
    fs::write(
        dir.path().join("structgen.toml"),
        r#"
modules = ["Sample"]

[generator]
namespace = "app::native"

[output]
directory = "headers"
file_pattern = "{module}Types.h"
"#,
    )
    .unwrap();

    let output = structgen(dir.path(), &["generate", "--schema", "schema.json"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let header = fs::read_to_string(dir.path().join("headers/SampleTypes.h")).unwrap();
    assert!(header.contains("namespace app::native {"));
}

#[test]
fn generate___unknown_module___exits_non_zero() {
    let dir = workspace();

    let output = structgen(
        dir.path(),
        &["generate", "--schema", "schema.json", "--module", "Nope"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Nope"));
}

#[test]
fn generate___missing_schema___exits_non_zero() {
    let dir = TempDir::new().unwrap();

    let output = structgen(dir.path(), &["generate", "--schema", "missing.json"]);

    assert!(!output.status.success());
}

#[test]
fn generate___module_name_escaping_output___writes_nothing() {
    let dir = TempDir::new().unwrap();
    let schema = r#"{
  "modules": {
    "../evil": {},
    "Sample": {}
  }
}"#;
    fs::write(dir.path().join("schema.json"), schema).unwrap();

    let output = structgen(dir.path(), &["generate", "--schema", "schema.json", "-o", "out"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("path separators"));
    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("evilStructs.h").exists());
}

// =============================================================================
// check
// =============================================================================

#[test]
fn check___valid_module___succeeds_without_writing() {
    let dir = workspace();

    let output = structgen(
        dir.path(),
        &["check", "--schema", "schema.json", "--module", "Sample"],
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains("✓ Sample"));
    assert!(!dir.path().join("generated").exists());
}

#[test]
fn check___failing_module___reports_and_exits_non_zero() {
    let dir = workspace();

    let output = structgen(dir.path(), &["check", "--schema", "schema.json"]);

    assert!(!output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("✓ Sample"));
    assert!(stdout.contains("✗ Broken"));
}

// =============================================================================
// check-manifest
// =============================================================================

#[test]
fn check_manifest___valid_manifest___succeeds() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("structgen.toml"),
        "[generator]\nnamespace = \"app\"\n",
    )
    .unwrap();

    let output = structgen(dir.path(), &["check-manifest"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("✓ Namespace: app"));
}

#[test]
fn check_manifest___reserved_namespace___exits_non_zero() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("structgen.toml"),
        "[generator]\nnamespace = \"app::std\"\n",
    )
    .unwrap();

    let output = structgen(dir.path(), &["check-manifest"]);

    assert!(!output.status.success());
}

#[test]
fn check_manifest___missing_file___exits_non_zero() {
    let dir = TempDir::new().unwrap();

    let output = structgen(dir.path(), &["check-manifest"]);

    assert!(!output.status.success());
}
