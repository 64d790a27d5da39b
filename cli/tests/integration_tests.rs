use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

fn write_spec(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write declaration");
    path
}

/// Declaration used by most tests.
fn convert_spec(dir: &Path) -> PathBuf {
    write_spec(
        dir,
        "convert.yaml",
        r#"program: convert
description: Convert documents.
options:
  - short: v
    long: verbose
    kind: flag
  - short: f
    long: format
    kind: selector
    choices: [json, yaml]
    required: true
    help: Output format
  - long: tag
    kind: list
"#,
    )
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_argbind"))
        .args(args)
        .env_remove("ARGBIND_LOG")
        .output()
        .expect("failed to run argbind")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_bound_values_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let spec = convert_spec(dir.path());

    let out = run(&[
        "parse",
        "--spec",
        spec.to_str().unwrap(),
        "--",
        "-v",
        "--tag",
        "a",
        "-f",
        "yaml",
        "--tag",
        "b",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["program"], "convert");
    assert_eq!(json["values"]["--verbose"], true);
    assert_eq!(json["values"]["--format"], "yaml");
    assert_eq!(json["values"]["--tag"], serde_json::json!(["a", "b"]));
    assert!(json.get("remaining").is_none());
}

#[test]
fn parse_yaml_output() {
    let dir = tempfile::tempdir().unwrap();
    let spec = convert_spec(dir.path());

    let out = run(&[
        "parse",
        "--spec",
        spec.to_str().unwrap(),
        "--format",
        "yaml",
        "--",
        "-f",
        "json",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let yaml: serde_yaml::Value = serde_yaml::from_str(&stdout(&out)).unwrap();
    assert_eq!(yaml["program"], "convert");
    assert_eq!(yaml["values"]["--format"], "json");
    assert_eq!(yaml["values"]["--verbose"], false);
}

#[test]
fn parse_help_prints_usage_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let spec = convert_spec(dir.path());

    let out = run(&["parse", "--spec", spec.to_str().unwrap(), "--", "-v", "--help"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with(
        "usage: convert [-h|--help] [-v|--verbose] -f|--format (json|yaml) [--tag \"<string>\"]\n"
    ));
    assert!(text.contains("Convert documents."));
    assert!(text.contains("Output format"));
    assert!(!text.contains("\"values\""));
}

#[test]
fn parse_reports_binding_errors() {
    let dir = tempfile::tempdir().unwrap();
    let spec = convert_spec(dir.path());

    let out = run(&["parse", "--spec", spec.to_str().unwrap(), "--", "-f", "xml"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("bad value for [-f|--format]. Allowed values are [json yaml]"));

    let out = run(&["parse", "--spec", spec.to_str().unwrap(), "--", "-v"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("[-f|--format] is required"));
}

#[test]
fn parse_unknown_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let spec = convert_spec(dir.path());
    let spec = spec.to_str().unwrap();

    let out = run(&["parse", "--spec", spec, "--", "-f", "json", "input.md"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unknown arguments input.md"));

    let out = run(&[
        "parse",
        "--spec",
        spec,
        "--allow-unknown",
        "--",
        "-f",
        "json",
        "-vq",
        "input.md",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["values"]["--verbose"], true);
    assert_eq!(json["remaining"], serde_json::json!(["-q", "input.md"]));
}

#[test]
fn parse_file_option_opens_path() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "writer.json",
        r#"{
  "program": "writer",
  "options": [
    {
      "short": "o",
      "kind": "file",
      "file": { "write": true, "create": true, "truncate": true }
    }
  ]
}"#,
    );
    let target = dir.path().join("out.txt");

    let out = run(&[
        "parse",
        "--spec",
        spec.to_str().unwrap(),
        "--",
        "-o",
        target.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(target.exists());

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["values"]["-o"], target.to_str().unwrap());
}

// ---------------------------------------------------------------------------
// usage / check
// ---------------------------------------------------------------------------

#[test]
fn usage_prints_help_screen() {
    let dir = tempfile::tempdir().unwrap();
    let spec = convert_spec(dir.path());

    let out = run(&["usage", "--spec", spec.to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Arguments:"));
    assert!(text.contains("  -f  --format   Output format"));
}

#[test]
fn check_accepts_valid_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let spec = convert_spec(dir.path());

    let out = run(&["check", "--spec", spec.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("3 option(s) OK"));
}

#[test]
fn check_rejects_invalid_declarations() {
    let dir = tempfile::tempdir().unwrap();

    let dup = write_spec(
        dir.path(),
        "dup.yaml",
        "program: p\noptions:\n  - { short: x, kind: flag }\n  - { short: x, kind: list }\n",
    );
    let out = run(&["check", "--spec", dup.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("duplicate option name: -x"));

    let kind = write_spec(
        dir.path(),
        "kind.yaml",
        "program: p\noptions:\n  - { short: n, kind: int }\n",
    );
    let out = run(&["check", "--spec", kind.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unsupported type [int]"));

    let out = run(&["check", "--spec", dir.path().join("missing.yaml").to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Failed to load"));
}
