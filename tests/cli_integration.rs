//! CLI integration tests for the `jsonv` binary.
//!
//! Exercises the binary as a subprocess through `std::process::Command`,
//! covering the parse/stringify/binarize/unbinarize/info commands end
//! to end against real files, plus exit codes for malformed input.

use std::path::PathBuf;
use std::process::{Command, Output};

fn jsonv() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jsonv"))
}

fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    jsonv().args(args).output().expect("jsonv should run")
}

#[test]
fn parse_reports_ok_for_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.json", r#"{"a":1,"b":[1,2,3]}"#);
    let out = run(&["parse", input.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("object"));
}

#[test]
fn parse_fails_on_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "bad.json", r#"{"a": }"#);
    let out = run(&["parse", input.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(!out.stderr.is_empty());
}

#[test]
fn stringify_canonicalizes_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.json", r#"{"b":1,"a":2}"#);
    let output = dir.path().join("out.json");
    let status = jsonv()
        .args(["stringify", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, r#"{"a":2,"b":1}"#);
}

#[test]
fn binarize_then_unbinarize_round_trips_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.json", r#"{"nums":[1,2,3],"name":"hi"}"#);
    let bin_path = dir.path().join("out.bin");
    let status = jsonv()
        .args(["binarize", input.to_str().unwrap(), "-o", bin_path.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(std::fs::metadata(&bin_path).unwrap().len() > 0);

    let json_path = dir.path().join("roundtrip.json");
    let status = jsonv()
        .args(["unbinarize", bin_path.to_str().unwrap(), "-o", json_path.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());

    let original = jsonvalue::parse(&std::fs::read_to_string(&input).unwrap()).unwrap();
    let round_tripped = jsonvalue::parse(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(original, round_tripped);
}

#[test]
fn info_auto_detects_text_and_binary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.json", r#"{"a":1,"b":2,"c":3}"#);
    let out = run(&["info", input.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Format: text"));
    assert!(stdout.contains("Type: object"));
    assert!(stdout.contains("Keys: 3"));

    let bin_path = dir.path().join("in.bin");
    assert!(jsonv()
        .args(["binarize", input.to_str().unwrap(), "-o", bin_path.to_str().unwrap()])
        .status()
        .unwrap()
        .success());
    let out = run(&["info", bin_path.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Format: binary"));
}

#[test]
fn missing_input_file_fails_cleanly() {
    let out = run(&["parse", "/nonexistent/path/does-not-exist.json"]);
    assert!(!out.status.success());
}

#[test]
fn completions_prints_a_script() {
    let out = run(&["completions", "bash"]);
    assert!(out.status.success());
    assert!(!out.stdout.is_empty());
}
