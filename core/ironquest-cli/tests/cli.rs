//! End-to-end runs of the `ironquest` binary against an isolated storage root.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn ironquest(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ironquest"))
        .args(args)
        .env("IRONQUEST_HOME", root)
        .env("IRONQUEST_SYNC", "journal")
        // Nothing listens on port 9; lookups fail fast.
        .env("IRONQUEST_API_URL", "http://127.0.0.1:9")
        .env_remove("IRONQUEST_DEBUG_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run ironquest")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn set_persists_between_runs() {
    let temp = TempDir::new().unwrap();

    let set = ironquest(temp.path(), &["params", "set", "name", "Zezima"]);
    assert!(set.status.success(), "{:?}", set);
    let set = ironquest(temp.path(), &["params", "set", "questPriorities[12]", "HIGH"]);
    assert!(set.status.success(), "{:?}", set);

    let show = ironquest(temp.path(), &["params", "show", "--json"]);
    assert!(show.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&show)).unwrap();
    assert_eq!(value["name"], "Zezima");
    assert_eq!(value["questPriorities"]["12"], "HIGH");

    let stored = std::fs::read_to_string(temp.path().join("parameters.json")).unwrap();
    assert!(stored.contains("Zezima"));
}

#[test]
fn reset_restores_defaults() {
    let temp = TempDir::new().unwrap();
    ironquest(temp.path(), &["params", "set", "ironman", "true"]);

    let reset = ironquest(temp.path(), &["params", "reset"]);
    assert!(reset.status.success());

    let show = ironquest(temp.path(), &["params", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout(&show)).unwrap();
    assert_eq!(value["ironman"], false);
    assert_eq!(value["name"], "");
}

#[test]
fn unknown_field_fails() {
    let temp = TempDir::new().unwrap();
    let output = ironquest(temp.path(), &["params", "set", "nickname", "x"]);
    assert!(!output.status.success());
}

#[test]
fn failed_lookup_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    ironquest(temp.path(), &["params", "set", "name", "Zezima"]);

    let output = ironquest(temp.path(), &["find-path"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Path lookup failed"));
}
