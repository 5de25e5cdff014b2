//! End-to-end CLI integration tests for the `bd` binary.
//!
//! Each test creates its own temporary directory, initializes a beads
//! project, and exercises the `bd` binary as a subprocess via `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bd() -> Command {
    Command::cargo_bin("bd").unwrap()
}

fn init_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    bd().args(["init", "--prefix", "t", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .success();
    tmp
}

fn write_issue_md(tmp: &TempDir, filename: &str, contents: &str) {
    std::fs::write(tmp.path().join(".todo").join(filename), contents).unwrap();
}

#[test]
fn init_creates_store_and_todo_tree() {
    let tmp = TempDir::new().unwrap();
    bd().args(["init", "--prefix", "demo", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join(".beads/issues.jsonl").is_file());
    assert!(tmp.path().join(".beads/config.yaml").is_file());
    assert!(tmp.path().join(".todo").is_dir());
}

#[test]
fn init_refuses_double_init_without_force() {
    let tmp = init_project();

    bd().args(["init", "--prefix", "t", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_force_reinitializes() {
    let tmp = init_project();

    bd().args(["init", "--prefix", "t", "--force", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .success();
}

#[test]
fn build_without_init_fails() {
    let tmp = TempDir::new().unwrap();
    bd().args(["build"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn build_writes_report_to_default_location() {
    let tmp = init_project();

    bd().args(["build"]).current_dir(tmp.path()).assert().success();

    let report = std::fs::read_to_string(tmp.path().join("REPORT.md")).unwrap();
    assert!(!report.is_empty());
}

#[test]
fn build_rejects_output_path_traversal() {
    let tmp = init_project();

    bd().args(["build", "--output", "../escape.md"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn build_honors_custom_output_path() {
    let tmp = init_project();

    bd().args(["build", "--output", "out/report.md"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("out/report.md").is_file());
}

#[test]
fn sync_with_no_files_is_a_noop() {
    let tmp = init_project();

    bd().args(["sync", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"created\": []"));
}

#[test]
fn sync_imports_a_new_markdown_file_into_the_store() {
    let tmp = init_project();
    write_issue_md(
        &tmp,
        "[2026-01-01] [New task].md",
        "---\nid: t-abc12345\ntitle: New task\nstate: open\n---\n\nBody text.\n",
    );

    bd().args(["sync"]).current_dir(tmp.path()).assert().success();

    let store = std::fs::read_to_string(tmp.path().join(".beads/issues.jsonl")).unwrap();
    assert!(store.contains("t-abc12345"));
}

#[test]
fn sync_dry_run_does_not_touch_the_store() {
    let tmp = init_project();
    write_issue_md(
        &tmp,
        "[2026-01-01] [Dry run task].md",
        "---\nid: t-dryrun01\ntitle: Dry run task\nstate: open\n---\n\nBody text.\n",
    );

    bd().args(["sync", "--dry-run"]).current_dir(tmp.path()).assert().success();

    let store = std::fs::read_to_string(tmp.path().join(".beads/issues.jsonl")).unwrap();
    assert!(!store.contains("t-dryrun01"));
}

#[test]
fn sync_direction_files_to_store_does_not_write_markdown() {
    let tmp = init_project();
    write_issue_md(
        &tmp,
        "[2026-01-01] [One way].md",
        "---\nid: t-oneway01\ntitle: One way\nstate: open\n---\n\nBody text.\n",
    );

    bd().args(["sync", "--direction", "files-to-store"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let store = std::fs::read_to_string(tmp.path().join(".beads/issues.jsonl")).unwrap();
    assert!(store.contains("t-oneway01"));
}

#[test]
fn unknown_flag_exits_with_argument_error_code() {
    let tmp = init_project();

    bd().args(["sync", "--not-a-real-flag"])
        .current_dir(tmp.path())
        .assert()
        .code(1);
}

#[test]
fn no_subcommand_prints_help() {
    bd().assert().code(1).stderr(predicate::str::contains("Usage"));
}
