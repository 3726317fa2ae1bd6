mod common;

use std::path::Path;
use std::process::{Command, Stdio};

use assert_fs::prelude::*;
use predicates::prelude::*;

use common::{Sandbox, report_json};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com", "-c", "commit.gpgsign=false"])
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("git runs");
    assert!(status.success(), "git {:?} failed", args);
}

/// `main` holds hello.py and gone.py; `feature` adds evil.py and odd.js, edits hello.py, deletes gone.py.
fn seed_repository(sandbox: &Sandbox) -> assert_fs::fixture::ChildPath {
    let repo = sandbox.child("repo");
    repo.create_dir_all().unwrap();
    git(repo.path(), &["init", "-q"]);
    git(repo.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    repo.child("hello.py").write_str("print('hi')\n").unwrap();
    repo.child("gone.py").write_str("print('bye')\n").unwrap();
    git(repo.path(), &["add", "."]);
    git(repo.path(), &["commit", "-q", "-m", "initial"]);

    git(repo.path(), &["checkout", "-q", "-b", "feature"]);
    repo.child("evil.py").write_str("import socket\n").unwrap();
    repo.child("odd.js").write_str("eval(atob(x))\n").unwrap();
    repo.child("hello.py").write_str("print('hello')\n").unwrap();
    git(repo.path(), &["rm", "-q", "gone.py"]);
    git(repo.path(), &["add", "."]);
    git(repo.path(), &["commit", "-q", "-m", "feature work"]);
    repo
}

#[test]
fn changed_files_are_scanned_and_deleted_ones_dropped() {
    if !git_available() {
        return;
    }
    let sandbox = Sandbox::new();
    let repo = seed_repository(&sandbox);

    let assert = sandbox
        .command()
        .args(["changes", "-q"])
        .arg(repo.path())
        .args(["feature", "main"])
        .assert()
        .success();
    let report = report_json(&assert.get_output().stdout);

    assert_eq!(report["summary"]["total_files"], 3);
    assert_eq!(report["summary"]["malicious_files"], 1);
    assert_eq!(report["summary"]["suspicious_files"], 1);
    assert_eq!(report["summary"]["clean_files"], 1);
    assert_eq!(report["summary"]["error_files"], 0);
}

#[test]
fn identical_branches_yield_an_empty_report() {
    if !git_available() {
        return;
    }
    let sandbox = Sandbox::new();
    let repo = seed_repository(&sandbox);

    sandbox
        .command()
        .args(["gitlab", "-q"])
        .arg(repo.path())
        .args(["main", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_files\": 0"))
        .stdout(predicate::str::contains("No files changed in this merge request"));
}

#[test]
fn unknown_branch_is_a_top_level_error() {
    if !git_available() {
        return;
    }
    let sandbox = Sandbox::new();
    let repo = seed_repository(&sandbox);

    sandbox
        .command()
        .args(["changes", "-q"])
        .arg(repo.path())
        .args(["no-such-branch", "main"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to resolve changed files"))
        .stdout(predicate::str::contains("summary").not());
}
