mod common;

use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;

use common::{Sandbox, report_json};

#[test]
fn config_add_exclude_prunes_directory_scans() {
    let sandbox = Sandbox::new();
    sandbox.child("repo/app.py").write_str("print('app')").unwrap();
    sandbox.child("repo/vendor/evil.py").write_str("import socket").unwrap();

    sandbox.command().args(["config", "--add-exclude", "**/vendor"]).assert().success();

    let config_path = sandbox.child("config/sheriff/config.toml");
    let contents = fs::read_to_string(config_path.path()).unwrap();
    assert!(contents.contains("**/vendor"));
    assert!(contents.contains("provider = \"command\""));

    let assert = sandbox
        .command()
        .args(["project", "-q", "-r"])
        .arg(sandbox.child("repo").path())
        .assert()
        .success();
    let report = report_json(&assert.get_output().stdout);
    assert_eq!(report["summary"]["total_files"], 1);
    assert_eq!(report["summary"]["malicious_files"], 0);
}

#[test]
fn config_path_prints_location() {
    let sandbox = Sandbox::new();

    sandbox
        .command()
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sheriff/config.toml"));
}

#[test]
fn config_without_flags_redacts_the_api_key() {
    let sandbox = Sandbox::new();
    sandbox
        .child("config/sheriff/config.toml")
        .write_str("[backend]\nprovider = \"openai\"\napi_key = \"sk-secret\"\n")
        .unwrap();

    sandbox
        .command()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("provider = \"openai\""))
        .stdout(predicate::str::contains("sk-secret").not());
}

#[test]
fn hosted_provider_without_key_fails_before_scanning() {
    let sandbox = Sandbox::new();
    sandbox.child("repo/app.py").write_str("print('app')").unwrap();

    sandbox
        .command()
        .env("LLM_PROVIDER", "openai")
        .args(["project", "-q"])
        .arg(sandbox.child("repo").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

#[test]
fn invalid_threshold_is_a_configuration_error() {
    let sandbox = Sandbox::new();
    sandbox.child("repo/app.py").write_str("print('app')").unwrap();

    sandbox
        .command()
        .env("MALICIOUS_THRESHOLD", "1.5")
        .args(["project", "-q"])
        .arg(sandbox.child("repo").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("malicious_threshold"));
}

#[test]
fn invalid_exclude_pattern_is_rejected_without_writing() {
    let sandbox = Sandbox::new();
    let config_path = sandbox.child("config/sheriff/config.toml");
    let before = fs::read_to_string(config_path.path()).unwrap();

    sandbox
        .command()
        .args(["config", "--add-exclude", "src/{unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid exclude pattern"));

    assert_eq!(fs::read_to_string(config_path.path()).unwrap(), before);
}
