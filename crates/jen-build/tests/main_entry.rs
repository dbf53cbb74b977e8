//! Integration tests for the `jen-build` binary entry point.
//!
//! Verifies the status lines printed around a plugin pass and the exit
//! status when the plugin directory is missing.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn plugin_pass_reports_start_and_completion() {
    let dir = TempDir::new().expect("create plugin dir");
    fs::write(dir.path().join("noop.rhai"), "fn on_build() { }\n").expect("write plugin");

    let mut command = cargo_bin_cmd!("jen-build");
    command.arg("--plugin-dir").arg(dir.path());
    command
        .assert()
        .success()
        .stdout(contains("Running plugins (build)..."))
        .stdout(contains("Plugins executed."));
}

#[test]
fn missing_plugin_directory_exits_with_failure() {
    let dir = TempDir::new().expect("create temp dir");

    let mut command = cargo_bin_cmd!("jen-build");
    command.arg("--plugin-dir").arg(dir.path().join("plugins"));
    command
        .assert()
        .failure()
        .stderr(contains("is not accessible"));
}

#[test]
fn environment_supplies_plugin_directory() {
    let dir = TempDir::new().expect("create plugin dir");

    let mut command = cargo_bin_cmd!("jen-build");
    command.env("JEN_PLUGIN_DIR", dir.path());
    command.assert().success().stdout(contains("Plugins executed."));
}
