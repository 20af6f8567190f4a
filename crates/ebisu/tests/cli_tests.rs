//! CLI argument tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("ebisu")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn version_prints_the_package_version() {
    Command::cargo_bin("ebisu")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn chat_help_documents_session_flag() {
    Command::cargo_bin("ebisu")
        .unwrap()
        .args(["chat", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--session"))
        .stdout(predicate::str::contains("--message"));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("ebisu")
        .unwrap()
        .arg("deploy")
        .assert()
        .failure();
}

#[test]
fn missing_subcommand_shows_usage() {
    Command::cargo_bin("ebisu")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
