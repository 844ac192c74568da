use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_displays_usage() {
    Command::cargo_bin("rowpick")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn missing_file_fails() {
    Command::cargo_bin("rowpick")
        .expect("binary exists")
        .arg("does-not-exist.csv")
        .assert()
        .failure();
}
