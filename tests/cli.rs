//! End-to-end checks of the `rocks` binary's exit codes, per the
//! usage/scan/parse/runtime split documented in `lib.rs`.

use assert_cmd::Command;

#[test]
fn usage_misuse_exits_64() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("one.rocks")
        .arg("two.rocks")
        .assert()
        .code(64)
        .stderr("Usage: rocks [script]\n");
}

#[test]
fn scan_error_exits_65() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/target/errors/unexpected_character.rocks")
        .assert()
        .code(65);
}

#[test]
fn runtime_error_exits_70() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/target/errors/type_mismatch.rocks")
        .assert()
        .code(70);
}

#[test]
fn successful_run_exits_0() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/target/lang/arithmetic.rocks")
        .assert()
        .code(0);
}
