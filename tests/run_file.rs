use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("bftape").unwrap() }

fn program_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::Builder::new().suffix(".bf").tempfile().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn char_mode_prints_character_then_done() {
    let tf = program_file("++.");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{2}\nDone!\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn numeric_mode_prints_decimal() {
    let tf = program_file("++.");
    cargo_bin()
        .args(["--mode", "numeric"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout("2\nDone!\n");
}

#[test]
fn comments_in_program_file_are_ignored() {
    let tf = program_file("print A (65 is 8 times 8 plus 1)\n++++++++[>++++++++<-]>+.\n");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("A\nDone!"));
}

#[test]
fn positional_tape_length_is_honored() {
    // On a 2-cell tape, two moves right land back on cell 0.
    let tf = program_file("+>>+.");
    cargo_bin()
        .args(["-m", "num"])
        .arg(tf.path())
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2\n"));
}

#[test]
fn inline_code_runs_without_a_file() {
    cargo_bin()
        .args(["--mode", "numeric", "--code", "-."])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("255\n"));
}

#[test]
fn inline_code_accepts_positional_tape_length() {
    // Two moves right on a 2-cell tape come back to cell 0.
    cargo_bin()
        .args(["-m", "num", "--code", "+>>+.", "2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2\n"));
}

#[test]
fn inline_code_with_program_path_is_a_usage_error() {
    cargo_bin()
        .args(["--code", "+.", "prog.bf"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn wrong_extension_is_rejected() {
    let mut tf = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(tf, "+.").unwrap();
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid path or file given"));
}

#[test]
fn missing_program_prints_usage() {
    cargo_bin()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn zero_length_tape_is_rejected() {
    cargo_bin()
        .args(["--tape-len", "0", "--code", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least one cell"));
}
