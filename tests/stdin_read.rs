// Exercises the ',' instruction by feeding lines on stdin.
use predicates::prelude::*;

fn make_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("bftape").expect("bftape binary")
}

#[test]
fn reads_character_and_echoes_it() {
    make_cmd()
        .args(["--code", ",."])
        .write_stdin("Z\n")
        .assert()
        .success()
        .stdout("Z\nDone!\n");
}

#[test]
fn reads_numbers_in_numeric_mode() {
    make_cmd()
        .args(["--mode", "numeric", "--code", ",+.,."])
        .write_stdin("41\n0\n")
        .assert()
        .success()
        .stdout("42 0\nDone!\n");
}

#[test]
fn multi_character_line_is_fatal() {
    make_cmd()
        .args(["--code", ",.+."])
        .write_stdin("hello\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid input given, terminated"))
        .stdout(predicate::str::contains("Done!").not());
}

#[test]
fn out_of_range_number_is_fatal() {
    make_cmd()
        .args(["-m", "numeric", "--code", ","])
        .write_stdin("300\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid input given, terminated"));
}

#[test]
fn eof_on_input_is_fatal() {
    make_cmd()
        .args(["--code", ","])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid input given"));
}
