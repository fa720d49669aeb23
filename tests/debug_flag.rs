// Verifies that --debug prints a step-by-step table instead of executing.
use predicates::prelude::*;

#[test]
fn debug_flag_prints_table() {
    let mut cmd = assert_cmd::Command::cargo_bin("bftape")
        .expect("failed to locate bftape binary");

    cmd.args(["--debug", "--code", "<"])
        .assert()
        .success()
        .stdout(predicates::str::contains("STEP | IP")
            .and(predicates::str::contains("Moved pointer to index 29999"))
        );
}

#[test]
fn debug_flag_does_not_read_stdin() {
    let mut cmd = assert_cmd::Command::cargo_bin("bftape")
        .expect("failed to locate bftape binary");

    cmd.args(["-d", "--code", ",."])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicates::str::contains("simulated 0"))
        .stderr(predicate::str::is_empty());
}
