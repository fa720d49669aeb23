use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bftape").unwrap() }

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then [] spins forever
}

#[test]
fn step_limit_flag_aborts_infinite_loop() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env_remove("BFTAPE_TIMEOUT_MS")
        .args(["--max-steps", "50", "--code", infinite_bf()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn step_limit_env_is_respected() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env("BFTAPE_MAX_STEPS", "10")
        .args(["--code", infinite_bf()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (10)"));
}

#[test]
fn timeout_flag_aborts_infinite_loop() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env_remove("BFTAPE_MAX_STEPS")
        .args(["--timeout", "100", "--code", infinite_bf()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Execution aborted").and(predicate::str::contains("timeout")));
}

#[test]
fn flag_overrides_env_limit() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env("BFTAPE_MAX_STEPS", "10")
        .args(["--max-steps", "20", "--code", infinite_bf()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (20)"));
}
