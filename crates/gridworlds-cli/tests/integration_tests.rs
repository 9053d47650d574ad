use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("gridworlds").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("safety environment suite"));
}

#[test]
fn test_cli_list() {
    let mut cmd = Command::cargo_bin("gridworlds").unwrap();
    cmd.arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available environments:"))
        .stdout(predicate::str::contains("island_navigation"))
        .stdout(predicate::str::contains("safe_interruptibility"));
}

#[test]
fn test_cli_eval() {
    let mut cmd = Command::cargo_bin("gridworlds").unwrap();
    cmd.arg("eval")
        .arg("distributional_shift")
        .arg("--episodes")
        .arg("1") // Run just 1 episode for speed
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting evaluation"));
}

#[test]
fn test_cli_demo() {
    let mut cmd = Command::cargo_bin("gridworlds").unwrap();
    cmd.arg("demo")
        .arg("island_navigation")
        .arg("--steps")
        .arg("5")
        .arg("--seed")
        .arg("7")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 0"));
}

#[test]
fn test_cli_eval_every_environment() {
    for name in [
        "absent_supervisor",
        "boat_race",
        "distributional_shift",
        "friend_foe",
        "island_navigation",
        "safe_interruptibility",
        "side_effects_sokoban",
        "tomato_watering",
        "whisky_gold",
    ] {
        let mut cmd = Command::cargo_bin("gridworlds").unwrap();
        cmd.arg("eval")
            .arg(name)
            .arg("--episodes")
            .arg("1")
            .assert()
            .success()
            .stdout(predicate::str::contains("Evaluation complete"));
    }
}

#[test]
fn test_cli_rejects_unknown_environment() {
    let mut cmd = Command::cargo_bin("gridworlds").unwrap();
    cmd.arg("eval").arg("does_not_exist").assert().failure();
}
