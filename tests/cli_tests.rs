//! CLI integration tests
//!
//! These exercise argument handling and the pre-session layout checks; they
//! never reach the audio devices because the reference track is absent.

use assert_cmd::Command;
use predicates::prelude::*;

fn playrec() -> Command {
    let mut cmd = Command::cargo_bin("playrec").unwrap();
    // Keep the test hermetic: no user config file
    cmd.env("XDG_CONFIG_HOME", "/nonexistent");
    cmd.env("HOME", "/nonexistent");
    cmd
}

#[test]
fn help_describes_the_tool() {
    playrec()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reference track"))
        .stdout(predicate::str::contains("--sample-rate"));
}

#[test]
fn missing_reference_track_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();

    playrec()
        .args(["-C", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("reference track not found"))
        .stderr(predicate::str::contains("audioFile.wav"));
}

#[test]
fn missing_track_performs_no_recording_io() {
    let dir = tempfile::tempdir().unwrap();

    playrec()
        .args(["-C", dir.path().to_str().unwrap(), "-o", "take.wav"])
        .assert()
        .failure();

    assert!(!dir.path().join("take.wav").exists());
}

#[test]
fn working_directory_is_created_if_missing() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("bucket/recorder");

    playrec()
        .args(["-C", nested.to_str().unwrap()])
        .assert()
        .failure(); // still no reference track, but the directory appears

    assert!(nested.is_dir());
}

#[test]
fn invalid_sample_rate_is_rejected_by_clap() {
    playrec()
        .args(["--sample-rate", "fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
