//! Smoke tests for the two binaries' command-line surface.

use assert_cmd::Command;

#[test]
fn remix_host_rejects_unknown_flags() {
    Command::cargo_bin("remix-host")
        .unwrap()
        .arg("--not-a-real-flag")
        .assert()
        .failure();
}

#[test]
fn remix_worker_requires_connect() {
    let output = Command::cargo_bin("remix-worker").unwrap().output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--connect"), "expected a missing --connect complaint, got: {stderr}");
}
