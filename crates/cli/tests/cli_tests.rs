//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "matcher-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("volunteer suitability"),
        "Should show app description"
    );
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("retrain"), "Should show retrain command");
    assert!(stdout.contains("info"), "Should show info command");
    assert!(stdout.contains("health"), "Should show health command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "matcher-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("matcher"), "Should show binary name");
}

/// Test predict subcommand help lists the volunteer and project flags
#[test]
fn test_predict_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "matcher-cli", "--", "predict", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "predict help should succeed");
    assert!(stdout.contains("--reliability"), "Should show reliability flag");
    assert!(stdout.contains("--required-hours"), "Should show required hours flag");
}
