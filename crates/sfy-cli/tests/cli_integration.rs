//! CLI Integration Tests
//!
//! These tests run the `sfy` binary and check argument handling and error
//! reporting. None of them need a running data hub.
//!
//! ```
//! cargo test --package sfy-cli --test cli_integration
//! ```

use std::path::Path;
use std::process::{Command, Output};

/// Run sfy with a clean environment: no hub configured and no config file.
fn run_sfy_in(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sfy"))
        .args(args)
        .env_remove("SFY_SERVER")
        .env_remove("SFY_READ_TOKEN")
        .env_remove("SFY_LOG")
        .env_remove("SFY_STYLE")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .output()
        .expect("Failed to run sfy binary")
}

fn run_sfy(args: &[&str]) -> Output {
    let home = tempfile::tempdir().expect("Failed to create temp dir");
    run_sfy_in(home.path(), args)
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let output = run_sfy(&["--help"]);

    assert!(output.status.success(), "Help should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sfy"), "Help should mention sfy");
    for cmd in ["list", "json", "log", "track", "axl"] {
        assert!(stdout.contains(cmd), "Help should list {} command", cmd);
    }
    assert!(stdout.contains("--log"), "Help should list --log");
}

#[test]
fn test_version_command() {
    let output = run_sfy(&["--version"]);

    assert!(output.status.success(), "Version should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sfy"), "Version should contain sfy");
}

#[test]
fn test_subcommand_help() {
    let subcommands: [&[&str]; 8] = [
        &["list"],
        &["json"],
        &["log"],
        &["track", "map"],
        &["track", "csv"],
        &["axl", "ts"],
        &["config"],
        &["completions"],
    ];

    for cmd in subcommands {
        let mut args = cmd.to_vec();
        args.push("--help");
        let output = run_sfy(&args);

        assert!(output.status.success(), "{:?} --help should succeed", cmd);

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.is_empty(), "{:?} --help should produce output", cmd);
    }
}

#[test]
fn test_track_map_help_lists_options() {
    let output = run_sfy(&["track", "map", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    for opt in ["--fast", "--start", "--end", "--margins", "--save"] {
        assert!(stdout.contains(opt), "track map should accept {}", opt);
    }
}

// =============================================================================
// Argument Validation
// =============================================================================

#[test]
fn test_invalid_date_rejected() {
    let output = run_sfy(&["log", "WAVEBUG01", "--start", "yesterday"]);

    assert!(!output.status.success(), "Invalid date should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid date"), "Should explain the date format");
}

#[test]
fn test_invalid_margins_rejected() {
    let output = run_sfy(&["track", "map", "WAVEBUG01", "--margins", "0.5"]);

    assert!(!output.status.success(), "Invalid margins should fail");
}

#[test]
fn test_missing_dev_rejected() {
    let output = run_sfy(&["json"]);

    assert!(!output.status.success(), "json without arguments should fail");
}

// =============================================================================
// Hub Errors
// =============================================================================

#[test]
fn test_missing_server() {
    let output = run_sfy(&["list"]);

    assert!(!output.status.success(), "list without a hub should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SFY_SERVER"),
        "Should explain how to configure the hub"
    );
}

#[test]
fn test_unreachable_server() {
    let output = run_sfy(&["--server", "http://127.0.0.1:9", "list"]);

    assert!(!output.status.success(), "Unreachable hub should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to list buoys"),
        "Should report the failed request"
    );
}

#[test]
fn test_invalid_server_url() {
    let output = run_sfy(&["--server", "wavebug.met.no", "list"]);

    assert!(!output.status.success(), "Invalid hub URL should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid URL"), "Should report the bad URL");
}

// =============================================================================
// Config Commands
// =============================================================================

#[test]
fn test_config_path() {
    let output = run_sfy(&["config", "path"]);

    assert!(output.status.success(), "Config path should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(".toml"), "Should show config path");
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().expect("Failed to create temp dir");

    let output = run_sfy_in(home.path(), &["config", "set", "server", "http://localhost:3000"]);
    assert!(output.status.success(), "Config set should succeed");

    let output = run_sfy_in(home.path(), &["config", "get", "server"]);
    assert!(output.status.success(), "Config get should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "http://localhost:3000");
}

#[test]
fn test_completions() {
    let output = run_sfy(&["completions", "bash"]);

    assert!(output.status.success(), "Completions should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sfy"), "Completions should mention sfy");
}
