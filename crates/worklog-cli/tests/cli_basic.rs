//! Basic CLI smoke tests.
//!
//! Limited to help/usage surfaces so they never touch the user's data dir.

use std::process::Command;

fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_worklog"))
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_top_level_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("timer"));
    assert!(stdout.contains("stats"));
    assert!(stdout.contains("sync"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_timer_help_lists_actions() {
    let (stdout, _, code) = run_cli(&["timer", "--help"]);
    assert_eq!(code, 0);
    for action in ["start", "stop", "reset", "switch", "status", "watch"] {
        assert!(stdout.contains(action), "missing action: {action}");
    }
}

#[test]
fn test_stats_help_lists_actions() {
    let (stdout, _, code) = run_cli(&["stats", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("summary"));
    assert!(stdout.contains("timeline"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let (_, _, code) = run_cli(&["frobnicate"]);
    assert_ne!(code, 0);
}
