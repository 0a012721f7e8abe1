//! Basic CLI E2E tests.
//!
//! Each test runs the compiled binary against its own temporary HOME so the
//! real config directory is never touched.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_studygoal-cli"));
    cmd.env("HOME", home.path()).env_remove("STUDYGOAL_ENV");
    cmd
}

/// Run a CLI command and return (stdout, stderr, code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = cli(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");
    split(output)
}

/// Run a CLI command with `input` piped to stdin.
fn run_cli_with_input(home: &TempDir, args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = cli(home)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    // Dropping the handle closes stdin so the session sees EOF.
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    split(child.wait_with_output().unwrap())
}

fn split(output: Output) -> (String, String, i32) {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}

#[test]
fn test_config_path_under_home() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with(".config/studygoal/config.toml"));
    assert!(stdout.contains(&*home.path().to_string_lossy()));
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "get", "goal.default_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "120");
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "set", "sequence.preparation_secs", "5"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(&home, &["config", "get", "sequence.preparation_secs"]);
    assert_eq!(stdout.trim(), "5");

    let (_, _, code) = run_cli(&home, &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&home, &["config", "get", "sequence.preparation_secs"]);
    assert_eq!(stdout.trim(), "10");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(&home, &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, stderr, code) = run_cli(&home, &["config", "set", "notifications.bell", "loud"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["goal"]["default_minutes"], 120);
    assert_eq!(parsed["ticker"]["interval_ms"], 1000);
}

#[test]
fn test_goal_session_commands() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_input(
        &home,
        &["goal", "--json", "--minutes", "45"],
        "f\ng 30\nq\n",
    );
    assert_eq!(code, 0);

    let snaps = json_lines(&stdout);
    assert_eq!(snaps.first().unwrap()["goal_secs"], 45 * 60);
    let last = snaps.last().unwrap();
    assert_eq!(last["goal_secs"], 30 * 60);
    assert_eq!(last["focused"], true);
    assert_eq!(last["running"], false);
}

#[test]
fn test_goal_session_ends_on_eof() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_input(&home, &["goal"], "s\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("session: total"));
}

#[test]
fn test_sequence_session_adds_subjects() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli_with_input(
        &home,
        &["sequence", "--json", "--subject", "Math:25"],
        "a English:30\na :10\nq\n",
    );
    assert_eq!(code, 0);
    assert!(stderr.contains("cannot add subject"));

    let snaps = json_lines(&stdout);
    let last = snaps.last().unwrap();
    assert_eq!(last["subjects"].as_array().unwrap().len(), 2);
    assert_eq!(last["subjects"][1]["name"], "English");
    assert_eq!(last["phase"], "idle");
}

#[test]
fn test_sequence_start_counts_first_subject() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_input(
        &home,
        &["sequence", "--json", "--start", "--subject", "Physics:2"],
        "q\n",
    );
    assert_eq!(code, 0);
    let snaps = json_lines(&stdout);
    assert_eq!(snaps[0]["phase"], "counting");
    assert_eq!(snaps[0]["current_subject"], "Physics");
}

#[test]
fn test_sequence_rejects_invalid_subject_arg() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(&home, &["sequence", "--subject", "Math:zero"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not a whole number"));
}

#[test]
fn test_sequence_announces_expiry_once() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(&home, &["config", "set", "ticker.interval_ms", "1"]);
    assert_eq!(code, 0);

    let mut child = cli(&home)
        .args(["sequence", "--start", "--subject", "A:1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    // 60 pulses for the subject plus 10 for preparation, at 1ms each.
    let stdin = child.stdin.take().unwrap();
    thread::sleep(Duration::from_millis(500));
    drop(stdin);
    let (stdout, _, code) = split(child.wait_with_output().unwrap());

    assert_eq!(code, 0);
    assert_eq!(stdout.matches("Time is up: A").count(), 1);
    assert!(stdout.contains('\u{7}'));
    assert!(stdout.contains("[done] all 1 subjects finished"));
    // Draining the alert must not render the same state a second time.
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.windows(2).all(|pair| pair[0] != pair[1]), "{stdout}");
}
