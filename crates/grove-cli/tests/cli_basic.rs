//! Basic CLI E2E tests.
//!
//! Tests invoke the built `grove` binary against an isolated data directory
//! and verify its JSON output. Every invocation rehydrates from disk.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_grove"))
        .args(args)
        .env("GROVE_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command, expect success and parse the first JSON document.
fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::Deserializer::from_str(&stdout)
        .into_iter::<Value>()
        .next()
        .expect("no JSON output")
        .expect("invalid JSON output")
}

#[test]
fn fresh_status_is_idle_focus() {
    let dir = tempfile::tempdir().unwrap();
    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["type"], "StateSnapshot");
    assert_eq!(snap["mode"], "focus");
    assert_eq!(snap["is_running"], false);
    assert_eq!(snap["remaining_ms"], 25 * 60 * 1000);
    assert_eq!(snap["session_count"], 0);
}

#[test]
fn start_survives_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(started["type"], "TimerStarted");

    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["is_running"], true);
    assert!(snap["remaining_ms"].as_u64().unwrap() <= 25 * 60 * 1000);
}

#[test]
fn second_pause_reports_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "start"]);
    let first = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(first["type"], "TimerPaused");
    let second = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(second["type"], "StateSnapshot");
    assert_eq!(second["is_running"], false);
}

#[test]
fn durations_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let changed = run_json(dir.path(), &["durations", "500", "-4"]);
    assert_eq!(changed["type"], "DurationsChanged");
    assert_eq!(changed["focus_minutes"], 120.0);
    assert_eq!(changed["break_minutes"], 1.0);
    assert_eq!(changed["applied_now"], true);

    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["remaining_ms"], 120 * 60 * 1000);
}

#[test]
fn reset_refills_interval() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["durations", "10", "2"]);
    run_json(dir.path(), &["timer", "start"]);
    let reset = run_json(dir.path(), &["timer", "reset"]);
    assert_eq!(reset["type"], "TimerReset");
    assert_eq!(reset["remaining_ms"], 10 * 60 * 1000);
}

#[test]
fn sound_preferences_persist() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["sound", "volume", "7"]);
    let muted = run_json(dir.path(), &["sound", "mute"]);
    assert_eq!(muted["type"], "AudioChanged");
    assert_eq!(muted["sound_muted"], true);
    assert_eq!(muted["volume"], 1.0);

    let ambient = run_json(dir.path(), &["sound", "ambient", "on"]);
    assert_eq!(ambient["ambient_on"], true);
    assert_eq!(ambient["sound_muted"], true);
}

#[test]
fn config_show_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = run_json(dir.path(), &["config", "show"]);
    assert_eq!(settings["engine"]["background_policy"], "reanchor");
    assert_eq!(settings["cli"]["fps"], 30);
}

#[test]
fn malformed_settings_fail_config_show() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("settings.toml"), "[engine\n").unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "show"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn watch_without_running_timer_prints_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let snap = run_json(dir.path(), &["timer", "watch"]);
    assert_eq!(snap["type"], "StateSnapshot");
}
