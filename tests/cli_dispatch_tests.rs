use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_habitquest")
}

fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("habitquest-{name}-{stamp}.{extension}"))
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(bin())
        .args(args)
        .env_remove("HABITQUEST_CONFIG")
        .output()
        .expect("binary should run")
}

#[test]
fn battle_command_emits_report_json() {
    let output = run(&["battle", "goblin_cave", "normal", "11", "10"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("battle should emit json");
    let outcome = payload["outcome"].as_str().expect("outcome should be a string");
    assert!(outcome == "victory" || outcome == "defeat");
    assert!(payload["turns"].as_u64().unwrap_or(0) >= 1);
    assert!(!payload["messages"].as_array().map(Vec::is_empty).unwrap_or(true));
    assert_eq!(payload["messages"][0]["type"], "start");
}

#[test]
fn battle_command_resolves_display_names() {
    let output = run(&["battle", "Goblin Cave"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn battle_command_exports_csv() {
    let output = run(&["battle", "goblin_cave", "normal", "3", "10", "--csv"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("turn,type,timestamp,text"));
    assert!(stdout.lines().count() > 2);
}

#[test]
fn battle_command_rejects_unknown_dungeon() {
    let output = run(&["battle", "moon_base"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown dungeon 'moon_base'"));
    assert!(stderr.contains("goblin_cave"));
}

#[test]
fn battle_command_returns_usage_without_dungeon() {
    let output = run(&["battle"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: habitquest battle"));
}

#[test]
fn no_command_prints_usage() {
    let output = run(&[]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: habitquest"));
}

#[test]
fn loot_command_emits_item_array() {
    let output = run(&["loot", "weapon", "20", "5", "3"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("loot should emit json");
    let items = payload.as_array().expect("loot should emit an array");
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item["type"] == "weapon"));
}

#[test]
fn loot_command_rejects_unknown_type() {
    let output = run(&["loot", "potion"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn energy_command_reports_timers() {
    // 15 minutes after an empty bar: three ticks restored.
    let output = run(&["energy", "0", "1700000000000", "1700000900000"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("energy should emit json");
    assert_eq!(payload["energy"]["current"], 30);
    assert_eq!(payload["nextRegenSecs"], 300);
    assert!(payload["ticketResetSecs"].as_i64().is_some_and(|s| s > 0 && s <= 86_400));
}

#[test]
fn energy_command_returns_usage_without_args() {
    let output = run(&["energy"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn simulate_command_emits_one_result_per_scenario() {
    let output = run(&["simulate", "goblin_cave", "10", "5", "normal", "--workers", "2"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("simulate should emit json");
    let results = payload.as_array().expect("simulate should emit an array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["label"], "basic");
    assert_eq!(results[0]["iterations"], 10);
    assert!(results[1]["winRate"].is_number());
}

#[test]
fn validate_command_passes_on_builtin_data() {
    let output = run(&["validate"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn validate_command_reports_bad_config() {
    let path = unique_temp_path("bad-config", "yaml");
    fs::write(&path, "energy:\n  regenIntervalSecs: 0\n").expect("temp config should be writable");

    let output = run(&["validate", path.to_str().expect("temp path should be utf-8")]);
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed: 1 issue(s)"));
    assert!(stderr.contains("regenIntervalSecs"));
}
