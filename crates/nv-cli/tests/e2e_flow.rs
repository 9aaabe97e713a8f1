//! End-to-end integration tests for the CLI against a temp store.
//!
//! These drive the compiled binary: onboarding → goal edits → history →
//! plan tracking errors → clear. Gateway-backed commands (`analyze`,
//! `workout generate`) are only exercised up to their local failure paths;
//! nothing here talks to the network.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn nv_binary() -> String {
    env!("CARGO_BIN_EXE_nv").to_string()
}

/// Writes a config file pointing at a database inside the temp directory.
fn write_config(temp: &Path) -> std::path::PathBuf {
    let config_file = temp.join("config.toml");
    let db_file = temp.join("nv.db");
    std::fs::write(
        &config_file,
        format!(r#"database_path = "{}""#, db_file.display()),
    )
    .unwrap();
    config_file
}

fn nv(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(nv_binary())
        .env_remove("NV_API_KEY")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run nv")
}

#[test]
fn init_computes_and_reports_targets() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = nv(
        &config,
        &[
            "init",
            "--name",
            "Ana",
            "--weight",
            "70",
            "--objective",
            "hypertrophy",
        ],
    );
    assert!(
        output.status.success(),
        "init should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2240 kcal"), "unexpected output: {stdout}");
    assert!(stdout.contains("278g carbs"), "unexpected output: {stdout}");
}

#[test]
fn status_reflects_onboarding() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let before = nv(&config, &["status"]);
    assert!(before.status.success());
    assert!(String::from_utf8_lossy(&before.stdout).contains("profile:  none"));

    let init = nv(&config, &["init", "--name", "Ana", "--weight", "82"]);
    assert!(init.status.success());

    let after = nv(&config, &["status"]);
    let stdout = String::from_utf8_lossy(&after.stdout);
    assert!(stdout.contains("Ana"), "unexpected output: {stdout}");
    assert!(stdout.contains("entries:  0"), "unexpected output: {stdout}");
    assert!(stdout.contains("plan:     none"), "unexpected output: {stdout}");
}

#[test]
fn goal_edits_coerce_bad_numbers_to_zero() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let init = nv(&config, &["init", "--name", "Ana", "--weight", "70"]);
    assert!(init.status.success());

    let set = nv(
        &config,
        &[
            "goals",
            "set",
            "--calories",
            "1800",
            "--protein",
            "not-a-number",
        ],
    );
    assert!(
        set.status.success(),
        "goal edits must not reject bad input: {}",
        String::from_utf8_lossy(&set.stderr)
    );

    let show = nv(&config, &["goals", "show", "--json"]);
    let payload: serde_json::Value =
        serde_json::from_slice(&show.stdout).expect("goals show --json should emit JSON");
    assert_eq!(payload["calories"], 1800);
    assert_eq!(payload["protein_g"], 0);
}

#[test]
fn history_starts_empty_and_today_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let history = nv(&config, &["history"]);
    assert!(history.status.success());
    assert!(String::from_utf8_lossy(&history.stdout).contains("no entries logged"));

    // Without onboarding, today falls back to the stock targets
    let today = nv(&config, &["today", "--json"]);
    assert!(today.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&today.stdout).unwrap();
    assert_eq!(payload["goals"]["calories"], 2000);
    assert_eq!(payload["totals"]["meals"], 0);
}

#[test]
fn analyze_without_api_key_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let image = temp.path().join("meal.jpg");
    std::fs::write(&image, b"not-a-real-jpeg").unwrap();

    let output = nv(&config, &["analyze", image.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key"), "unexpected stderr: {stderr}");

    // Nothing was persisted
    let history = nv(&config, &["history"]);
    assert!(String::from_utf8_lossy(&history.stdout).contains("no entries logged"));
}

#[test]
fn workout_toggle_requires_a_plan() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = nv(&config, &["workout", "toggle", "0", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no active plan"), "unexpected stderr: {stderr}");
}

#[test]
fn clear_requires_confirmation() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let refused = nv(&config, &["clear"]);
    assert!(!refused.status.success());
    assert!(String::from_utf8_lossy(&refused.stderr).contains("--yes"));

    let confirmed = nv(&config, &["clear", "--yes"]);
    assert!(confirmed.status.success());
    assert!(String::from_utf8_lossy(&confirmed.stdout).contains("removed 0 entries"));
}

#[test]
fn reset_wipes_the_profile() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let init = nv(&config, &["init", "--name", "Ana"]);
    assert!(init.status.success());

    let reset = nv(&config, &["reset", "--yes"]);
    assert!(reset.status.success());

    let status = nv(&config, &["status"]);
    assert!(String::from_utf8_lossy(&status.stdout).contains("profile:  none"));
}

#[test]
fn separate_users_have_separate_ledgers() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let init_a = nv(&config, &["--user", "ana", "init", "--name", "Ana"]);
    assert!(init_a.status.success());

    let status_b = nv(&config, &["--user", "bruno", "status"]);
    let stdout = String::from_utf8_lossy(&status_b.stdout);
    assert!(stdout.contains("profile:  none"), "unexpected output: {stdout}");

    let status_a = nv(&config, &["--user", "ana", "status"]);
    assert!(String::from_utf8_lossy(&status_a.stdout).contains("Ana"));
}
