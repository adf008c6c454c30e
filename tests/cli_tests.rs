//! Binary-level tests: exit codes and JSON output.

mod harness;

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use harness::temp_db::TempDb;
use predicates::prelude::*;

fn write_config(db: &TempDb, contents: &str) -> PathBuf {
    let path = db.dir().join("config.toml");
    let body = format!("database = \"{}\"\n{contents}", db.path().display());
    fs::write(&path, body).expect("write temp config");
    path
}

fn regimewatch() -> Command {
    let mut cmd = Command::cargo_bin("regimewatch").expect("binary built");
    cmd.env_remove("REGIMEWATCH_DATABASE").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    regimewatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("cache"));
}

#[test]
fn missing_config_exits_with_config_status() {
    regimewatch()
        .args(["--config", "/nonexistent/regimewatch.toml", "health"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn invalid_config_names_the_field() {
    let db = TempDb::create("cli-invalid");
    let path = write_config(&db, "[fetch]\nattempt_timeout_ms = 60000\n");

    regimewatch()
        .arg("--config")
        .arg(&path)
        .arg("snapshot")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("attempt_timeout_ms"));
}

#[test]
fn cache_clear_reports_json() {
    let db = TempDb::create("cli-cache");
    let path = write_config(&db, "");

    let output = regimewatch()
        .arg("--config")
        .arg(&path)
        .args(["--json", "cache", "clear"])
        .output()
        .expect("run regimewatch");

    assert!(output.status.success());
    let line = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("json output");
    assert_eq!(value["command"], "cache.clear");
    assert_eq!(value["removed"], 0);
}

#[test]
fn health_on_fresh_database_is_empty() {
    let db = TempDb::create("cli-health");
    let path = write_config(&db, "");

    let output = regimewatch()
        .arg("--config")
        .arg(&path)
        .args(["health", "--json", "--hours", "1"])
        .output()
        .expect("run regimewatch");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["command"], "health");
    assert_eq!(value["metrics"], serde_json::json!([]));
}

#[test]
fn history_text_mode_hints_when_empty() {
    let db = TempDb::create("cli-history");
    let path = write_config(&db, "");

    regimewatch()
        .arg("--config")
        .arg(&path)
        .args(["--color", "never", "history", "--days", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last 7 days"))
        .stdout(predicate::str::contains("No recorded history"));
}

#[test]
fn history_export_writes_csv_header_on_empty_database() {
    let db = TempDb::create("cli-export");
    let path = write_config(&db, "");
    let out = db.dir().join("regimes.csv");

    regimewatch()
        .arg("--config")
        .arg(&path)
        .args(["--color", "never", "history", "--export"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 0 days"));

    assert_eq!(
        fs::read_to_string(&out).expect("export written"),
        "day,label,score,confidence\n"
    );
}

#[test]
fn history_export_reports_json() {
    let db = TempDb::create("cli-export-json");
    let path = write_config(&db, "");
    let out = db.dir().join("regimes.json");

    let output = regimewatch()
        .arg("--config")
        .arg(&path)
        .args(["--json", "history", "--export"])
        .arg(&out)
        .output()
        .expect("run regimewatch");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["format"], "json");
    assert_eq!(value["count"], 0);
    assert_eq!(fs::read_to_string(&out).expect("export written"), "[]");
}

#[test]
fn oversized_windows_do_not_crash() {
    let db = TempDb::create("cli-windows");
    let path = write_config(&db, "");

    regimewatch()
        .arg("--config")
        .arg(&path)
        .args(["--json", "history", "--days", "4294967295"])
        .assert()
        .success();
    regimewatch()
        .arg("--config")
        .arg(&path)
        .args(["--json", "health", "--hours", "4294967295"])
        .assert()
        .success();
}
