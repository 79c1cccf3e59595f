//! CLI integration tests for the qbtc-supervisor binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build a command for the binary with its working directory set to `dir`.
fn supervisor_cmd(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo_bin_cmd!("qbtc-supervisor");
    cmd.current_dir(dir)
        .env_remove("QBTC_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a config that logs only to a file under `dir/logs`.
fn write_config(dir: &Path, status_port: u16) -> PathBuf {
    let path = dir.join("config.yaml");
    fs::create_dir_all(dir.join("logs")).unwrap();
    let yaml = format!(
        "status:\n  host: 127.0.0.1\n  port: {status_port}\n\
         oracle:\n  api_key: sk-or-v1-aaaaaaaaaaaaaaaaaaaaaaaaaaaa\n\
         logging:\n  log_dir: {}\n  enable_stdout: false\n  rotation: never\n",
        dir.join("logs").display()
    );
    fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn test_bootstrap_failure_reaches_log_file() {
    let dir = TempDir::new().unwrap();
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();
    let config = write_config(dir.path(), port);

    supervisor_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["run", "--max-cycles", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to bind status server"));

    let log = fs::read_to_string(dir.path().join("logs").join("qbtc-supervisor.log")).unwrap();
    let emergency: Vec<Value> = log
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap())
        .filter(|event| event["fields"]["message"] == "Emergency shutdown")
        .collect();

    assert_eq!(emergency.len(), 1);
    assert_eq!(emergency[0]["level"], "ERROR");
    assert!(emergency[0]["fields"]["error"]
        .as_str()
        .unwrap()
        .contains("Failed to bind status server"));
}

#[test]
fn test_json_error_report() {
    let dir = TempDir::new().unwrap();
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = write_config(dir.path(), occupied.local_addr().unwrap().port());

    let output = supervisor_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--json", "run", "--max-cycles", "1"])
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();

    let body: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn test_config_command_redacts_api_key() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), 15000);

    let output = supervisor_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--json", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aaaaaaaaaaaa").not())
        .get_output()
        .stdout
        .clone();

    let body: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(body["oracle"]["api_key"], "[REDACTED]");
    assert_eq!(body["status"]["port"], 15000);
}
