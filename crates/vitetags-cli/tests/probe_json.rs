//! Integration tests for `vitetags probe --json` output.

use std::net::TcpListener;
use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "vitetags-cli", "--bin", "vitetags", "--"]);
    for var in [
        "DEV_SERVER_URL",
        "VITE_SERVER_URL",
        "DEV_SERVER_CHECK_URL",
        "VITE_SERVER_CHECK_URL",
        "VITETAGS_MODE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_probe_running_dev_server() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let dir = tempfile::TempDir::new().unwrap();

    let output = cargo_bin()
        .arg("--json")
        .arg("--cwd")
        .arg(dir.path())
        .arg("probe")
        .env("VITETAGS_MODE", "dev")
        .env("DEV_SERVER_URL", format!("http://127.0.0.1:{port}/"))
        .output()
        .expect("Failed to run probe command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(json["schema_version"].as_u64(), Some(1));
    assert_eq!(json["mode"].as_str(), Some("dev"));
    assert_eq!(json["running"].as_bool(), Some(true));
    assert_eq!(
        json["base_url"].as_str(),
        Some(format!("http://127.0.0.1:{port}").as_str())
    );
    drop(listener);
}

#[test]
fn test_probe_live_mode_is_not_running() {
    let dir = tempfile::TempDir::new().unwrap();

    let output = cargo_bin()
        .arg("--json")
        .arg("--cwd")
        .arg(dir.path())
        .arg("probe")
        .env("DEV_SERVER_URL", "http://127.0.0.1:5173")
        .output()
        .expect("Failed to run probe command");

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(json["mode"].as_str(), Some("live"));
    assert_eq!(json["running"].as_bool(), Some(false));
    assert!(json["base_url"].is_null());
}

#[test]
fn test_version_json() {
    let output = cargo_bin()
        .args(["--json", "version"])
        .output()
        .expect("Failed to run version command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert!(json["version"].as_str().is_some());
}
