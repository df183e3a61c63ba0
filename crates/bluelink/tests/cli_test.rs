//! Integration tests for the `bluelink` CLI binary.
//!
//! Argument parsing, help, completions and config handling run without a
//! gateway. The end-to-end cases drive the binary against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIN: &str = "KM8J33A49LU000001";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `bluelink` binary with env isolation.
///
/// Clears all `BLUELINK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn bluelink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bluelink");
    cmd.env("HOME", "/tmp/bluelink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/bluelink-cli-test-nonexistent")
        .env("NO_COLOR", "1");
    for (key, _) in std::env::vars() {
        if key.starts_with("BLUELINK_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

/// A command wired to a mock gateway with env-supplied credentials.
fn gateway_cmd(server: &MockServer, config_dir: &Path) -> assert_cmd::Command {
    let mut cmd = bluelink_cmd();
    cmd.arg("--config")
        .arg(config_dir.join("config.toml"))
        .args(["--base-url", &server.uri()])
        .env("BLUELINK_USERNAME", "driver")
        .env("BLUELINK_PASSWORD", "hunter2")
        .env("BLUELINK_PIN", "1234")
        .env("BLUELINK_VIN", VIN)
        .env("BLUELINK_CLIENT_ID", "app-id")
        .env("BLUELINK_CLIENT_SECRET", "app-secret");
    cmd
}

/// Run a prepared command off the async runtime so the mock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/ac/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-123",
            "expires_in": "1799"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ac/v2/enrollment/details/driver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enrolledVehicleDetails": [
                { "vehicleDetails": {
                    "regid": "REG-9", "vehicleGeneration": "2",
                    "vin": VIN, "brandIndicator": "H"
                } }
            ]
        })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = bluelink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    bluelink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Blue Link")
            .and(predicate::str::contains("lock"))
            .and(predicate::str::contains("start"))
            .and(predicate::str::contains("find")),
    );
}

#[test]
fn test_version_flag() {
    bluelink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bluelink"));
}

#[test]
fn test_invalid_subcommand() {
    bluelink_cmd()
        .arg("honk")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_for_each_shell() {
    for shell in ["bash", "zsh", "fish"] {
        bluelink_cmd()
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("bluelink"));
    }
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_preset_conflicts_with_temperature() {
    bluelink_cmd()
        .args(["start", "--preset", "winter", "--temp", "50"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_unknown_preset_rejected() {
    bluelink_cmd()
        .args(["start", "--preset", "spring"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_lock_without_credentials_is_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = bluelink_cmd()
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .arg("lock")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("username, vin"), "got:\n{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = bluelink_cmd()
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["--profile", "garage", "lock"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("garage"));
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    bluelink_cmd()
        .args(["config", "path", "--config", "/tmp/elsewhere/bluelink.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere/bluelink.toml"));
}

#[test]
fn test_config_show_redacts_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
        &file,
        r#"
default_profile = "home"

[profiles.home]
dialect = "session"
username = "driver@example.com"
password = "hunter2"
pin = "1234"
vin = "KM8J33A49LU000001"
"#,
    )
    .unwrap();

    bluelink_cmd()
        .arg("--config")
        .arg(&file)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("driver@example.com")
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("1234").not()),
        );
}

#[test]
fn test_config_show_json_from_flat_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.json");
    std::fs::write(
        &file,
        json!({
            "username": "driver",
            "password": "hunter2",
            "pin": 1234,
            "vin": VIN
        })
        .to_string(),
    )
    .unwrap();

    let output = bluelink_cmd()
        .arg("--config")
        .arg(&file)
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["profiles"]["default"]["username"], "driver");
    assert_eq!(value["profiles"]["default"]["pin"], "********");
}

// ── Against a mock gateway ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_lock_end_to_end() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/ac/v2/rcs/rdo/off"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("userName=driver"))
        .and(body_string_contains(format!("vin={VIN}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server, dir.path());
    cmd.args(["-o", "plain", "lock"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "success");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_prints_vehicle() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    let mut cmd = gateway_cmd(&server, dir.path());
    cmd.args(["-o", "json", "login"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["vin"], VIN);
    assert_eq!(value["registration_id"], "REG-9");
    assert_eq!(value["dialect"], "token");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_unlock_exits_with_rejection_code() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/ac/v2/rcs/rdo/on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "E_IFRESULT": "Z:Failure",
            "E_IFFAILMSG": "Vehicle is in motion"
        })))
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server, dir.path());
    cmd.arg("unlock");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(5));
    assert!(combined_output(&output).contains("Vehicle is in motion"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_password_exits_with_auth_code() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/v2/ac/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server, dir.path());
    cmd.arg("lock");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_prints_truncated_coordinates() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/ac/v2/rcs/rfc/findMyCar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coord": { "lat": 37.12349, "lon": -122.98765, "alt": 0 },
            "head": 0
        })))
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server, dir.path());
    cmd.args(["-o", "plain", "find"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "37.123,-122.987"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_without_fix_prints_sentinel() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/ac/v2/rcs/rfc/findMyCar"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server, dir.path());
    cmd.args(["-o", "plain", "find"]);
    let output = run(cmd).await;

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "-1,-1");
    assert!(String::from_utf8_lossy(&output.stderr).contains("location unavailable"));
}
