#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the opsdesk binary
//!
//! Only commands that work without a backend or identity provider are run.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn run_opsdesk(args: &[&str]) -> Output {
    run_opsdesk_with_env(args, &[])
}

fn run_opsdesk_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_opsdesk"))
        .args(args)
        .envs(env.iter().copied())
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute opsdesk")
}

fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("opsdesk.yaml");
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

fn valid_config(dir: &Path) -> String {
    format!(
        r"
api:
  base_url: https://api.example.com/v1
  timeout: 10s
oidc:
  authority: https://auth.example.com/realms/opsdesk
  client_id: opsdesk-console
  redirect_uri: http://localhost:5173/callback
session:
  path: {}
",
        dir.join("session.json").display()
    )
}

#[test]
fn test_cli_help_lists_commands() {
    let output = run_opsdesk(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    for command in ["login", "callback", "logout", "whoami", "nav", "companies", "team", "profiles", "check"] {
        assert!(stdout.contains(command), "Should list '{command}': {stdout}");
    }
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_team_help_lists_subcommands() {
    let output = run_opsdesk(&["team", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["list", "add", "edit", "remove"] {
        assert!(stdout.contains(command), "Should list '{command}'");
    }
}

#[test]
fn test_cli_version_command() {
    let output = run_opsdesk(&["--version"]);
    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("opsdesk"), "Should contain binary name");
}

#[test]
fn test_cli_invalid_command() {
    let output = run_opsdesk(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report an error: {stderr}");
}

#[test]
fn test_cli_missing_config_file() {
    let output = run_opsdesk(&["--config", "/nonexistent/opsdesk.yaml", "check"]);
    assert!(!output.status.success(), "Should fail when config file doesn't exist");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "Should name the problem: {stderr}");
}

#[test]
fn test_cli_check_valid_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &valid_config(dir.path()));
    let output = run_opsdesk(&["--config", &config, "check"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_cli_check_rejects_plain_http_backend() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "api:\n  base_url: http://api.example.com/\n");
    let output = run_opsdesk(&["--config", &config, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("https"), "Should explain the scheme problem: {stderr}");
}

#[test]
fn test_cli_unknown_config_key_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "api:\n  base_uri: https://api.example.com/\n");
    let output = run_opsdesk(&["--config", &config, "check"]);
    assert!(!output.status.success(), "Unknown keys should be rejected");
}

#[test]
fn test_cli_config_prints_effective_yaml_with_env_override() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &valid_config(dir.path()));
    let output = run_opsdesk_with_env(
        &["--config", &config, "config"],
        &[("OPSDESK__API__BASE_URL", "https://override.example.com/")],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("https://override.example.com/"), "{stdout}");
    assert!(stdout.contains("opsdesk-console"), "{stdout}");
    assert!(stdout.contains("10s"), "{stdout}");
}

#[test]
fn test_cli_nav_lists_menu() {
    let output = run_opsdesk(&["nav"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for entry in ["Dashboard", "Processes", "Instances", "Profiles", "/team"] {
        assert!(stdout.contains(entry), "Should list '{entry}': {stdout}");
    }
}

#[test]
fn test_cli_whoami_without_session() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &valid_config(dir.path()));
    let output = run_opsdesk(&["--config", &config, "whoami"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Not signed in"));
}

#[test]
fn test_cli_backend_commands_need_oidc() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "api:\n  base_url: https://api.example.com/\n");
    let output = run_opsdesk(&["--config", &config, "team", "list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("oidc"), "Should name the missing section: {stderr}");
}

#[test]
fn test_cli_profiles_add_rejects_unoffered_platform() {
    let output = run_opsdesk(&[
        "profiles",
        "add",
        "--name",
        "prod",
        "--platform",
        "AWS",
        "--credential-data",
        "{}",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is not available"), "Should reject AWS: {stderr}");
}
