//! Binary-level tests: argument parsing, the stdout protocol and exit codes.
//!
//! Each test runs `dokpod` with a scrubbed environment and a throwaway
//! `HOME`, so no developer settings leak in.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::fake_dokploy::{FakeDokploy, TOKEN, app};

const SCRUBBED: &[&str] = &[
    "DOKPLOY_SERVER_URL",
    "DOKPLOY_API_TOKEN",
    "DOKPLOY_PROJECT_NAME",
    "DOKPLOY_SERVER_ID",
    "DOKPLOY_PROVIDER_DEV",
    "DEVPOD_PROVIDER_DEV",
    "MACHINE_ID",
    "MACHINE_FOLDER",
    "MACHINE_TYPE",
    "DEVPOD_MACHINE_ID",
    "DEVPOD_WORKSPACE_ID",
    "WORKSPACE_ID",
    "COMMAND",
    "DEVPOD_COMMAND",
    "RUST_LOG",
];

fn dokpod(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dokpod"));
    for var in SCRUBBED {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home.path()).env("NO_COLOR", "1");
    cmd
}

fn against(server: &FakeDokploy, home: &TempDir, machine: &str) -> Command {
    let mut cmd = dokpod(home);
    cmd.env("DOKPLOY_SERVER_URL", server.url())
        .env("DOKPLOY_API_TOKEN", TOKEN)
        .env("MACHINE_ID", machine);
    cmd
}

#[test]
fn no_args_prints_usage() {
    let home = TempDir::new().unwrap();
    dokpod(&home)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("DevPod provider for Dokploy"));
}

#[test]
fn help_lists_provider_commands() {
    let home = TempDir::new().unwrap();
    let assert = dokpod(&home).arg("--help").assert().success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for cmd in ["init", "create", "start", "stop", "delete", "status", "command"] {
        assert!(out.contains(cmd), "help should list {cmd}:\n{out}");
    }
}

#[test]
fn status_without_machine_id_is_not_found() {
    let home = TempDir::new().unwrap();
    dokpod(&home)
        .arg("status")
        .assert()
        .success()
        .stdout("NotFound\n");
}

#[test]
fn status_with_unusable_settings_is_not_found() {
    let home = TempDir::new().unwrap();
    dokpod(&home)
        .arg("status")
        .env("MACHINE_ID", "ws")
        .env("DOKPLOY_SERVER_URL", "https://dokploy.example.com")
        .assert()
        .success()
        .stdout("NotFound\n");
}

#[test]
fn create_without_machine_id_fails() {
    let home = TempDir::new().unwrap();
    dokpod(&home)
        .arg("create")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn status_of_idle_workspace_is_stopped() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn_with(vec![app("a1", "ws", "idle", Some(2230))]);
    against(&server, &home, "ws")
        .arg("status")
        .assert()
        .success()
        .stdout("Stopped\n");
}

#[test]
fn status_of_deploying_workspace_is_busy() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn_with(vec![app("a1", "ws", "deploying", Some(2230))]);
    against(&server, &home, "ws")
        .arg("status")
        .assert()
        .success()
        .stdout("Busy\n");
}

#[test]
fn status_of_unknown_workspace_is_not_found() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn_with(vec![app("a1", "other", "done", Some(2230))]);
    against(&server, &home, "ws")
        .arg("status")
        .assert()
        .success()
        .stdout("NotFound\n");
}

#[test]
fn status_reads_settings_file() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn_with(vec![app("a1", "ws", "idle", Some(2230))]);
    let file = home.path().join("provider.yaml");
    std::fs::write(
        &file,
        format!("server_url: {}\napi_token: {TOKEN}\n", server.url()),
    )
    .unwrap();
    dokpod(&home)
        .args(["status", "--config"])
        .arg(&file)
        .env("MACHINE_ID", "ws")
        .assert()
        .success()
        .stdout("Stopped\n");
}

#[test]
fn stop_calls_platform_stop() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn_with(vec![app("a1", "ws", "done", Some(2230))]);
    against(&server, &home, "ws")
        .arg("stop")
        .assert()
        .success()
        .stdout("");
    assert!(server.paths().iter().any(|p| p == "/api/application.stop"));
    assert_eq!(server.app("a1").unwrap()["applicationStatus"], "idle");
}

#[test]
fn delete_of_missing_workspace_fails() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn();
    against(&server, &home, "ws")
        .arg("delete")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ws"));
}

#[test]
fn init_succeeds_against_healthy_server() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn();
    against(&server, &home, "ws")
        .arg("init")
        .assert()
        .success()
        .stdout("");
    assert!(server.paths().iter().any(|p| p == "/api/settings.health"));
}

#[test]
fn init_with_bad_token_fails() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn();
    against(&server, &home, "ws")
        .arg("init")
        .env("DOKPLOY_API_TOKEN", "wrong")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("health check failed"));
}

#[test]
fn command_without_command_fails() {
    let home = TempDir::new().unwrap();
    let server = FakeDokploy::spawn_with(vec![app("a1", "ws", "done", Some(2230))]);
    against(&server, &home, "ws")
        .arg("command")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no command given"));
}
