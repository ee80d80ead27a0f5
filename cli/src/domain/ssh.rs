//! SSH argument building, handshake classification, and key normalization.
//!
//! Pure functions only. The infra prober and the `command` service run the
//! argument vectors built here through the `CommandRunner` port.

use anyhow::{Context, Result};
use base64::Engine as _;
use dokpod_common::ProbeOutcome;

/// `ssh` stderr fragments that prove the daemon negotiated up to the
/// authentication stage.
pub const AUTH_REJECTION_MARKERS: &[&str] = &[
    "Permission denied",
    "no more authentication methods",
    "Too many authentication failures",
    "unable to authenticate",
];

/// Options shared by the probe and remote command invocations.
const NO_HOST_KEY_CHECK: [&str; 4] = [
    "-o",
    "StrictHostKeyChecking=no",
    "-o",
    "UserKnownHostsFile=/dev/null",
];

/// Classify the result of a batch-mode `ssh` handshake attempt.
///
/// `exit_code` is `None` when the process was killed by a signal.
#[must_use]
pub fn classify_handshake(exit_code: Option<i32>, stderr: &str) -> ProbeOutcome {
    if exit_code == Some(0) {
        return ProbeOutcome::ReachableExpectedService;
    }
    if AUTH_REJECTION_MARKERS.iter().any(|m| stderr.contains(m)) {
        return ProbeOutcome::ReachableExpectedService;
    }
    ProbeOutcome::ReachableUnknownService
}

/// Arguments for a handshake-only `ssh` run.
///
/// No identity is offered and no prompt is possible, so a live daemon always
/// ends the session at the authentication stage.
#[must_use]
pub fn handshake_probe_args(user: &str, host: &str, port: u16, connect_timeout_secs: u64) -> Vec<String> {
    let mut args: Vec<String> = NO_HOST_KEY_CHECK.iter().map(|s| (*s).to_string()).collect();
    for opt in [
        "BatchMode=yes".to_string(),
        format!("ConnectTimeout={}", connect_timeout_secs.max(1)),
        "PreferredAuthentications=publickey".to_string(),
        "PasswordAuthentication=no".to_string(),
        "KbdInteractiveAuthentication=no".to_string(),
        "IdentitiesOnly=yes".to_string(),
        "IdentityFile=/dev/null".to_string(),
        "LogLevel=ERROR".to_string(),
    ] {
        args.push("-o".to_string());
        args.push(opt);
    }
    args.extend([
        "-p".to_string(),
        port.to_string(),
        format!("{user}@{host}"),
        "exit".to_string(),
    ]);
    args
}

/// Arguments for running `command` in the workspace over SSH.
#[must_use]
pub fn remote_command_args(
    identity_file: &str,
    user: &str,
    host: &str,
    port: u16,
    command: &str,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-i".to_string(), identity_file.to_string()];
    args.extend(NO_HOST_KEY_CHECK.iter().map(|s| (*s).to_string()));
    for opt in [
        "ConnectTimeout=30",
        "ServerAliveInterval=5",
        "ServerAliveCountMax=3",
        "LogLevel=ERROR",
    ] {
        args.push("-o".to_string());
        args.push(opt.to_string());
    }
    args.extend([
        "-p".to_string(),
        port.to_string(),
        format!("{user}@{host}"),
        command.to_string(),
    ]);
    args
}

/// Normalize a public key read from DevPod's machine folder.
///
/// DevPod stores keys base64-encoded; plain OpenSSH keys are passed through.
///
/// # Errors
///
/// Returns an error if the key is empty, is not valid base64, or does not
/// decode to an OpenSSH public key line.
pub fn normalize_public_key(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    anyhow::ensure!(!trimmed.is_empty(), "SSH public key is empty");
    let key = if is_openssh_key(trimmed) {
        trimmed.to_string()
    } else {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(trimmed)
            .context("decoding base64 SSH public key")?;
        String::from_utf8(bytes)
            .context("decoded SSH public key is not UTF-8")?
            .trim()
            .to_string()
    };
    anyhow::ensure!(
        is_openssh_key(&key),
        "SSH public key is not in OpenSSH format"
    );
    Ok(key)
}

fn is_openssh_key(s: &str) -> bool {
    s.starts_with("ssh-") || s.starts_with("ecdsa-sha2-")
}
