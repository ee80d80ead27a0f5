//! Application service: run a command inside the workspace over SSH.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::ports::{CommandRunner, PlatformClient, Sleeper};
use crate::application::services::workspace_lifecycle::find_workspace;
use crate::domain::ssh::remote_command_args;
use crate::domain::{PollPolicy, ProviderSettings, WorkspaceError};

/// Exit code reported when `ssh` was terminated by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = 255;

pub struct CommandRequest<'a> {
    pub machine_id: &'a str,
    pub command: &'a str,
    /// Private key matching the public key injected at create time.
    pub identity_file: &'a str,
    pub settings: &'a ProviderSettings,
}

/// Run `request.command` in the workspace with inherited stdio.
///
/// Returns the remote exit code.
///
/// # Errors
///
/// Returns [`WorkspaceError::NotFound`] for an unknown workspace,
/// [`WorkspaceError::NoPortAssigned`] when the platform never reports an SSH
/// port within [`PollPolicy::PORT_LOOKUP`], or the failure to spawn `ssh`.
pub async fn run_remote_command(
    platform: &impl PlatformClient,
    runner: &impl CommandRunner,
    sleeper: &impl Sleeper,
    request: &CommandRequest<'_>,
    cancel: &CancellationToken,
) -> Result<i32> {
    let name = request.machine_id;
    let workspace = find_workspace(platform, name).await?;
    let port = match workspace.ssh_port {
        Some(port) => port,
        None => wait_for_port(platform, sleeper, &workspace.resource_id, name, cancel).await?,
    };

    let settings = request.settings;
    let args = remote_command_args(
        request.identity_file,
        &settings.ssh_user,
        &settings.ssh_host,
        port,
        request.command,
    );
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    debug!(name, port, "running remote command");
    let status = runner
        .run_status("ssh", &arg_refs)
        .await
        .context("running ssh")?;
    Ok(status.code().unwrap_or(SIGNALLED_EXIT_CODE))
}

async fn wait_for_port(
    platform: &impl PlatformClient,
    sleeper: &impl Sleeper,
    resource_id: &str,
    name: &str,
    cancel: &CancellationToken,
) -> Result<u16> {
    let policy = PollPolicy::PORT_LOOKUP;
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            anyhow::bail!("cancelled while waiting for an SSH port on '{name}'");
        }
        let fresh = platform
            .get_resource(resource_id)
            .await
            .with_context(|| format!("reading resource {resource_id}"))?
            .ok_or_else(|| WorkspaceError::NotFound(name.to_string()))?;
        if let Some(port) = fresh.ssh_port {
            return Ok(port);
        }
        debug!(name, attempt, "no SSH port assigned yet");
        if attempt < policy.max_attempts {
            sleeper.sleep(policy.interval).await;
        }
    }
    Err(WorkspaceError::NoPortAssigned(name.to_string()).into())
}
