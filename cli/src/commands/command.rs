//! `dokpod command`: run a command inside the workspace over SSH.

use std::io::{IsTerminal, Read};

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::services::workspace_command::{CommandRequest, run_remote_command};
use crate::infra::keys::MachineKeys;

/// Variables checked, in order, for the command to run.
pub const COMMAND_VARS: &[&str] = &["COMMAND", "DEVPOD_COMMAND"];

/// Run `dokpod command` and return the remote exit code.
///
/// # Errors
///
/// Returns an error if no command is given, the workspace or its SSH port
/// cannot be found, or `ssh` cannot be spawned.
pub async fn run(app: &AppContext) -> Result<i32> {
    let machine_id = app.machine_id()?;
    let settings = app.settings()?;
    let stdin = std::io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    let command = resolve_command(|k| std::env::var(k).ok(), piped)?;

    let keys = MachineKeys::from_env()?;
    let identity = keys.identity_file();
    let identity = identity.to_string_lossy();
    let platform = app.platform(&settings)?;

    let request = CommandRequest {
        machine_id: &machine_id,
        command: &command,
        identity_file: &identity,
        settings: &settings,
    };
    run_remote_command(&platform, &app.runner, &app.sleeper, &request, &app.cancel).await
}

/// The command from [`COMMAND_VARS`], else from `stdin` when one is piped.
///
/// # Errors
///
/// Returns an error if no source yields a non-empty command.
pub fn resolve_command(
    lookup: impl Fn(&str) -> Option<String>,
    stdin: Option<impl Read>,
) -> Result<String> {
    if let Some(cmd) = COMMAND_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|v| !v.trim().is_empty())
    {
        return Ok(cmd);
    }
    if let Some(mut input) = stdin {
        let mut buf = String::new();
        input
            .read_to_string(&mut buf)
            .context("reading command from stdin")?;
        let trimmed = buf.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    anyhow::bail!("no command given; set COMMAND or DEVPOD_COMMAND, or pipe it on stdin")
}
