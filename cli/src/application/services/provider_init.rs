//! Application service: provider init (connectivity check).

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::{PlatformClient, ProgressReporter};

/// What `init` learned about the current machine, if one is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineCheck {
    /// No machine id in the environment.
    Skipped,
    /// The workspace does not exist yet.
    Absent,
    /// The workspace exists; `ssh_port` is its published SSH port, if any.
    Present { ssh_port: Option<u16> },
}

/// Verify platform access and, when `machine_id` is set, report its SSH port.
///
/// # Errors
///
/// Returns an error if the health check fails. Lookup failures for the
/// machine are reported as warnings only.
pub async fn init_provider(
    platform: &impl PlatformClient,
    reporter: &impl ProgressReporter,
    machine_id: Option<&str>,
) -> Result<MachineCheck> {
    reporter.step("checking Dokploy connectivity...");
    platform
        .health()
        .await
        .context("Dokploy health check failed; verify DOKPLOY_SERVER_URL and DOKPLOY_API_TOKEN")?;
    reporter.success("Dokploy is reachable");

    let Some(name) = machine_id else {
        return Ok(MachineCheck::Skipped);
    };
    let listing = match platform.list_resources().await {
        Ok(list) => list,
        Err(e) => {
            reporter.warn(&format!("could not look up '{name}': {e:#}"));
            return Ok(MachineCheck::Skipped);
        }
    };
    let Some(workspace) = listing.into_iter().find(|w| w.name == name) else {
        info!(name, "machine not created yet");
        return Ok(MachineCheck::Absent);
    };
    match workspace.ssh_port {
        Some(port) => reporter.success(&format!("workspace '{name}' publishes SSH on port {port}")),
        None => reporter.warn(&format!("workspace '{name}' has no SSH port mapping")),
    }
    Ok(MachineCheck::Present {
        ssh_port: workspace.ssh_port,
    })
}
