//! Application service: workspace create use-case.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! All I/O is routed through injected port traits.
//!
//! Sequence: project → resource → port claim → container config → deploy →
//! readiness polling. The port claim must be acknowledged before deploy.

use anyhow::{Context, Result};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::ports::{
    ContainerSpec, PlatformClient, ProgressReporter, ReachabilityProber, ResourceSpec, Sleeper,
};
use crate::application::services::port_allocator::{
    AllocationRequest, allocate_port, usage_snapshot,
};
use crate::application::services::status_reconciler::{
    AwaitOutcome, StatusReconciler, await_ready,
};
use crate::domain::error::is_conflict;
use crate::domain::template::{environment_block, render_setup_script, wrap_as_command};
use crate::domain::{ConnectionInfo, ProviderSettings, Workspace};

/// Inputs for the `create_workspace` use-case.
pub struct CreateRequest<'a> {
    pub machine_id: &'a str,
    /// OpenSSH public key DevPod will authenticate with.
    pub public_key: &'a str,
    /// Setup script with placeholders, see `domain::template`.
    pub setup_template: &'a str,
    pub settings: &'a ProviderSettings,
}

/// Create (or resume creating) a workspace and wait until SSH answers.
///
/// Re-running after a partial failure reuses the existing resource and its
/// claimed port.
///
/// # Errors
///
/// Returns an error if any platform step fails terminally, if no port can be
/// allocated, or if the workspace is not ready within the polling budget.
pub async fn create_workspace(
    platform: &impl PlatformClient,
    prober: &impl ReachabilityProber,
    sleeper: &impl Sleeper,
    reporter: &impl ProgressReporter,
    request: &CreateRequest<'_>,
    cancel: &CancellationToken,
) -> Result<ConnectionInfo> {
    let settings = request.settings;
    let name = request.machine_id;

    reporter.step(&format!("ensuring project '{}'...", settings.project_name));
    let project_id = ensure_project(platform, &settings.project_name).await?;

    let listing = match platform.list_resources().await {
        Ok(list) => list,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "listing failed, port snapshot will be empty");
            reporter.warn("could not read existing port usage; relying on live checks");
            Vec::new()
        }
    };

    reporter.step(&format!("creating workspace '{name}'..."));
    let resource = find_or_create_resource(platform, &listing, &project_id, request).await?;
    info!(name, resource_id = %resource.resource_id, "workspace resource ready");

    let port = if let Some(port) = resource.ssh_port {
        info!(port, "reusing SSH port already claimed by this workspace");
        port
    } else {
        reporter.step(&format!("allocating SSH port in {}...", settings.port_range));
        let snapshot = usage_snapshot(&listing);
        let claim = allocate_port(
            platform,
            prober,
            &AllocationRequest {
                host: &settings.ssh_host,
                range: settings.port_range,
                resource_id: &resource.resource_id,
                connect_timeout: settings.probe_timeout,
            },
            &snapshot,
            cancel,
        )
        .await?;
        reporter.success(&format!("SSH port {} claimed", claim.port));
        claim.port
    };

    reporter.step("configuring container...");
    let script = render_setup_script(request.setup_template, request.public_key, &settings.ssh_user);
    let command = wrap_as_command(&script);
    let env = environment_block(name, request.public_key, &settings.machine_type);
    platform
        .configure(
            &resource.resource_id,
            &ContainerSpec {
                docker_image: &settings.docker_image,
                env: &env,
                command: &command,
            },
        )
        .await
        .context("configuring workspace container")?;

    reporter.step("deploying...");
    platform
        .deploy(&resource.resource_id)
        .await
        .context("triggering deployment")?;

    reporter.step("waiting for SSH to come up...");
    let reconciler = StatusReconciler::new(
        platform,
        prober,
        &settings.ssh_host,
        settings.probe_timeout,
    );
    match await_ready(&reconciler, sleeper, name, settings.poll, cancel).await {
        AwaitOutcome::Ready => {}
        AwaitOutcome::TimedOut { attempts } => anyhow::bail!(
            "workspace '{name}' was not ready after {attempts} attempts \
             (SSH port {port} on {}); check the deployment logs in Dokploy",
            settings.ssh_host
        ),
        AwaitOutcome::Cancelled => anyhow::bail!("create cancelled while waiting for '{name}'"),
    }
    reporter.success(&format!("workspace '{name}' is running"));

    Ok(ConnectionInfo {
        machine_id: name.to_string(),
        host: settings.ssh_host.clone(),
        port,
        user: settings.ssh_user.clone(),
    })
}

/// Project id for `name`, creating the project when absent.
///
/// # Errors
///
/// Returns an error if the lookup or creation fails.
pub async fn ensure_project(platform: &impl PlatformClient, name: &str) -> Result<String> {
    if let Some(id) = platform
        .find_project(name)
        .await
        .context("looking up project")?
    {
        return Ok(id);
    }
    info!(name, "creating project");
    platform
        .create_project(name, "DevPod workspaces managed by dokpod")
        .await
        .with_context(|| format!("creating project '{name}'"))
}

async fn find_or_create_resource(
    platform: &impl PlatformClient,
    listing: &[Workspace],
    project_id: &str,
    request: &CreateRequest<'_>,
) -> Result<Workspace> {
    let name = request.machine_id;
    if let Some(existing) = listing.iter().find(|w| w.name == name) {
        info!(name, "workspace resource already exists, reusing it");
        return Ok(existing.clone());
    }

    let description = format!("DevPod workspace created on {}", Utc::now().to_rfc3339());
    let created = platform
        .create_resource(&ResourceSpec {
            name,
            description: &description,
            project_id,
            server_id: request.settings.server_id.as_deref(),
        })
        .await;

    let resource_id = match created {
        Ok(id) => id,
        Err(e) if is_conflict(&e) => {
            info!(name, "resource created concurrently, reusing it");
            return platform
                .list_resources()
                .await
                .context("re-reading workspaces after name conflict")?
                .into_iter()
                .find(|w| w.name == name)
                .with_context(|| format!("'{name}' reported as existing but not listed"));
        }
        Err(e) => return Err(e).context("creating workspace resource"),
    };

    Ok(Workspace {
        name: name.to_string(),
        resource_id,
        platform_status: String::new(),
        ssh_port: None,
        published_ports: Vec::new(),
    })
}
