//! Application service: start, stop and delete.
//!
//! These call the platform directly and never consult the reconciler.
//! A workspace missing from the platform is a hard error for all three.

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::{PlatformClient, ProgressReporter};
use crate::domain::error::is_not_found;
use crate::domain::{Workspace, WorkspaceError};

/// Platform action applied to an existing workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Stop,
    Delete,
}

impl LifecycleAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "starting",
            Self::Stop => "stopping",
            Self::Delete => "deleting",
        }
    }

    fn done(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Delete => "deleted",
        }
    }
}

/// Look up a workspace by name in the platform listing.
///
/// # Errors
///
/// Returns [`WorkspaceError::NotFound`] if no resource carries the name, or
/// the listing failure.
pub async fn find_workspace(platform: &impl PlatformClient, name: &str) -> Result<Workspace> {
    platform
        .list_resources()
        .await
        .context("listing workspaces")?
        .into_iter()
        .find(|w| w.name == name)
        .ok_or_else(|| WorkspaceError::NotFound(name.to_string()).into())
}

/// Apply `action` to the named workspace.
///
/// Deleting does not release the workspace's port claim separately; the
/// platform drops port mappings together with the resource.
///
/// # Errors
///
/// Returns [`WorkspaceError::NotFound`] when the workspace is missing, before
/// or during the call, or the platform failure.
pub async fn apply(
    platform: &impl PlatformClient,
    reporter: &impl ProgressReporter,
    name: &str,
    action: LifecycleAction,
) -> Result<()> {
    let workspace = find_workspace(platform, name).await?;
    let id = workspace.resource_id.as_str();

    reporter.step(&format!("{} workspace '{name}'...", action.verb()));
    let result = match action {
        LifecycleAction::Start => platform.start(id).await,
        LifecycleAction::Stop => platform.stop(id).await,
        LifecycleAction::Delete => platform.delete_resource(id).await,
    };
    match result {
        Ok(()) => {}
        Err(e) if is_not_found(&e) => return Err(WorkspaceError::NotFound(name.to_string()).into()),
        Err(e) => {
            return Err(e).with_context(|| format!("{} workspace '{name}'", action.verb()));
        }
    }

    info!(name, resource_id = id, ?action, "lifecycle action accepted");
    reporter.success(&format!("workspace '{name}' {}", action.done()));
    Ok(())
}
