//! `dokpod stop`: stop a workspace (preserves the resource and its port).

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::workspace_lifecycle::LifecycleAction;

/// Run `dokpod stop`.
///
/// # Errors
///
/// Returns an error if the workspace is missing or the platform rejects the call.
pub async fn run(app: &AppContext) -> Result<()> {
    super::lifecycle(app, LifecycleAction::Stop).await
}
