//! `dokpod start`: start a stopped workspace.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::workspace_lifecycle::LifecycleAction;

/// Run `dokpod start`.
///
/// # Errors
///
/// Returns an error if the workspace is missing or the platform rejects the call.
pub async fn run(app: &AppContext) -> Result<()> {
    super::lifecycle(app, LifecycleAction::Start).await
}
