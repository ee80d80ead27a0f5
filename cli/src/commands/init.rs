//! `dokpod init`: validate configuration and check platform access.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::provider_init::init_provider;

/// Run `dokpod init`.
///
/// # Errors
///
/// Returns an error if the settings are invalid or the health check fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let settings = app.settings()?;
    let platform = app.platform(&settings)?;
    let machine_id = app.machine_id().ok();

    let check = init_provider(&platform, &app.terminal_reporter(), machine_id.as_deref()).await?;
    tracing::info!(server = %settings.server_url, ?check, "provider initialized");
    Ok(())
}
