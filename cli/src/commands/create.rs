//! `dokpod create`: provision a workspace and print its connection details.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::services::workspace_create::{CreateRequest, create_workspace};
use crate::infra::assets::setup_script;
use crate::infra::keys::MachineKeys;
use crate::output::write_connection;

/// Run `dokpod create`.
///
/// The `DEVPOD_MACHINE_*` lines are the last thing written to stdout.
///
/// # Errors
///
/// Returns an error if the machine id or key is missing, any platform step
/// fails, or the workspace does not become ready in time.
pub async fn run(app: &AppContext) -> Result<()> {
    let machine_id = app.machine_id()?;
    let settings = app.settings()?;
    let public_key = MachineKeys::from_env()?.public_key()?;
    let template = setup_script()?;

    let platform = app.platform(&settings)?;
    let prober = app.prober(&settings);
    let request = CreateRequest {
        machine_id: &machine_id,
        public_key: &public_key,
        setup_template: template,
        settings: &settings,
    };

    let info = create_workspace(
        &platform,
        &prober,
        &app.sleeper,
        &app.terminal_reporter(),
        &request,
        &app.cancel,
    )
    .await?;

    write_connection(&mut std::io::stdout().lock(), &info).context("writing connection info")?;
    Ok(())
}
