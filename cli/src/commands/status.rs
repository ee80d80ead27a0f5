//! `dokpod status`: print the workspace's lifecycle token.
//!
//! Always exits 0 with exactly one of `Running`, `Busy`, `Stopped` or
//! `NotFound` on stdout. Missing identity or unusable settings mean DevPod
//! has nothing to manage yet, so they read as `NotFound`.

use anyhow::{Context, Result};
use dokpod_common::LifecycleState;
use tracing::warn;

use crate::app::AppContext;
use crate::application::services::status_reconciler::{StatusReconciler, current_state};
use crate::output::write_status;

/// Run `dokpod status`.
///
/// # Errors
///
/// Returns an error only if stdout cannot be written.
pub async fn run(app: &AppContext) -> Result<()> {
    let state = resolve(app).await;
    write_status(&mut std::io::stdout().lock(), state).context("writing status")?;
    Ok(())
}

async fn resolve(app: &AppContext) -> LifecycleState {
    let name = match app.machine_id() {
        Ok(name) => name,
        Err(e) => {
            warn!(error = %e, "no machine id");
            return LifecycleState::NotFound;
        }
    };
    let settings = match app.settings() {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "invalid provider settings");
            return LifecycleState::NotFound;
        }
    };
    let platform = match app.platform(&settings) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "cannot build platform client");
            return LifecycleState::NotFound;
        }
    };
    let prober = app.prober(&settings);
    let reconciler =
        StatusReconciler::new(&platform, &prober, &settings.ssh_host, settings.probe_timeout);
    current_state(&reconciler, &name).await
}
