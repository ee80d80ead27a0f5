//! Command implementations
//!
//! One module per DevPod provider hook. Handlers wire infrastructure into
//! application services; stdout is reserved for protocol output.

pub mod command;
pub mod create;
pub mod delete;
pub mod init;
pub mod start;
pub mod status;
pub mod stop;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::workspace_lifecycle::{self as service, LifecycleAction};

/// Shared body of `start`, `stop` and `delete`.
async fn lifecycle(app: &AppContext, action: LifecycleAction) -> Result<()> {
    let name = app.machine_id()?;
    let settings = app.settings()?;
    let platform = app.platform(&settings)?;
    service::apply(&platform, &app.terminal_reporter(), &name, action).await
}
