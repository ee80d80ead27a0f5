//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once in `Cli::run()` from explicit flags; nothing
//! reads a global verbose switch. Infrastructure adapters are constructed
//! here so command handlers only wire services together.

use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::domain::workspace::resolve_machine_id;
use crate::domain::{ProviderSettings, WorkspaceError};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::load_settings;
use crate::infra::dokploy::DokployClient;
use crate::infra::prober::SshProber;
use crate::infra::sleeper::TokioSleeper;
use crate::output::{OutputContext, TerminalReporter};

/// Process-wide options decided at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Plain stderr progress output.
    pub no_color: bool,
    /// Explicit settings file from `--config`.
    pub config_path: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    pub config: AppConfig,
    /// Stderr progress output.
    pub output: OutputContext,
    /// Cancelled on Ctrl-C; observed between polling iterations.
    pub cancel: CancellationToken,
    pub runner: TokioCommandRunner,
    pub sleeper: TokioSleeper,
}

impl AppContext {
    #[must_use]
    pub fn new(config: AppConfig, cancel: CancellationToken) -> Self {
        Self {
            output: OutputContext::new(config.no_color),
            config,
            cancel,
            runner: TokioCommandRunner::new(),
            sleeper: TokioSleeper,
        }
    }

    /// Load and validate provider settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file or environment is invalid.
    pub fn settings(&self) -> Result<ProviderSettings> {
        load_settings(self.config.config_path.as_deref())
    }

    /// Dokploy client for `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn platform(&self, settings: &ProviderSettings) -> Result<DokployClient> {
        DokployClient::new(&settings.server_url, &settings.api_token)
    }

    #[must_use]
    pub fn prober(&self, settings: &ProviderSettings) -> SshProber<TokioCommandRunner> {
        SshProber::new(self.runner, settings.ssh_user.clone())
    }

    /// Machine id from the DevPod environment.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::MissingMachineId`] or
    /// [`WorkspaceError::InvalidName`].
    pub fn machine_id(&self) -> Result<String, WorkspaceError> {
        resolve_machine_id(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
