//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::app::{AppConfig, AppContext};
use crate::commands;
use crate::infra::logging;

/// DevPod provider for Dokploy
#[derive(Parser)]
#[command(
    name = "dokpod",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (default: ~/.dokploy-provider.yaml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Validate configuration and check Dokploy access
    Init,

    /// Create the workspace and print its connection details
    Create,

    /// Start the workspace
    Start,

    /// Stop the workspace
    Stop,

    /// Delete the workspace
    Delete,

    /// Print the workspace state (Running, Busy, Stopped or NotFound)
    Status,

    /// Run COMMAND inside the workspace over SSH
    Command,
}

impl Cli {
    /// Execute the CLI command and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<i32> {
        let Cli {
            verbose,
            config,
            no_color,
            command,
        } = self;
        let dev_mode = logging::is_dev_mode(|k| std::env::var(k).ok());
        logging::init(verbose, dev_mode);
        tracing::debug!(?command, verbose, dev_mode, "dokpod starting");

        let app = AppContext::new(
            AppConfig {
                no_color,
                config_path: config,
            },
            cancel,
        );

        match command {
            Command::Init => commands::init::run(&app).await?,
            Command::Create => commands::create::run(&app).await?,
            Command::Start => commands::start::run(&app).await?,
            Command::Stop => commands::stop::run(&app).await?,
            Command::Delete => commands::delete::run(&app).await?,
            Command::Status => commands::status::run(&app).await?,
            Command::Command => return commands::command::run(&app).await,
        }
        Ok(0)
    }
}
