//! Commands module
//!
//! Defines the CLI commands and their handlers.

mod reap;
mod start;

pub use reap::ReapArgs;
pub use start::StartArgs;

use anyhow::Result;
use clap::Subcommand;
use std::process::ExitCode;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start an EC2 instance, retrying capacity shortages with exponential backoff
    Start(StartArgs),
    /// Remove all docker containers, images, volumes and custom networks
    Reap(ReapArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Returns
/// The process exit code, or an error for failures before any work started
pub async fn handle_command(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Start(args) => start::handle_start_command(args).await,
        Commands::Reap(args) => reap::handle_reap_command(args).await,
    }
}
