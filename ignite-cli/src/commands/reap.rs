//! Reap command handler
//!
//! Confirms with the operator, checks docker is reachable and runs the reaper.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use ignite_client::DockerCli;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::ReapConfig;
use crate::service::Reaper;

/// Arguments of `ignite reap`
#[derive(Args)]
pub struct ReapArgs {
    /// Print the commands that would run without removing anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

/// Handle `ignite reap`
pub async fn handle_reap_command(args: ReapArgs) -> Result<ExitCode> {
    let config = ReapConfig {
        dry_run: args.dry_run,
        assume_yes: args.yes,
    };

    let docker = DockerCli::new();
    docker
        .check_available()
        .await
        .context("Docker pre-flight check failed")?;

    if !config.dry_run && !config.assume_yes {
        print_warning();
        let stdin = std::io::stdin();
        if !confirm(&mut stdin.lock()).context("Failed to read confirmation")? {
            println!("{}", "Aborted, nothing was removed.".yellow());
            return Ok(ExitCode::SUCCESS);
        }
    }

    let summary = Reaper::new(Arc::new(docker), config).run().await;

    println!();
    if summary.is_success() {
        println!("{}", "✓ Docker cleanup complete!".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{}",
            format!(
                "✗ Docker cleanup finished with {} failure(s)",
                summary.failures.len()
            )
            .red()
            .bold()
        );
        for failure in &summary.failures {
            println!("  - {}", failure);
        }
        Ok(ExitCode::FAILURE)
    }
}

fn print_warning() {
    println!("{}", "WARNING: this will permanently remove".red().bold());
    println!("  - all containers (running ones are stopped first)");
    println!("  - all images");
    println!("  - all volumes and the data in them");
    println!("  - all custom networks");
    print!("{} ", "Continue? [y/N]".bold());
    let _ = std::io::stdout().flush();
}

/// Reads one answer line; only `y` or `yes` (any case) confirm
fn confirm(input: &mut impl BufRead) -> Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
