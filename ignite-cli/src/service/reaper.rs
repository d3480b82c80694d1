//! Docker resource reaper
//!
//! Removes everything from the local docker engine in a fixed order:
//! running containers are stopped, then containers, images, volumes and
//! custom networks are removed, and a final system prune sweeps the rest.
//!
//! Each step lists ids first and skips the removal when there is nothing to
//! remove. Commands are printed before they run; in dry-run mode they are
//! only printed.

use colored::*;
use ignite_client::DockerEngine;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ReapConfig;

/// A list-then-remove step
struct ReapStep {
    /// Plural resource name for output
    resource: &'static str,
    /// Arguments listing the ids to remove
    list: &'static [&'static str],
    /// Removal arguments, ids are appended
    remove: &'static [&'static str],
}

const STEPS: &[ReapStep] = &[
    ReapStep {
        resource: "running containers",
        list: &["ps", "-q"],
        remove: &["stop"],
    },
    ReapStep {
        resource: "containers",
        list: &["ps", "-aq"],
        remove: &["rm", "-f"],
    },
    ReapStep {
        resource: "images",
        list: &["images", "-aq"],
        remove: &["rmi", "-f"],
    },
    ReapStep {
        resource: "volumes",
        list: &["volume", "ls", "-q"],
        remove: &["volume", "rm", "-f"],
    },
    ReapStep {
        resource: "networks",
        list: &["network", "ls", "--filter", "type=custom", "-q"],
        remove: &["network", "rm"],
    },
];

const PRUNE: &[&str] = &["system", "prune", "-a", "-f", "--volumes"];

/// What a reap run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReapSummary {
    /// Commands that were run (or would run in dry-run mode)
    pub commands: Vec<Vec<String>>,

    /// Steps that failed, with the error message
    pub failures: Vec<String>,
}

impl ReapSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Reaper {
    engine: Arc<dyn DockerEngine>,
    config: ReapConfig,
}

impl Reaper {
    pub fn new(engine: Arc<dyn DockerEngine>, config: ReapConfig) -> Self {
        Self { engine, config }
    }

    /// Runs every step; a failed step is recorded and the next one still runs
    pub async fn run(&self) -> ReapSummary {
        let mut summary = ReapSummary::default();

        if self.config.dry_run {
            println!("{}", "Dry run: no resources will be removed".yellow().bold());
        }

        for step in STEPS {
            self.run_step(step, &mut summary).await;
        }

        println!("{} {}", "▸".cyan(), "Final prune".bold());
        let prune = to_args(PRUNE);
        self.execute(prune, "system prune", &mut summary).await;

        info!(
            "Reap finished: {} command(s), {} failure(s)",
            summary.commands.len(),
            summary.failures.len()
        );
        summary
    }

    async fn run_step(&self, step: &ReapStep, summary: &mut ReapSummary) {
        println!("{} {}", "▸".cyan(), format!("Removing {}", step.resource).bold());

        let ids = match self.engine.list(&to_args(step.list)).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to list {}: {}", step.resource, e);
                println!("  {} Failed to list {}: {}", "✗".red(), step.resource, e);
                summary
                    .failures
                    .push(format!("list {}: {}", step.resource, e));
                return;
            }
        };

        if ids.is_empty() {
            println!("  {}", format!("No {} found", step.resource).dimmed());
            return;
        }

        let mut args = to_args(step.remove);
        args.extend(ids);
        self.execute(args, step.resource, summary).await;
    }

    async fn execute(&self, args: Vec<String>, label: &str, summary: &mut ReapSummary) {
        let display = format!("docker {}", args.join(" "));

        if self.config.dry_run {
            println!("  {} {}", "[dry-run]".yellow(), display);
            summary.commands.push(args);
            return;
        }

        println!("  {} {}", "$".dimmed(), display.cyan());
        match self.engine.execute(&args).await {
            Ok(()) => println!("  {} {}", "✓".green(), label),
            Err(e) => {
                warn!("Failed to remove {}: {}", label, e);
                println!("  {} {}: {}", "✗".red(), label, e);
                summary.failures.push(format!("{}: {}", label, e));
            }
        }
        summary.commands.push(args);
    }
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
