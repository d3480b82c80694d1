//! Docker engine access
//!
//! Thin wrapper over the `docker` binary used by the resource reaper:
//! - Checking docker is installed and the daemon answers
//! - Listing resource ids
//! - Running removal commands

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// Operations the reaper needs from a docker engine
#[async_trait]
pub trait DockerEngine: Send + Sync {
    /// Runs a listing command (e.g. `ps -aq`) and returns one id per non-empty line
    async fn list(&self, args: &[String]) -> Result<Vec<String>>;

    /// Runs a mutating command (e.g. `rm -f <ids>`)
    async fn execute(&self, args: &[String]) -> Result<()>;
}

/// Docker engine reached through the `docker` CLI
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Checks that docker is installed and the daemon is reachable
    pub async fn check_available(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .map_err(|e| ClientError::ToolMissing {
                tool: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ClientError::ToolMissing {
                tool: self.program.clone(),
                message: "docker is not working correctly".to_string(),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout);
        info!("Docker is available: {}", version.trim());

        let info = Command::new(&self.program)
            .args(["info", "--format", "{{.ServerVersion}}"])
            .output()
            .await?;

        if !info.status.success() {
            return Err(ClientError::ToolMissing {
                tool: self.program.clone(),
                message: format!(
                    "docker daemon is not reachable: {}",
                    String::from_utf8_lossy(&info.stderr).trim()
                ),
            });
        }

        Ok(())
    }

    async fn run(&self, args: &[String]) -> Result<String> {
        debug!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program).args(args).output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", self.program, stderr.trim());
        }

        if !output.status.success() {
            return Err(ClientError::CommandFailed {
                command: format!("{} {}", self.program, args.join(" ")),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DockerEngine for DockerCli {
    async fn list(&self, args: &[String]) -> Result<Vec<String>> {
        let stdout = self.run(args).await?;
        Ok(parse_ids(&stdout))
    }

    async fn execute(&self, args: &[String]) -> Result<()> {
        let stdout = self.run(args).await?;
        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", self.program, stdout.trim());
        }
        Ok(())
    }
}

/// Splits listing output into ids, dropping blanks and duplicates while keeping order
pub fn parse_ids(output: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
