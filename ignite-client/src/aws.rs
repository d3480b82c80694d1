//! AWS CLI backed control plane
//!
//! Drives EC2 through the `aws` command line tool:
//! - Checking the tool is installed and credentials are valid
//! - Describing instance state
//! - Starting instances
//! - Waiting for the running state with an upper bound

use async_trait::async_trait;
use ignite_core::domain::instance::{InstanceRef, InstanceState};
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::control::{InstanceControl, WaitStatus};
use crate::error::{ClientError, Result};

/// Marker the AWS CLI prints in front of every service error
const SERVICE_ERROR_MARKER: &str = "An error occurred (";

/// EC2 control plane accessed through the `aws` binary
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: String,
    region: Option<String>,
    profile: Option<String>,
}

impl AwsCli {
    /// Creates a client using `aws` from `PATH` and the ambient region/profile
    pub fn new() -> Self {
        Self {
            program: "aws".to_string(),
            region: None,
            profile: None,
        }
    }

    /// Passes `--region` on every call
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Passes `--profile` on every call
    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    /// Checks that the aws CLI is installed and working
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
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout);
        info!("AWS CLI is available: {}", version.trim());
        Ok(())
    }

    /// Checks that the configured credentials are accepted
    pub async fn check_credentials(&self) -> Result<()> {
        match self
            .run(&["sts", "get-caller-identity", "--output", "json"])
            .await
        {
            Ok(identity) => {
                debug!("Caller identity: {}", identity.trim());
                Ok(())
            }
            Err(ClientError::Io(e)) => Err(ClientError::Io(e)),
            Err(e) => Err(ClientError::MissingCredentials(e.to_string())),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(region) = &self.region {
            command.arg("--region").arg(region);
        }
        if let Some(profile) = &self.profile {
            command.arg("--profile").arg(profile);
        }
        command.kill_on_drop(true);
        command
    }

    /// Runs an aws subcommand and returns its stdout
    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!("Running: {} {}", self.program, args.join(" "));

        let output = self.command().args(args).output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            debug!(
                "aws {} failed: exit_code={} stderr='{}'",
                args.join(" "),
                exit_code,
                stderr.trim()
            );

            if stderr.contains(SERVICE_ERROR_MARKER) {
                return Err(ClientError::api_error(stderr));
            }

            return Err(ClientError::CommandFailed {
                command: format!("{} {}", self.program, args.join(" ")),
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceControl for AwsCli {
    async fn describe_instance(&self, instance: &InstanceRef) -> Result<InstanceState> {
        let stdout = self
            .run(&[
                "ec2",
                "describe-instances",
                "--instance-ids",
                instance.as_str(),
                "--output",
                "json",
            ])
            .await?;

        parse_instance_state(&stdout, instance)
    }

    async fn start_instance(&self, instance: &InstanceRef) -> Result<()> {
        let stdout = self
            .run(&[
                "ec2",
                "start-instances",
                "--instance-ids",
                instance.as_str(),
                "--output",
                "json",
            ])
            .await?;

        debug!("start-instances response: {}", stdout.trim());
        Ok(())
    }

    async fn wait_until_running(
        &self,
        instance: &InstanceRef,
        timeout: Duration,
    ) -> Result<WaitStatus> {
        let args = [
            "ec2",
            "wait",
            "instance-running",
            "--instance-ids",
            instance.as_str(),
        ];

        // The waiter child is killed on drop when the timeout fires
        match tokio::time::timeout(timeout, self.run(&args)).await {
            Ok(Ok(_)) => Ok(WaitStatus::Running),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(WaitStatus::TimedOut),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesOutput {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<DescribedInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribedInstance {
    instance_id: String,
    state: DescribedState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribedState {
    name: InstanceState,
}

/// Extracts the state of `instance` from `describe-instances` JSON output
fn parse_instance_state(output: &str, instance: &InstanceRef) -> Result<InstanceState> {
    let parsed: DescribeInstancesOutput = serde_json::from_str(output).map_err(|e| {
        ClientError::ParseError(format!("Invalid describe-instances output: {}", e))
    })?;

    parsed
        .reservations
        .into_iter()
        .flat_map(|r| r.instances)
        .find(|i| i.instance_id == instance.as_str())
        .map(|i| i.state.name)
        .ok_or_else(|| ClientError::NotFound(instance.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> InstanceRef {
        InstanceRef::new("i-0123456789abcdef0").unwrap()
    }

    #[test]
    fn test_parse_running_instance() {
        let output = r#"{
            "Reservations": [{
                "Instances": [{
                    "InstanceId": "i-0123456789abcdef0",
                    "InstanceType": "g5.xlarge",
                    "State": { "Code": 16, "Name": "running" }
                }]
            }]
        }"#;

        let state = parse_instance_state(output, &instance()).unwrap();
        assert_eq!(state, InstanceState::Running);
    }

    #[test]
    fn test_parse_stopped_instance() {
        let output = r#"{"Reservations":[{"Instances":[{"InstanceId":"i-0123456789abcdef0","State":{"Code":80,"Name":"stopped"}}]}]}"#;

        let state = parse_instance_state(output, &instance()).unwrap();
        assert_eq!(state, InstanceState::Stopped);
    }

    #[test]
    fn test_parse_empty_reservations_is_not_found() {
        let err = parse_instance_state(r#"{"Reservations": []}"#, &instance()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_other_instance_is_not_found() {
        let output = r#"{"Reservations":[{"Instances":[{"InstanceId":"i-ffffffffffffffff0","State":{"Name":"running"}}]}]}"#;

        let err = parse_instance_state(output, &instance()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_instance_state("not json", &instance()).unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[test]
    fn test_builder_sets_global_args() {
        let aws = AwsCli::new()
            .with_region(Some("eu-west-1".to_string()))
            .with_profile(None);
        assert_eq!(aws.region.as_deref(), Some("eu-west-1"));
        assert!(aws.profile.is_none());
    }
}
