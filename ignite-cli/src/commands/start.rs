//! Start command handler
//!
//! Builds the configuration, runs the pre-flight checks and hands the
//! instance to the start orchestrator.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use ignite_client::{AwsCli, DisabledNotifier, Notifier, WebhookNotifier};
use ignite_core::domain::policy::RetryPolicy;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use crate::config::StartConfig;
use crate::service::StartOrchestrator;

/// Arguments of `ignite start`
#[derive(Args)]
pub struct StartArgs {
    /// EC2 instance id to start
    pub instance: String,

    /// Maximum number of start attempts
    #[arg(long, value_name = "NUM", default_value_t = RetryPolicy::DEFAULT_MAX_ATTEMPTS)]
    pub max_retries: u32,

    /// Base backoff delay in seconds, doubled after every failed attempt
    #[arg(long, value_name = "NUM", default_value_t = RetryPolicy::DEFAULT_BASE_DELAY_SECS)]
    pub base_delay: u64,

    /// Seconds to wait for the instance to reach running after each accepted start
    #[arg(
        long,
        value_name = "SECS",
        env = "IGNITE_WAIT_TIMEOUT",
        default_value_t = StartConfig::DEFAULT_WAIT_TIMEOUT_SECS
    )]
    pub wait_timeout: u64,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS named profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Webhook receiving the outcome message; notifications are disabled when unset
    #[arg(long, env = "IGNITE_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,
}

/// Handle `ignite start`
pub async fn handle_start_command(args: StartArgs) -> Result<ExitCode> {
    let config = StartConfig::new(
        &args.instance,
        args.max_retries,
        args.base_delay,
        args.wait_timeout,
    )?
    .with_region(args.region)
    .with_profile(args.profile)
    .with_webhook_url(args.webhook_url);
    config.validate()?;

    info!(
        "Starting instance {} (max_attempts={}, base_delay={:?}, wait_timeout={:?})",
        config.instance,
        config.policy.max_attempts(),
        config.policy.base_delay(),
        config.wait_timeout
    );

    let aws = AwsCli::new()
        .with_region(config.region.clone())
        .with_profile(config.profile.clone());
    aws.check_available()
        .await
        .context("AWS CLI pre-flight check failed")?;
    aws.check_credentials()
        .await
        .context("AWS credentials pre-flight check failed")?;

    let notifier = build_notifier(&config)?;
    let orchestrator = StartOrchestrator::new(Arc::new(aws), notifier, config.wait_timeout);

    println!(
        "{} {}",
        "Starting instance".bold(),
        config.instance.to_string().cyan()
    );
    let outcome = orchestrator.run(&config.instance, &config.policy).await;

    Ok(ExitCode::from(outcome.exit_code() as u8))
}

fn build_notifier(config: &StartConfig) -> Result<Arc<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) => {
            let notifier =
                WebhookNotifier::new(url).context("Failed to create webhook notifier")?;
            Ok(Arc::new(notifier))
        }
        None => Ok(Arc::new(DisabledNotifier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: StartArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["ignite", "i-0123456789abcdef0"]).unwrap();
        assert_eq!(cli.args.instance, "i-0123456789abcdef0");
        assert_eq!(cli.args.max_retries, 10);
        assert_eq!(cli.args.base_delay, 30);
    }

    #[test]
    fn test_flags() {
        let cli = TestCli::try_parse_from([
            "ignite",
            "i-0123456789abcdef0",
            "--max-retries",
            "3",
            "--base-delay",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.args.max_retries, 3);
        assert_eq!(cli.args.base_delay, 5);
    }

    #[test]
    fn test_instance_is_required() {
        assert!(TestCli::try_parse_from(["ignite"]).is_err());
    }

    #[test]
    fn test_disabled_notifier_without_webhook() {
        let config = StartConfig::new("i-1", 1, 1, 1).unwrap();
        assert!(build_notifier(&config).is_ok());
    }
}
