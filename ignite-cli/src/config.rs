//! Configuration module
//!
//! Immutable settings for the two commands. Built once from the command line
//! and passed into the services at construction.

use anyhow::{Result, anyhow};
use ignite_core::domain::instance::InstanceRef;
use ignite_core::domain::policy::RetryPolicy;
use std::time::Duration;

/// Settings for one `ignite start` invocation
#[derive(Debug, Clone)]
pub struct StartConfig {
    /// Instance to drive to running
    pub instance: InstanceRef,

    /// Attempt budget and backoff
    pub policy: RetryPolicy,

    /// Upper bound for each wait-until-running call
    pub wait_timeout: Duration,

    /// AWS region override
    pub region: Option<String>,

    /// AWS named profile override
    pub profile: Option<String>,

    /// Notification webhook; `None` disables notifications
    pub webhook_url: Option<String>,
}

impl StartConfig {
    /// Default wait-until-running bound in seconds
    pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;

    /// Creates a configuration with no region, profile or webhook
    pub fn new(
        instance: &str,
        max_attempts: u32,
        base_delay_secs: u64,
        wait_timeout_secs: u64,
    ) -> Result<Self> {
        let instance = InstanceRef::new(instance)
            .ok_or_else(|| anyhow!("instance reference cannot be empty"))?;

        let policy = RetryPolicy::new(max_attempts, Duration::from_secs(base_delay_secs))
            .ok_or_else(|| anyhow!("--max-retries must be at least 1"))?;

        Ok(Self {
            instance,
            policy,
            wait_timeout: Duration::from_secs(wait_timeout_secs),
            region: None,
            profile: None,
            webhook_url: None,
        })
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = non_blank(region);
        self
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = non_blank(profile);
        self
    }

    /// Sets the webhook; an empty value counts as unset
    pub fn with_webhook_url(mut self, url: Option<String>) -> Self {
        self.webhook_url = non_blank(url);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.wait_timeout.is_zero() {
            anyhow::bail!("wait_timeout must be greater than 0");
        }

        if let Some(url) = &self.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("webhook_url must start with http:// or https://");
            }
        }

        Ok(())
    }
}

/// Settings for one `ignite reap` invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct ReapConfig {
    /// Print the commands without running them
    pub dry_run: bool,

    /// Skip the confirmation prompt
    pub assume_yes: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = StartConfig::new("i-0123456789abcdef0", 10, 30, 600).unwrap();
        assert_eq!(config.instance.as_str(), "i-0123456789abcdef0");
        assert_eq!(config.policy.max_attempts(), 10);
        assert_eq!(config.policy.base_delay(), Duration::from_secs(30));
        assert!(config.webhook_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(StartConfig::new("", 10, 30, 600).is_err());
        assert!(StartConfig::new("i-1", 0, 30, 600).is_err());
        assert!(StartConfig::new("i-1", 1, 0, 600).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = StartConfig::new("i-1", 3, 30, 0).unwrap();
        assert!(config.validate().is_err());

        let config = StartConfig::new("i-1", 3, 30, 600)
            .unwrap()
            .with_webhook_url(Some("not-a-url".to_string()));
        assert!(config.validate().is_err());

        let config = StartConfig::new("i-1", 3, 30, 600)
            .unwrap()
            .with_webhook_url(Some("https://hooks.slack.com/services/T0/B0/X".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_optionals_are_unset() {
        let config = StartConfig::new("i-1", 3, 30, 600)
            .unwrap()
            .with_webhook_url(Some("  ".to_string()))
            .with_region(Some(String::new()))
            .with_profile(Some("ops".to_string()));
        assert!(config.webhook_url.is_none());
        assert!(config.region.is_none());
        assert_eq!(config.profile.as_deref(), Some("ops"));
    }
}
