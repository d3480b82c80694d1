//! Instance control plane abstraction

use async_trait::async_trait;
use ignite_core::domain::instance::{InstanceRef, InstanceState};
use std::time::Duration;

use crate::error::Result;

/// Result of waiting for an instance to reach the running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// The instance reached running within the timeout
    Running,
    /// The timeout elapsed first
    TimedOut,
}

/// Capabilities the start orchestrator needs from the control plane
///
/// Implemented over the `aws` CLI by [`crate::AwsCli`]; tests provide scripted fakes.
#[async_trait]
pub trait InstanceControl: Send + Sync {
    /// Point-in-time state query
    ///
    /// Returns an error for which [`crate::ClientError::is_not_found`] holds
    /// when the instance does not exist.
    async fn describe_instance(&self, instance: &InstanceRef) -> Result<InstanceState>;

    /// Issues a start request
    ///
    /// A rejection carries the provider message so it can be classified.
    async fn start_instance(&self, instance: &InstanceRef) -> Result<()>;

    /// Blocks until the instance is running or `timeout` elapses
    async fn wait_until_running(
        &self,
        instance: &InstanceRef,
        timeout: Duration,
    ) -> Result<WaitStatus>;
}
