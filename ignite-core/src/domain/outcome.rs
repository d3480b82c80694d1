//! Attempt results and run outcomes

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::instance::InstanceRef;

/// Classification of a single step of a run
///
/// Produced once per describe, start or wait call and consumed by the
/// orchestrator to pick the next action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptResult {
    /// Describe reported the instance as running
    Running,

    /// The start request was accepted and the instance reached running
    Started,

    /// The start request was refused for lack of provider capacity
    CapacityExhausted,

    /// The start request failed for any other reason
    OtherError(String),

    /// The instance does not exist
    NotFound,

    /// The start request was accepted but the instance did not reach running in time
    WaitTimedOut,
}

impl AttemptResult {
    /// Returns true if the orchestrator may try again after this result
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttemptResult::CapacityExhausted | AttemptResult::WaitTimedOut
        )
    }
}

/// Terminal result of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    AlreadyRunning {
        elapsed: Duration,
    },
    StartedSuccessfully {
        elapsed: Duration,
        attempts: u32,
    },
    FailedCapacity {
        elapsed: Duration,
        attempts: u32,
    },
    FailedOther {
        elapsed: Duration,
        attempts: u32,
        message: String,
    },
    FailedNotFound {
        elapsed: Duration,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RunOutcome::AlreadyRunning { .. } | RunOutcome::StartedSuccessfully { .. }
        )
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            RunOutcome::AlreadyRunning { elapsed }
            | RunOutcome::StartedSuccessfully { elapsed, .. }
            | RunOutcome::FailedCapacity { elapsed, .. }
            | RunOutcome::FailedOther { elapsed, .. }
            | RunOutcome::FailedNotFound { elapsed } => *elapsed,
        }
    }

    /// Number of start calls issued during the run
    pub fn attempts(&self) -> u32 {
        match self {
            RunOutcome::AlreadyRunning { .. } | RunOutcome::FailedNotFound { .. } => 0,
            RunOutcome::StartedSuccessfully { attempts, .. }
            | RunOutcome::FailedCapacity { attempts, .. }
            | RunOutcome::FailedOther { attempts, .. } => *attempts,
        }
    }

    /// Human-readable message sent to the outcome notifier
    pub fn message(&self, instance: &InstanceRef) -> String {
        let secs = self.elapsed().as_secs();
        match self {
            RunOutcome::AlreadyRunning { .. } => {
                format!("Instance {} is already running (checked in {}s)", instance, secs)
            }
            RunOutcome::StartedSuccessfully { attempts, .. } => format!(
                "Instance {} started successfully after {} attempt(s) in {}s",
                instance, attempts, secs
            ),
            RunOutcome::FailedCapacity { attempts, .. } => format!(
                "Failed to start instance {}: insufficient capacity after {} attempt(s) ({}s elapsed)",
                instance, attempts, secs
            ),
            RunOutcome::FailedOther {
                attempts, message, ..
            } => format!(
                "Failed to start instance {} after {} attempt(s): {} ({}s elapsed)",
                instance, attempts, message, secs
            ),
            RunOutcome::FailedNotFound { .. } => {
                format!("Instance {} not found ({}s elapsed)", instance, secs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> InstanceRef {
        InstanceRef::new("i-0123456789abcdef0").unwrap()
    }

    #[test]
    fn test_exit_codes() {
        let elapsed = Duration::from_secs(1);
        assert_eq!(RunOutcome::AlreadyRunning { elapsed }.exit_code(), 0);
        assert_eq!(
            RunOutcome::StartedSuccessfully {
                elapsed,
                attempts: 2
            }
            .exit_code(),
            0
        );
        assert_eq!(
            RunOutcome::FailedCapacity {
                elapsed,
                attempts: 10
            }
            .exit_code(),
            1
        );
        assert_eq!(RunOutcome::FailedNotFound { elapsed }.exit_code(), 1);
    }

    #[test]
    fn test_attempts_are_zero_without_start_calls() {
        let elapsed = Duration::from_secs(3);
        assert_eq!(RunOutcome::AlreadyRunning { elapsed }.attempts(), 0);
        assert_eq!(RunOutcome::FailedNotFound { elapsed }.attempts(), 0);
    }

    #[test]
    fn test_messages_embed_details() {
        let started = RunOutcome::StartedSuccessfully {
            elapsed: Duration::from_secs(95),
            attempts: 3,
        };
        assert_eq!(
            started.message(&instance()),
            "Instance i-0123456789abcdef0 started successfully after 3 attempt(s) in 95s"
        );

        let failed = RunOutcome::FailedOther {
            elapsed: Duration::from_millis(1500),
            attempts: 1,
            message: "UnauthorizedOperation".to_string(),
        };
        let message = failed.message(&instance());
        assert!(message.contains("UnauthorizedOperation"));
        assert!(message.contains("1 attempt(s)"));
        assert!(message.contains("1s elapsed"));

        let missing = RunOutcome::FailedNotFound {
            elapsed: Duration::ZERO,
        };
        assert!(missing.message(&instance()).contains("not found"));
    }

    #[test]
    fn test_retryable_results() {
        assert!(AttemptResult::CapacityExhausted.is_retryable());
        assert!(AttemptResult::WaitTimedOut.is_retryable());
        assert!(!AttemptResult::OtherError("boom".to_string()).is_retryable());
        assert!(!AttemptResult::NotFound.is_retryable());
    }
}
