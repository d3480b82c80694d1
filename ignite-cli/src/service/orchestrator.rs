//! Instance start orchestrator
//!
//! Drives a single instance to the running state:
//! - Describes the instance and short-circuits when it is missing or already running
//! - Issues start requests, waiting a bounded time for each to take effect
//! - Retries capacity shortages with exponential backoff until the policy is exhausted
//! - Sends exactly one notification describing the outcome

use colored::*;
use ignite_client::{ClientError, InstanceControl, Notifier, WaitStatus};
use ignite_core::domain::instance::InstanceRef;
use ignite_core::domain::outcome::{AttemptResult, RunOutcome};
use ignite_core::domain::policy::RetryPolicy;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::service::sleeper::{Sleeper, TokioSleeper};

pub struct StartOrchestrator {
    control: Arc<dyn InstanceControl>,
    notifier: Arc<dyn Notifier>,
    sleeper: Arc<dyn Sleeper>,
    wait_timeout: Duration,
}

impl StartOrchestrator {
    /// Creates an orchestrator that sleeps on the tokio timer
    ///
    /// # Arguments
    /// * `control` - Control plane used to describe, start and wait
    /// * `notifier` - Receives the final status message
    /// * `wait_timeout` - Upper bound for each wait-until-running call
    pub fn new(
        control: Arc<dyn InstanceControl>,
        notifier: Arc<dyn Notifier>,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            control,
            notifier,
            sleeper: Arc::new(TokioSleeper),
            wait_timeout,
        }
    }

    /// Replaces the backoff sleeper
    #[allow(dead_code)]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Runs one invocation and notifies its outcome
    ///
    /// Never fails: every error is classified into a [`RunOutcome`].
    pub async fn run(&self, instance: &InstanceRef, policy: &RetryPolicy) -> RunOutcome {
        let started = Instant::now();
        let outcome = self.drive(instance, policy, started).await;

        print_outcome(instance, &outcome);
        self.notify(instance, &outcome).await;

        outcome
    }

    async fn drive(
        &self,
        instance: &InstanceRef,
        policy: &RetryPolicy,
        started: Instant,
    ) -> RunOutcome {
        progress(format!("Checking state of instance {}", instance.to_string().bold()));

        match self.check(instance).await {
            Some(AttemptResult::Running) => {
                return RunOutcome::AlreadyRunning {
                    elapsed: started.elapsed(),
                };
            }
            Some(AttemptResult::NotFound) => {
                return RunOutcome::FailedNotFound {
                    elapsed: started.elapsed(),
                };
            }
            Some(AttemptResult::OtherError(message)) => {
                return RunOutcome::FailedOther {
                    elapsed: started.elapsed(),
                    attempts: 0,
                    message,
                };
            }
            _ => {}
        }

        let max_attempts = policy.max_attempts();

        for attempt in 1..=max_attempts {
            progress(format!("Start attempt {}/{}", attempt, max_attempts));

            let result = self.attempt(instance).await;
            debug!("Attempt {} for {} resulted in {:?}", attempt, instance, result);

            match result {
                AttemptResult::Started | AttemptResult::Running => {
                    return RunOutcome::StartedSuccessfully {
                        elapsed: started.elapsed(),
                        attempts: attempt,
                    };
                }
                AttemptResult::NotFound => {
                    return RunOutcome::FailedNotFound {
                        elapsed: started.elapsed(),
                    };
                }
                AttemptResult::OtherError(message) => {
                    return RunOutcome::FailedOther {
                        elapsed: started.elapsed(),
                        attempts: attempt,
                        message,
                    };
                }
                AttemptResult::CapacityExhausted | AttemptResult::WaitTimedOut => {
                    if !policy.has_attempts_after(attempt) {
                        return self.exhausted(result, attempt, started);
                    }

                    let delay = policy.delay_for(attempt);
                    progress(format!(
                        "Retrying in {}s (attempt {}/{} failed)",
                        delay.as_secs(),
                        attempt,
                        max_attempts
                    ));
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        // Every iteration above returns on its last attempt
        RunOutcome::FailedOther {
            elapsed: started.elapsed(),
            attempts: max_attempts,
            message: "retry budget exhausted".to_string(),
        }
    }

    /// Describes the instance; `None` means a start is needed
    async fn check(&self, instance: &InstanceRef) -> Option<AttemptResult> {
        match self.control.describe_instance(instance).await {
            Ok(state) if state.is_running() => Some(AttemptResult::Running),
            Ok(state) => {
                progress(format!("Instance is {}", state.to_string().yellow()));
                None
            }
            Err(e) if e.is_not_found() => Some(AttemptResult::NotFound),
            Err(e) => {
                warn!("Failed to describe instance {}: {}", instance, e);
                Some(AttemptResult::OtherError(e.to_string()))
            }
        }
    }

    /// Issues one start request and waits for it to take effect
    async fn attempt(&self, instance: &InstanceRef) -> AttemptResult {
        if let Err(e) = self.control.start_instance(instance).await {
            return classify_start_error(&e);
        }

        progress(format!(
            "Start accepted, waiting up to {}s for running state",
            self.wait_timeout.as_secs()
        ));

        match self
            .control
            .wait_until_running(instance, self.wait_timeout)
            .await
        {
            Ok(WaitStatus::Running) => AttemptResult::Started,
            Ok(WaitStatus::TimedOut) => {
                warn!(
                    "Instance {} did not reach running within {:?}",
                    instance, self.wait_timeout
                );
                AttemptResult::WaitTimedOut
            }
            Err(e) => {
                warn!("Waiting for instance {} failed: {}", instance, e);
                AttemptResult::WaitTimedOut
            }
        }
    }

    fn exhausted(&self, last: AttemptResult, attempts: u32, started: Instant) -> RunOutcome {
        let elapsed = started.elapsed();
        match last {
            AttemptResult::CapacityExhausted => RunOutcome::FailedCapacity { elapsed, attempts },
            _ => RunOutcome::FailedOther {
                elapsed,
                attempts,
                message: format!(
                    "instance did not reach running state within {}s",
                    self.wait_timeout.as_secs()
                ),
            },
        }
    }

    async fn notify(&self, instance: &InstanceRef, outcome: &RunOutcome) {
        let message = outcome.message(instance);
        match self.notifier.notify(&message).await {
            Ok(()) => info!("Notification sent for instance {}", instance),
            Err(e) => warn!("Failed to deliver notification: {}", e),
        }
    }
}

/// Maps a rejected start request onto an attempt result
fn classify_start_error(error: &ClientError) -> AttemptResult {
    if error.is_capacity_exhausted() {
        progress("Insufficient capacity".yellow());
        AttemptResult::CapacityExhausted
    } else if error.is_not_found() {
        AttemptResult::NotFound
    } else {
        AttemptResult::OtherError(error.to_string())
    }
}

fn progress(message: impl std::fmt::Display) {
    println!("  {} {}", "▸".cyan(), message);
}

fn print_outcome(instance: &InstanceRef, outcome: &RunOutcome) {
    let message = outcome.message(instance);
    if outcome.is_success() {
        println!("{} {}", "✓".green().bold(), message.green());
    } else {
        println!("{} {}", "✗".red().bold(), message.red());
    }
}
