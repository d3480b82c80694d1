//! Ignite Client
//!
//! Adapters to the external systems the ignite CLI depends on: the EC2 control
//! plane (through the `aws` CLI), the local docker engine and an outcome
//! notification webhook.
//!
//! Each adapter sits behind a trait so the services using it can be tested
//! with scripted fakes.
//!
//! # Example
//!
//! ```no_run
//! use ignite_client::{AwsCli, InstanceControl};
//! use ignite_core::domain::instance::InstanceRef;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let aws = AwsCli::new().with_region(Some("us-east-1".to_string()));
//!     aws.check_available().await?;
//!
//!     let instance = InstanceRef::new("i-0123456789abcdef0").expect("non-empty id");
//!     let state = aws.describe_instance(&instance).await?;
//!
//!     println!("{} is {}", instance, state);
//!     Ok(())
//! }
//! ```

mod aws;
mod control;
pub mod docker;
pub mod error;
mod notify;

// Re-export commonly used types
pub use aws::AwsCli;
pub use control::{InstanceControl, WaitStatus};
pub use docker::{DockerCli, DockerEngine};
pub use error::{ClientError, Result};
pub use notify::{DisabledNotifier, Notifier, WebhookNotifier};
