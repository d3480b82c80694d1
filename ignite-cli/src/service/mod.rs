//! Service layer
//!
//! Services contain the business logic of the CLI. They drive the external
//! adapters from `ignite-client` and print operator-facing progress.
//!
//! Adapters are injected as trait objects so the services can be tested with fakes.

mod orchestrator;
mod reaper;
mod sleeper;

pub use orchestrator::StartOrchestrator;
pub use reaper::Reaper;
