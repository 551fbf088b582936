//! leafbot-core - Harvest orchestration for the lettuce picking rig
//!
//! This crate holds everything the `leafbot` CLI drives:
//!
//! - **types**: Leaves, frames, growth stages and cycle outcomes
//! - **config**: Fixed rig configuration
//! - **collaborators**: Robot, capture, detector and predictor interfaces
//!   plus their command-bridge and offline backends
//! - **bridge**: External process invocation for model and driver bridges
//! - **harvest**: Individual cycle stages (bring-up, gate, sequencing,
//!   execution, logging)
//! - **orchestrator**: Cycle state machine and continuous scheduler

pub mod bridge;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod harvest;
pub mod orchestrator;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{HarvestConfig, InferenceFallback};
pub use error::{Error, Result};
pub use orchestrator::{
    Collaborators, ContinuousScheduler, CycleOrchestrator, CycleReport, SchedulerSummary,
};
pub use types::{CycleOutcome, GrowthStage, LeafCandidate, SystemState};
