//! Harvest cycle stages.
//!
//! Each stage wraps one collaborator and returns a typed result; the
//! orchestrator decides what a stage's result means for the cycle.

mod artifact;
mod cycle_log;
mod executor;
mod gate;
mod initializer;
mod sequencer;

pub use artifact::CaptureArtifact;
pub use cycle_log::CycleLogger;
pub use executor::HarvestExecutor;
pub use gate::{DecisionSource, GateDecision, GrowthStageGate, HELD_LABEL};
pub use initializer::{InitReport, SystemInitializer};
pub use sequencer::HarvestSequencer;
