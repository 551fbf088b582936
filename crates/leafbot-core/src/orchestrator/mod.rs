//! Harvest cycle orchestration.
//!
//! [`CycleOrchestrator`] owns the readiness state and drives one cycle at a
//! time through capture, gating, sequencing, execution and logging.
//! [`ContinuousScheduler`] repeats cycles on a fixed interval until
//! cancelled.

mod cycle;
mod report;
mod scheduler;

pub use cycle::{Collaborators, CycleOrchestrator, CyclePhase, DetectionTest, OrchestratorStatus};
pub use report::{CycleFailure, CycleReport, CycleStats, FailureKind, SkipReason};
pub use scheduler::{ContinuousScheduler, SchedulerSummary, DEFAULT_INTERVAL};
