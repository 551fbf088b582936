//! Continuous monitoring loop.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::cycle::CycleOrchestrator;
use super::report::CycleReport;

/// Default pause between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Totals for one monitoring run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub cycles: usize,
    pub succeeded: usize,
    pub panics: usize,
}

/// Runs cycles back to back with a fixed pause until cancelled.
///
/// A cycle that fails, or panics, is recorded and the loop moves on to the
/// next one. Cancellation is checked before every cycle and interrupts the
/// pause; a cycle already running is allowed to finish.
#[derive(Debug, Clone)]
pub struct ContinuousScheduler {
    interval: Duration,
    max_cycles: Option<usize>,
}

impl Default for ContinuousScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl ContinuousScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_cycles: None,
        }
    }

    /// Stop on its own after `cycles` cycles.
    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn run(
        &self,
        orchestrator: &mut CycleOrchestrator,
        cancel: &CancellationToken,
    ) -> SchedulerSummary {
        self.run_with(orchestrator, cancel, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_cycle` after every cycle.
    pub async fn run_with<F>(
        &self,
        orchestrator: &mut CycleOrchestrator,
        cancel: &CancellationToken,
        mut on_cycle: F,
    ) -> SchedulerSummary
    where
        F: FnMut(&CycleReport),
    {
        info!(
            interval_secs = self.interval.as_secs(),
            max_cycles = ?self.max_cycles,
            "Continuous monitoring started"
        );

        let mut summary = SchedulerSummary::default();

        loop {
            if cancel.is_cancelled() {
                break;
            }
            if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            let report = match AssertUnwindSafe(orchestrator.run_cycle())
                .catch_unwind()
                .await
            {
                Ok(report) => report,
                Err(panic) => {
                    summary.panics += 1;
                    orchestrator.recover_from_panic(panic_message(&*panic))
                }
            };

            summary.cycles += 1;
            if report.succeeded() {
                summary.succeeded += 1;
            }
            on_cycle(&report);

            if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        if summary.panics > 0 {
            error!(panics = summary.panics, "Cycles panicked during monitoring");
        }
        info!(
            cycles = summary.cycles,
            succeeded = summary.succeeded,
            "Continuous monitoring stopped"
        );
        summary
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
