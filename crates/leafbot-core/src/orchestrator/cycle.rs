//! Single harvest cycle.

use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::report::{CycleFailure, CycleReport, CycleStats, SkipReason};
use crate::collaborators::{CaptureProvider, GrowthStagePredictor, LeafDetector, RobotController};
use crate::config::HarvestConfig;
use crate::error::{Error, Result};
use crate::harvest::{
    CaptureArtifact, CycleLogger, DecisionSource, GrowthStageGate, HarvestExecutor,
    HarvestSequencer, InitReport, SystemInitializer,
};
use crate::types::{CycleOutcome, Frame, LeafCandidate, SystemState};

/// The four subsystems a harvest rig is built from.
#[derive(Clone)]
pub struct Collaborators {
    pub robot: Arc<dyn RobotController>,
    pub capture: Arc<dyn CaptureProvider>,
    pub detector: Arc<dyn LeafDetector>,
    pub predictor: Arc<dyn GrowthStagePredictor>,
}

/// Where the orchestrator currently is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    Capturing,
    Gating,
    Sequencing,
    Executing,
    Logging,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Capturing => "capturing",
            CyclePhase::Gating => "gating",
            CyclePhase::Sequencing => "sequencing",
            CyclePhase::Executing => "executing",
            CyclePhase::Logging => "logging",
        };
        f.write_str(name)
    }
}

/// Snapshot for status output.
#[derive(Debug, Clone)]
pub struct OrchestratorStatus {
    pub state: SystemState,
    pub phase: CyclePhase,
    pub capture: String,
    pub stats: CycleStats,
    pub last_report: Option<CycleReport>,
}

/// Result of a detection test on a single image.
#[derive(Debug, Clone)]
pub struct DetectionTest {
    pub leaves: Vec<LeafCandidate>,
    /// Annotated copy of the input; `None` when nothing was detected.
    pub annotated: Option<PathBuf>,
}

/// Drives harvest cycles against one rig.
///
/// ```text
///   Idle ─► Capturing ─► Gating ─► Sequencing ─► Executing ─► Logging ─► Idle
///             │            │           │              │
///             └─ failed    └─ skipped  └─ skipped     └─ failed
/// ```
///
/// The capture file exists only between Capturing and the end of Executing.
/// Every exit path, including a panic, removes it.
pub struct CycleOrchestrator {
    config: HarvestConfig,
    state: SystemState,
    phase: CyclePhase,
    capture: Arc<dyn CaptureProvider>,
    detector: Arc<dyn LeafDetector>,
    initializer: SystemInitializer,
    gate: GrowthStageGate,
    sequencer: HarvestSequencer,
    executor: HarvestExecutor,
    logger: CycleLogger,
    stats: CycleStats,
    last_report: Option<CycleReport>,
}

impl CycleOrchestrator {
    /// Build an orchestrator. Nothing is initialized yet.
    pub fn new(config: HarvestConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;

        let Collaborators {
            robot,
            capture,
            detector,
            predictor,
        } = collaborators;

        Ok(Self {
            initializer: SystemInitializer::new(
                config.detection_model.clone(),
                robot.clone(),
                capture.clone(),
            ),
            gate: GrowthStageGate::new(
                predictor,
                config.growth_model.clone(),
                config.harvest_marker.clone(),
                config.inference_fallback,
            ),
            sequencer: HarvestSequencer::new(detector.clone()),
            executor: HarvestExecutor::new(robot),
            logger: CycleLogger::new(config.log_dir.clone()),
            capture,
            detector,
            config,
            state: SystemState::Uninitialized,
            phase: CyclePhase::Idle,
            stats: CycleStats::default(),
            last_report: None,
        })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            state: self.state,
            phase: self.phase,
            capture: self.capture.describe(),
            stats: self.stats.clone(),
            last_report: self.last_report.clone(),
        }
    }

    /// Bring the rig up. May be called again after a failure.
    pub async fn initialize(&mut self) -> Result<InitReport> {
        info!("Initializing harvest system");
        let result = self.initializer.initialize(&mut self.state).await;
        if let Err(e) = &result {
            error!(error = %e, "System initialization failed");
        }
        result
    }

    /// Run one cycle and report whether at least one leaf was harvested.
    pub async fn run_once(&mut self) -> bool {
        self.run_cycle().await.succeeded()
    }

    /// Run one cycle and return its full report.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", %cycle_id);
        let report = self.cycle(cycle_id).instrument(span).await;
        self.finish(report)
    }

    /// Record a cycle that panicked before producing a report.
    pub(crate) fn recover_from_panic(&mut self, message: String) -> CycleReport {
        error!(phase = %self.phase, panic = %message, "Harvest cycle panicked");
        self.finish(CycleReport::Failed(CycleFailure::Aborted(message)))
    }

    fn finish(&mut self, report: CycleReport) -> CycleReport {
        self.enter(CyclePhase::Idle);
        self.stats.observe(&report);

        match &report {
            CycleReport::Harvested { .. } => info!(summary = %report, "Harvest cycle complete"),
            CycleReport::Skipped(_) => info!(summary = %report, "Harvest cycle skipped"),
            CycleReport::Failed(_) => warn!(
                summary = %report,
                kind = ?report.failure_kind(),
                "Harvest cycle failed"
            ),
        }

        self.last_report = Some(report.clone());
        report
    }

    fn enter(&mut self, phase: CyclePhase) {
        debug!(from = %self.phase, to = %phase, "Cycle phase");
        self.phase = phase;
    }

    async fn cycle(&mut self, cycle_id: Uuid) -> CycleReport {
        if !self.state.is_ready() {
            warn!(state = %self.state, "System not initialized; cycle skipped");
            return CycleReport::Skipped(SkipReason::NotReady { state: self.state });
        }

        self.enter(CyclePhase::Capturing);
        let frames = match self.capture.acquire_pair().await {
            Ok(frames) => frames,
            Err(e) => return CycleReport::Failed(CycleFailure::Capture(e.to_string())),
        };
        let artifact = match CaptureArtifact::create(&self.config.capture_path, &frames.left).await
        {
            Ok(artifact) => artifact,
            Err(e) => return CycleReport::Failed(CycleFailure::Capture(e.to_string())),
        };

        self.enter(CyclePhase::Gating);
        let decision = self
            .gate
            .evaluate(artifact.path(), self.config.planting_date)
            .await;
        if !decision.proceed {
            release(artifact);
            return match decision.source {
                DecisionSource::Fallback => CycleReport::Skipped(SkipReason::HeldForReview),
                DecisionSource::Model => CycleReport::Skipped(SkipReason::StageNotReady {
                    stage_label: decision.stage_label,
                }),
            };
        }

        self.enter(CyclePhase::Sequencing);
        let leaves = self.sequencer.sequence(&frames.left).await;
        if leaves.is_empty() {
            release(artifact);
            return CycleReport::Skipped(SkipReason::NoCandidates {
                stage_label: decision.stage_label,
            });
        }

        self.enter(CyclePhase::Executing);
        let executed = self.executor.execute(self.state, &leaves, frames).await;
        release(artifact);

        let reported = match executed {
            Ok(count) => count,
            Err(e) => return CycleReport::Failed(CycleFailure::Execution(e.to_string())),
        };

        self.enter(CyclePhase::Logging);
        let outcome = CycleOutcome::new(
            cycle_id,
            leaves.len(),
            reported,
            decision.stage_label,
            Local::now(),
        );
        let log_path = match self
            .logger
            .write(&outcome, &leaves, self.config.planting_date)
            .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, log_dir = %self.logger.log_dir().display(), "Failed to write harvest log");
                None
            }
        };

        CycleReport::Harvested { outcome, log_path }
    }

    /// Detect leaves on a stored image and save an annotated copy.
    ///
    /// Never touches the robot and does not require initialization.
    pub async fn test_detection(&self, image_path: &Path) -> Result<DetectionTest> {
        let image = Frame::read(image_path).await?;

        let leaves = self.detector.get_harvest_sequence(&image).await?;
        info!(image = %image_path.display(), count = leaves.len(), "Detection test");
        if leaves.is_empty() {
            return Ok(DetectionTest {
                leaves,
                annotated: None,
            });
        }

        let annotated = self.detector.visualize(&image, &leaves).await?;
        let output = self.config.detection_output_dir.join(format!(
            "detection_result_{}.jpg",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        annotated.write_to(&output).await.map_err(|e| match e {
            Error::Io(io) => Error::detection(format!(
                "failed to save {}: {io}",
                output.display()
            )),
            other => other,
        })?;
        info!(path = %output.display(), "Detection result saved");

        Ok(DetectionTest {
            leaves,
            annotated: Some(output),
        })
    }
}

fn release(artifact: CaptureArtifact) {
    let path = artifact.path().to_path_buf();
    if let Err(e) = artifact.release() {
        warn!(path = %path.display(), error = %e, "Failed to remove capture file");
    }
}
