//! Typed cycle results and running statistics.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

use crate::types::{CycleOutcome, StatusMarker, SystemState};

/// Failure taxonomy shared by logs, status output and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Initialization,
    Capture,
    Inference,
    DetectionEmpty,
    Execution,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Initialization => "initialization_failure",
            FailureKind::Capture => "capture_failure",
            FailureKind::Inference => "inference_failure",
            FailureKind::DetectionEmpty => "detection_empty",
            FailureKind::Execution => "execution_failure",
        };
        f.write_str(name)
    }
}

/// Why a cycle ended before reaching the robot.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// `run_once` was called before a successful initialization.
    NotReady { state: SystemState },
    /// The gate judged the crop not ready for harvest.
    StageNotReady { stage_label: String },
    /// Inference failed and the fallback policy holds the cycle.
    HeldForReview,
    /// The detector returned no candidates.
    NoCandidates { stage_label: String },
}

/// Why a cycle was aborted.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleFailure {
    /// No usable stereo pair, or the capture file could not be written.
    Capture(String),
    /// The robot faulted while executing the sequence.
    Execution(String),
    /// The cycle panicked; caught by the scheduler.
    Aborted(String),
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleReport {
    Harvested {
        outcome: CycleOutcome,
        /// `None` when the log could not be written.
        log_path: Option<PathBuf>,
    },
    Skipped(SkipReason),
    Failed(CycleFailure),
}

impl CycleReport {
    /// True when the robot harvested at least one leaf.
    pub fn succeeded(&self) -> bool {
        matches!(self, CycleReport::Harvested { outcome, .. } if outcome.harvest_count > 0)
    }

    pub fn outcome(&self) -> Option<&CycleOutcome> {
        match self {
            CycleReport::Harvested { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CycleReport::Harvested { .. } => None,
            CycleReport::Skipped(SkipReason::NotReady { .. }) => Some(FailureKind::Initialization),
            CycleReport::Skipped(SkipReason::StageNotReady { .. }) => None,
            CycleReport::Skipped(SkipReason::HeldForReview) => Some(FailureKind::Inference),
            CycleReport::Skipped(SkipReason::NoCandidates { .. }) => {
                Some(FailureKind::DetectionEmpty)
            }
            CycleReport::Failed(CycleFailure::Capture(_)) => Some(FailureKind::Capture),
            CycleReport::Failed(CycleFailure::Execution(_) | CycleFailure::Aborted(_)) => {
                Some(FailureKind::Execution)
            }
        }
    }

    pub fn marker(&self) -> StatusMarker {
        match self {
            CycleReport::Harvested { outcome, log_path } => {
                if outcome.harvest_count > 0 && log_path.is_some() {
                    StatusMarker::Success
                } else {
                    StatusMarker::Warning
                }
            }
            CycleReport::Skipped(SkipReason::NotReady { .. }) => StatusMarker::Failure,
            CycleReport::Skipped(_) => StatusMarker::Warning,
            CycleReport::Failed(_) => StatusMarker::Failure,
        }
    }

    /// One-line operator message.
    pub fn summary(&self) -> String {
        match self {
            CycleReport::Harvested { outcome, log_path } => {
                let mut line = format!(
                    "수확 완료: {}/{}",
                    outcome.harvest_count, outcome.attempted_count
                );
                if log_path.is_none() {
                    line.push_str(" (로그 저장 실패)");
                }
                line
            }
            CycleReport::Skipped(SkipReason::NotReady { .. }) => {
                "시스템이 초기화되지 않았습니다".to_string()
            }
            CycleReport::Skipped(SkipReason::StageNotReady { stage_label }) => format!(
                "아직 수확 단계가 아니므로 로봇팔 동작 생략 (예측 단계: {stage_label})"
            ),
            CycleReport::Skipped(SkipReason::HeldForReview) => {
                "생육 단계 판정 실패 - 작업자 확인 대기".to_string()
            }
            CycleReport::Skipped(SkipReason::NoCandidates { .. }) => {
                "수확 가능한 잎이 없습니다".to_string()
            }
            CycleReport::Failed(CycleFailure::Capture(msg)) => {
                format!("스테레오 이미지 캡처 실패: {msg}")
            }
            CycleReport::Failed(CycleFailure::Execution(msg)) => {
                format!("수확 중 오류 발생: {msg}")
            }
            CycleReport::Failed(CycleFailure::Aborted(msg)) => {
                format!("수확 사이클 비정상 종료: {msg}")
            }
        }
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker(), self.summary())
    }
}

/// Running totals across cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleStats {
    pub cycles: usize,
    pub harvested: usize,
    pub skipped: usize,
    pub failed: usize,
    pub leaves_attempted: usize,
    pub leaves_harvested: usize,
    pub last_cycle_at: Option<DateTime<Local>>,
}

impl CycleStats {
    pub fn observe(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.last_cycle_at = Some(Local::now());
        match report {
            CycleReport::Harvested { outcome, .. } => {
                self.harvested += 1;
                self.leaves_attempted += outcome.attempted_count;
                self.leaves_harvested += outcome.harvest_count;
            }
            CycleReport::Skipped(_) => self.skipped += 1,
            CycleReport::Failed(_) => self.failed += 1,
        }
    }
}
