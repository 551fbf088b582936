//! Shared domain types for harvest cycles.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Perception
// ─────────────────────────────────────────────────────────────────────────────

/// Pixel coordinate in a captured frame.
///
/// Serialized as a two-element array `[x, y]`, which is what detector
/// bridges emit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One detected, harvestable leaf.
///
/// The detector owns the ordering: index 0 of a harvest sequence is picked
/// first, and `harvest_priority` mirrors that rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafCandidate {
    #[serde(rename = "class", alias = "class_label")]
    pub class_label: String,
    pub center: Point,
    pub area: f64,
    pub confidence: f64,
    #[serde(default)]
    pub maturity_score: f64,
    pub harvest_priority: u32,
}

/// An encoded image as produced by a capture source.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Read an encoded image from disk. Empty files are rejected.
    pub async fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ImageNotFound(path.to_path_buf()));
        }
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(Error::capture(format!("empty image: {}", path.display())));
        }
        Ok(Self { bytes })
    }

    /// Write the encoded image to disk, creating parent directories.
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &self.bytes).await?;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame").field("len", &self.bytes.len()).finish()
    }
}

/// Left/right images captured for a single cycle.
#[derive(Debug, Clone)]
pub struct StereoFramePair {
    pub left: Frame,
    pub right: Frame,
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth stage
// ─────────────────────────────────────────────────────────────────────────────

/// Coarse lettuce maturity stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Transplant,
    Vegetative,
    Harvest,
}

impl GrowthStage {
    /// Label used by the growth-stage model and in harvest logs.
    pub fn label(&self) -> &'static str {
        match self {
            GrowthStage::Transplant => "정식기",
            GrowthStage::Vegetative => "생육기",
            GrowthStage::Harvest => "수확기",
        }
    }

    /// Stage expected from the calendar alone.
    pub fn from_days_since_planting(days: i64) -> Self {
        if days <= 7 {
            GrowthStage::Transplant
        } else if days <= 21 {
            GrowthStage::Vegetative
        } else {
            GrowthStage::Harvest
        }
    }

    /// Find the stage named in a free-form label such as `"🎯 수확기"`.
    pub fn from_label(label: &str) -> Option<Self> {
        [
            GrowthStage::Transplant,
            GrowthStage::Vegetative,
            GrowthStage::Harvest,
        ]
        .into_iter()
        .find(|stage| label.contains(stage.label()))
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured answer from a growth-stage predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPrediction {
    #[serde(alias = "AI_예측_단계")]
    pub stage_label: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, alias = "경과_일수")]
    pub days_since_planting: Option<i64>,
    #[serde(default, alias = "종합_판단")]
    pub recommendation: Option<String>,
}

impl GrowthPrediction {
    pub fn from_label(label: impl Into<String>) -> Self {
        Self {
            stage_label: label.into(),
            confidence: None,
            days_since_planting: None,
            recommendation: None,
        }
    }

    pub fn stage(&self) -> Option<GrowthStage> {
        GrowthStage::from_label(&self.stage_label)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cycle bookkeeping
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a cycle that reached the robot.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub cycle_id: Uuid,
    pub attempted_count: usize,
    pub harvest_count: usize,
    pub stage_label: String,
    pub timestamp: DateTime<Local>,
}

impl CycleOutcome {
    /// Build an outcome, clamping the robot's report to the attempted count.
    pub fn new(
        cycle_id: Uuid,
        attempted_count: usize,
        reported_harvest: u32,
        stage_label: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        let reported = reported_harvest as usize;
        if reported > attempted_count {
            warn!(
                cycle_id = %cycle_id,
                reported,
                attempted_count,
                "Robot reported more picks than leaves attempted; clamping"
            );
        }

        Self {
            cycle_id,
            attempted_count,
            harvest_count: reported.min(attempted_count),
            stage_label: stage_label.into(),
            timestamp,
        }
    }
}

/// Process-wide readiness of the harvest rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    #[default]
    Uninitialized,
    Ready,
    Failed,
}

impl SystemState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SystemState::Ready)
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemState::Uninitialized => write!(f, "uninitialized"),
            SystemState::Ready => write!(f, "ready"),
            SystemState::Failed => write!(f, "failed"),
        }
    }
}

/// Operator-facing marker attached to every reported decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMarker {
    Success,
    Failure,
    Warning,
}

impl StatusMarker {
    pub fn symbol(&self) -> &'static str {
        match self {
            StatusMarker::Success => "✓",
            StatusMarker::Failure => "✗",
            StatusMarker::Warning => "⚠",
        }
    }
}

impl fmt::Display for StatusMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
