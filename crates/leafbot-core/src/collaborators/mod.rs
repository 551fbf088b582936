//! Collaborator interfaces consumed by the harvest cycle.
//!
//! The orchestrator never talks to hardware or models directly. Each
//! subsystem sits behind one of these traits so backends can be swapped
//! (file-backed vs live camera, dry-run vs real robot) without touching
//! orchestration logic.
//!
//! ```text
//!   CaptureProvider ──► GrowthStagePredictor ──► LeafDetector ──► RobotController
//!   (stereo pair)       (stage label)             (leaf order)     (picks)
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

use crate::error::Result;
use crate::types::{Frame, GrowthPrediction, LeafCandidate, StereoFramePair};

mod capture;
mod detector;
mod predictor;
mod robot;

pub use capture::{CommandCapture, FileCapture};
pub use detector::CommandDetector;
pub use predictor::{CommandPredictor, DateHeuristicPredictor};
pub use robot::{CommandRobot, DryRunRobot};

/// Robot arm driver.
#[async_trait]
pub trait RobotController: Send + Sync {
    /// Bring the arm online. `Ok(false)` means the firmware refused.
    async fn initialize(&self) -> Result<bool>;

    /// Move through the calibration routine for the harvest workspace.
    async fn calibrate_workspace(&self) -> Result<()>;

    /// Pick the given leaves in order and report how many were harvested.
    ///
    /// This physically actuates the rig.
    async fn execute_harvest_sequence(
        &self,
        leaves: &[LeafCandidate],
        left: &Frame,
        right: &Frame,
    ) -> Result<u32>;
}

/// Source of stereo frame pairs.
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    /// Prepare the capture source. `Ok(false)` means it is not usable yet.
    async fn initialize(&self) -> Result<bool>;

    /// Acquire one stereo pair, or fail.
    async fn acquire_pair(&self) -> Result<StereoFramePair>;

    /// Short human-readable description for status output.
    fn describe(&self) -> String;
}

/// Leaf detector.
#[async_trait]
pub trait LeafDetector: Send + Sync {
    /// Detect harvestable leaves, best-first. An empty sequence is normal.
    async fn get_harvest_sequence(&self, image: &Frame) -> Result<Vec<LeafCandidate>>;

    /// Render the detections onto the image (diagnostics only).
    async fn visualize(&self, image: &Frame, leaves: &[LeafCandidate]) -> Result<Frame>;
}

/// Growth-stage predictor.
#[async_trait]
pub trait GrowthStagePredictor: Send + Sync {
    async fn predict(
        &self,
        model_path: &Path,
        image_path: &Path,
        planting_date: NaiveDate,
        photo_date: NaiveDate,
    ) -> Result<GrowthPrediction>;
}
