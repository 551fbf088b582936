//! System bring-up.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::collaborators::{CaptureProvider, RobotController};
use crate::error::{Error, Result};
use crate::types::SystemState;

/// What came up during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    /// Whether the stereo rig initialized. The system is usable without it.
    pub vision_ready: bool,
}

/// Brings up the robot and stereo rig in a fixed order.
///
/// Order: detection model check, robot initialize, workspace calibration,
/// stereo initialize. The robot is mandatory; the stereo rig is not.
pub struct SystemInitializer {
    detection_model: PathBuf,
    robot: Arc<dyn RobotController>,
    capture: Arc<dyn CaptureProvider>,
}

impl SystemInitializer {
    pub fn new(
        detection_model: impl Into<PathBuf>,
        robot: Arc<dyn RobotController>,
        capture: Arc<dyn CaptureProvider>,
    ) -> Self {
        Self {
            detection_model: detection_model.into(),
            robot,
            capture,
        }
    }

    /// Run bring-up and record the resulting readiness in `state`.
    ///
    /// On error `state` is `Failed`. No retries are attempted here.
    pub async fn initialize(&self, state: &mut SystemState) -> Result<InitReport> {
        match self.bring_up().await {
            Ok(report) => {
                *state = SystemState::Ready;
                info!(vision_ready = report.vision_ready, "System ready");
                Ok(report)
            }
            Err(e) => {
                *state = SystemState::Failed;
                Err(e)
            }
        }
    }

    async fn bring_up(&self) -> Result<InitReport> {
        if !self.detection_model.exists() {
            return Err(Error::ModelNotFound(self.detection_model.clone()));
        }

        match self.robot.initialize().await {
            Ok(true) => {}
            Ok(false) => return Err(Error::RobotInit("robot controller reported failure".into())),
            Err(e @ Error::RobotInit(_)) => return Err(e),
            Err(e) => return Err(Error::RobotInit(e.to_string())),
        }
        info!("Robot initialized");

        self.robot.calibrate_workspace().await.map_err(|e| match e {
            Error::Calibration(_) => e,
            other => Error::Calibration(other.to_string()),
        })?;
        info!("Workspace calibrated");

        let vision_ready = match self.capture.initialize().await {
            Ok(true) => {
                info!(capture = %self.capture.describe(), "Stereo vision initialized");
                true
            }
            Ok(false) => {
                warn!(capture = %self.capture.describe(), "Stereo vision initialization failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Stereo vision initialization failed");
                false
            }
        };

        Ok(InitReport { vision_ready })
    }
}
