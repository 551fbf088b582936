//! Physical harvest execution.

use std::sync::Arc;
use tracing::info;

use crate::collaborators::RobotController;
use crate::error::{Error, Result};
use crate::types::{LeafCandidate, StereoFramePair, SystemState};

/// Hands the leaf sequence to the robot.
///
/// Actuation is not reversible: callers invoke this at most once per cycle
/// and handle its errors themselves.
pub struct HarvestExecutor {
    robot: Arc<dyn RobotController>,
}

impl HarvestExecutor {
    pub fn new(robot: Arc<dyn RobotController>) -> Self {
        Self { robot }
    }

    /// Execute the sequence and return the robot's harvest count.
    ///
    /// Refuses to move unless `state` is `Ready`. The frames are consumed.
    pub async fn execute(
        &self,
        state: SystemState,
        leaves: &[LeafCandidate],
        frames: StereoFramePair,
    ) -> Result<u32> {
        if !state.is_ready() {
            return Err(Error::NotReady(state.to_string()));
        }

        info!(leaves = leaves.len(), "Executing harvest sequence");
        let StereoFramePair { left, right } = frames;
        self.robot
            .execute_harvest_sequence(leaves, &left, &right)
            .await
    }
}
