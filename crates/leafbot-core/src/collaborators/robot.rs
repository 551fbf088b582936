//! Robot arm backends.

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::info;

use super::RobotController;
use crate::bridge::{args, CommandSpec};
use crate::error::{Error, Result};
use crate::types::{Frame, LeafCandidate};

/// Drives the arm through an external driver program.
///
/// - `<program> <args..> init` succeeds when the arm is online.
/// - `<program> <args..> calibrate` runs workspace calibration.
/// - `<program> <args..> harvest --left L --right R` reads the leaf sequence
///   as JSON on stdin and prints the number of harvested leaves.
#[derive(Debug, Clone)]
pub struct CommandRobot {
    command: CommandSpec,
}

impl CommandRobot {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }
}

#[async_trait]
impl RobotController for CommandRobot {
    async fn initialize(&self) -> Result<bool> {
        match self.command.run(&args(["init"]), None).await {
            Ok(_) => Ok(true),
            Err(Error::CommandFailed { stderr, .. }) => {
                info!(stderr = %stderr, "Robot driver refused initialization");
                Ok(false)
            }
            Err(e) => Err(Error::RobotInit(e.to_string())),
        }
    }

    async fn calibrate_workspace(&self) -> Result<()> {
        self.command
            .run(&args(["calibrate"]), None)
            .await
            .map_err(|e| Error::Calibration(e.to_string()))?;
        Ok(())
    }

    async fn execute_harvest_sequence(
        &self,
        leaves: &[LeafCandidate],
        left: &Frame,
        right: &Frame,
    ) -> Result<u32> {
        let scratch = TempDir::with_prefix("leafbot-harvest-")?;
        let left_path = scratch.path().join("left.jpg");
        let right_path = scratch.path().join("right.jpg");
        left.write_to(&left_path).await?;
        right.write_to(&right_path).await?;

        let extra = args([
            "harvest".into(),
            "--left".into(),
            left_path.into_os_string(),
            "--right".into(),
            right_path.into_os_string(),
        ]);
        let payload = serde_json::to_vec(leaves)?;

        let stdout = self
            .command
            .run(&extra, Some(&payload))
            .await
            .map_err(|e| Error::execution(e.to_string()))?;

        let text = String::from_utf8_lossy(&stdout);
        text.trim().parse::<u32>().map_err(|_| {
            Error::execution(format!("driver returned a non-numeric count: {:?}", text.trim()))
        })
    }
}

/// Simulated arm: logs each pick and never touches hardware.
#[derive(Debug, Clone)]
pub struct DryRunRobot {
    max_picks: usize,
}

impl DryRunRobot {
    pub fn new(max_picks: usize) -> Self {
        Self { max_picks }
    }
}

impl Default for DryRunRobot {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl RobotController for DryRunRobot {
    async fn initialize(&self) -> Result<bool> {
        info!("Dry-run robot online");
        Ok(true)
    }

    async fn calibrate_workspace(&self) -> Result<()> {
        info!("Dry-run workspace calibration complete");
        Ok(())
    }

    async fn execute_harvest_sequence(
        &self,
        leaves: &[LeafCandidate],
        _left: &Frame,
        _right: &Frame,
    ) -> Result<u32> {
        let picks = leaves.len().min(self.max_picks);
        for leaf in leaves.iter().take(picks) {
            info!(
                priority = leaf.harvest_priority,
                center = %leaf.center,
                area = leaf.area,
                "Simulated pick"
            );
        }
        Ok(picks as u32)
    }
}
