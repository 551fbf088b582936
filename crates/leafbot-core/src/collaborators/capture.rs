//! Stereo capture backends.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::CaptureProvider;
use crate::bridge::{args, CommandSpec};
use crate::error::{Error, Result};
use crate::types::{Frame, StereoFramePair};

/// Reads the stereo pair from two still images on disk.
///
/// Stands in for live capture while the camera rig is being commissioned.
#[derive(Debug, Clone)]
pub struct FileCapture {
    left: PathBuf,
    right: PathBuf,
}

impl FileCapture {
    pub fn new(left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Default for FileCapture {
    fn default() -> Self {
        Self::new("left_camera.jpg", "right_camera.jpg")
    }
}

#[async_trait]
impl CaptureProvider for FileCapture {
    async fn initialize(&self) -> Result<bool> {
        let ready = self.left.exists() && self.right.exists();
        if !ready {
            warn!(
                left = %self.left.display(),
                right = %self.right.display(),
                "Stereo still images not found"
            );
        }
        Ok(ready)
    }

    async fn acquire_pair(&self) -> Result<StereoFramePair> {
        let left = Frame::read(&self.left)
            .await
            .map_err(|e| Error::capture(format!("left image: {e}")))?;
        let right = Frame::read(&self.right)
            .await
            .map_err(|e| Error::capture(format!("right image: {e}")))?;
        debug!(left = left.len(), right = right.len(), "Loaded stereo stills");
        Ok(StereoFramePair { left, right })
    }

    fn describe(&self) -> String {
        format!("files ({}, {})", self.left.display(), self.right.display())
    }
}

/// Triggers a live stereo capture through an external program.
///
/// Invoked as `<program> <args..> --left <path> --right <path>`; the
/// program writes both images and exits 0.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    command: CommandSpec,
    left: PathBuf,
    right: PathBuf,
}

impl CommandCapture {
    pub fn new(command: CommandSpec, left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self {
            command,
            left: left.into(),
            right: right.into(),
        }
    }

    /// Remove leftover images so a grabber that fails to write cannot be
    /// mistaken for a fresh capture.
    async fn remove_stale(&self) -> Result<()> {
        for path in [&self.left, &self.right] {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove stale capture image"
                    );
                    return Err(Error::capture(format!(
                        "stale image {} could not be removed: {e}",
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CaptureProvider for CommandCapture {
    async fn initialize(&self) -> Result<bool> {
        if !self.command.is_available() {
            warn!(program = %self.command.program, "Capture program not found");
            return Ok(false);
        }
        Ok(true)
    }

    async fn acquire_pair(&self) -> Result<StereoFramePair> {
        // Never hand out frames from a previous cycle.
        self.remove_stale().await?;

        let extra = args([
            "--left".into(),
            self.left.clone().into_os_string(),
            "--right".into(),
            self.right.clone().into_os_string(),
        ]);
        self.command
            .run(&extra, None)
            .await
            .map_err(|e| Error::capture(e.to_string()))?;

        let left = Frame::read(&self.left).await;
        let right = Frame::read(&self.right).await;
        if let Err(e) = self.remove_stale().await {
            debug!(error = %e, "Capture images left on disk");
        }

        Ok(StereoFramePair {
            left: left.map_err(|e| Error::capture(format!("left image: {e}")))?,
            right: right.map_err(|e| Error::capture(format!("right image: {e}")))?,
        })
    }

    fn describe(&self) -> String {
        format!("camera ({})", self.command.program)
    }
}
