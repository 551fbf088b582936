//! Scoped capture file.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::Frame;

/// The left frame written to disk for the duration of one cycle.
///
/// The gate and the growth-stage model take a file path, so the frame has
/// to live on disk while the cycle runs. The file is removed when the guard
/// is released or dropped, whichever comes first, including while a panic
/// unwinds through the cycle.
#[derive(Debug)]
pub struct CaptureArtifact {
    path: PathBuf,
    released: bool,
}

impl CaptureArtifact {
    /// Write `frame` to `path`. A partially written file is removed on error.
    pub async fn create(path: &Path, frame: &Frame) -> Result<Self> {
        // Owns the path from here on, so a failed write is cleaned up too.
        let artifact = Self {
            path: path.to_path_buf(),
            released: false,
        };
        frame.write_to(path).await?;
        debug!(path = %path.display(), bytes = frame.len(), "Capture file written");
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now and report whether that worked.
    pub fn release(mut self) -> std::io::Result<()> {
        self.released = true;
        remove_if_present(&self.path)
    }
}

impl Drop for CaptureArtifact {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_if_present(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove capture file");
        }
    }
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
