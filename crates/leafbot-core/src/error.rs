//! Error types for leafbot-core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using leafbot-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for harvest operations
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    // System lifecycle errors
    #[error("System is not ready (state: {0})")]
    NotReady(String),

    #[error("Robot initialization failed: {0}")]
    RobotInit(String),

    #[error("Workspace calibration failed: {0}")]
    Calibration(String),

    // Perception errors
    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    // Actuation errors
    #[error("Harvest execution failed: {0}")]
    Execution(String),

    // External process errors
    #[error("Program not found: {0}")]
    ProgramNotFound(String),

    #[error("Command failed: {cmd}\n{stderr}")]
    CommandFailed { cmd: String, stderr: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an error from a command failure
    pub fn command_failed(cmd: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            cmd: cmd.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a capture error
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture(message.into())
    }

    /// Create a prediction error
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction(message.into())
    }

    /// Create a detection error
    pub fn detection(message: impl Into<String>) -> Self {
        Self::Detection(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::command_failed("detector detect", "model missing");
        assert!(err.to_string().contains("detector detect"));
        assert!(err.to_string().contains("model missing"));

        let err = Error::ModelNotFound(PathBuf::from("weights/best.pt"));
        assert!(err.to_string().contains("weights/best.pt"));

        let err = Error::execution("gripper stalled");
        assert!(matches!(err, Error::Execution(_)));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
