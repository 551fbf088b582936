//! Harvest configuration.
//!
//! Everything the orchestrator needs to know about the rig's fixed setup
//! (planting date, model artifacts, scratch and log locations) is carried by
//! [`HarvestConfig`] and handed to the orchestrator at construction time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::GrowthStage;

/// What the growth-stage gate does when the predictor cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceFallback {
    /// Treat the crop as harvest-ready and keep going.
    #[default]
    Proceed,
    /// Skip the cycle and leave the decision to an operator.
    Hold,
}

/// Fixed configuration of one harvest rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Planting date of the current crop
    #[serde(default = "default_planting_date")]
    pub planting_date: NaiveDate,

    /// Leaf detection model weights; must exist before initialization
    #[serde(default = "default_detection_model")]
    pub detection_model: PathBuf,

    /// Growth-stage model checkpoint
    #[serde(default = "default_growth_model")]
    pub growth_model: PathBuf,

    /// Scratch file holding the left frame during a cycle
    #[serde(default = "default_capture_path")]
    pub capture_path: PathBuf,

    /// Directory for harvest logs
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Directory for annotated detection test images
    #[serde(default = "default_detection_output_dir")]
    pub detection_output_dir: PathBuf,

    /// Substring of a stage label that means "ready to harvest"
    #[serde(default = "default_harvest_marker")]
    pub harvest_marker: String,

    /// Gate behaviour when inference fails
    #[serde(default)]
    pub inference_fallback: InferenceFallback,
}

// Default value functions
fn default_planting_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 20).unwrap_or_default()
}

fn default_detection_model() -> PathBuf {
    PathBuf::from("runs/detect/train/weights/best.pt")
}

fn default_growth_model() -> PathBuf {
    PathBuf::from("best_multimodal_lettuce_model.pth")
}

fn default_capture_path() -> PathBuf {
    PathBuf::from("temp_left_image.jpg")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_detection_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_harvest_marker() -> String {
    GrowthStage::Harvest.label().to_string()
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            planting_date: default_planting_date(),
            detection_model: default_detection_model(),
            growth_model: default_growth_model(),
            capture_path: default_capture_path(),
            log_dir: default_log_dir(),
            detection_output_dir: default_detection_output_dir(),
            harvest_marker: default_harvest_marker(),
            inference_fallback: InferenceFallback::default(),
        }
    }
}

impl HarvestConfig {
    /// Reject configurations the orchestrator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.harvest_marker.trim().is_empty() {
            return Err(Error::Config("harvest_marker must not be empty".into()));
        }
        if self.capture_path.as_os_str().is_empty() {
            return Err(Error::Config("capture_path must not be empty".into()));
        }
        if self.capture_path.is_dir() {
            return Err(Error::Config(format!(
                "capture_path points at a directory: {}",
                self.capture_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarvestConfig::default();

        assert_eq!(config.planting_date.to_string(), "2025-06-20");
        assert!(config.detection_model.ends_with("best.pt"));
        assert!(config.capture_path.ends_with("temp_left_image.jpg"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.harvest_marker, "수확기");
        assert_eq!(config.inference_fallback, InferenceFallback::Proceed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"planting_date": "2025-07-01", "inference_fallback": "hold"}"#;
        let config: HarvestConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.planting_date.to_string(), "2025-07-01");
        assert_eq!(config.inference_fallback, InferenceFallback::Hold);
        assert_eq!(config.harvest_marker, "수확기");
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let config = HarvestConfig {
            harvest_marker: "  ".to_string(),
            ..HarvestConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_directory_capture_path() {
        let temp = tempfile::tempdir().unwrap();
        let config = HarvestConfig {
            capture_path: temp.path().to_path_buf(),
            ..HarvestConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
