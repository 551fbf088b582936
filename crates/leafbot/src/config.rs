//! Configuration management for leafbot.
//!
//! Configuration is loaded from the first source that exists:
//! 1. `--config <path>`
//! 2. `$LEAFBOT_CONFIG`
//! 3. `./leafbot.toml`
//! 4. User config dir (`~/.config/leafbot/leafbot.toml` on Linux)
//! 5. Default values

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use leafbot_core::bridge::CommandSpec;
use leafbot_core::collaborators::{
    CaptureProvider, CommandCapture, CommandDetector, CommandPredictor, CommandRobot,
    DateHeuristicPredictor, DryRunRobot, FileCapture, GrowthStagePredictor, RobotController,
};
use leafbot_core::{Collaborators, HarvestConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const FILE_NAME: &str = "leafbot.toml";
const ENV_VAR: &str = "LEAFBOT_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Rig setup handed to the orchestrator
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Stereo capture backend
    #[serde(default)]
    pub capture: CaptureBackend,

    /// Growth-stage predictor backend
    #[serde(default)]
    pub predictor: PredictorBackend,

    /// Leaf detector backend
    #[serde(default)]
    pub detector: DetectorBackend,

    /// Robot arm backend
    #[serde(default)]
    pub robot: RobotBackend,

    /// Continuous monitoring settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum CaptureBackend {
    /// Two still images on disk
    Files {
        #[serde(default = "default_left_image")]
        left: PathBuf,
        #[serde(default = "default_right_image")]
        right: PathBuf,
    },
    /// External capture program writing both images
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_left_image")]
        left: PathBuf,
        #[serde(default = "default_right_image")]
        right: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PredictorBackend {
    /// Growth-stage model bridge
    Command {
        #[serde(default = "default_predictor_program")]
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Planting-date estimate, no model
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DetectorBackend {
    /// Leaf detection model bridge
    Command {
        #[serde(default = "default_detector_program")]
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RobotBackend {
    /// Log picks without moving anything
    DryRun {
        #[serde(default = "default_max_picks")]
        max_picks: usize,
    },
    /// Robot driver bridge
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Pause between cycles in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

// Default value functions
fn default_left_image() -> PathBuf {
    PathBuf::from("left_camera.jpg")
}

fn default_right_image() -> PathBuf {
    PathBuf::from("right_camera.jpg")
}

fn default_predictor_program() -> String {
    "leafbot-growth".to_string()
}

fn default_detector_program() -> String {
    "leafbot-detect".to_string()
}

fn default_max_picks() -> usize {
    10
}

fn default_interval_secs() -> u64 {
    300
}

impl Default for CaptureBackend {
    fn default() -> Self {
        CaptureBackend::Files {
            left: default_left_image(),
            right: default_right_image(),
        }
    }
}

impl Default for PredictorBackend {
    fn default() -> Self {
        PredictorBackend::Command {
            program: default_predictor_program(),
            args: Vec::new(),
        }
    }
}

impl Default for DetectorBackend {
    fn default() -> Self {
        DetectorBackend::Command {
            program: default_detector_program(),
            args: Vec::new(),
        }
    }
}

impl Default for RobotBackend {
    fn default() -> Self {
        RobotBackend::DryRun {
            max_picks: default_max_picks(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl MonitoringConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl AppConfig {
    /// Load configuration, returning it with the file it came from.
    ///
    /// An explicitly requested file (flag or environment) must exist.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_from(path)?, Some(path.to_path_buf())));
        }

        if let Some(path) = std::env::var_os(ENV_VAR).map(PathBuf::from) {
            return Ok((Self::load_from(&path)?, Some(path)));
        }

        for path in Self::search_paths() {
            if path.exists() {
                return Ok((Self::load_from(&path)?, Some(path)));
            }
        }

        Ok((AppConfig::default(), None))
    }

    /// Load and validate one TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Implicit locations, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(FILE_NAME)];
        if let Some(dir) = user_config_dir() {
            paths.push(dir.join(FILE_NAME));
        }
        paths
    }

    pub fn validate(&self) -> Result<()> {
        self.harvest
            .validate()
            .context("Invalid [harvest] section")?;
        if self.monitoring.interval_secs == 0 {
            bail!("monitoring.interval_secs must be at least 1");
        }
        Ok(())
    }

    /// Bridge programs the configured backends depend on.
    pub fn bridge_commands(&self) -> Vec<(&'static str, CommandSpec)> {
        let mut commands = Vec::new();
        if let CaptureBackend::Command { program, args, .. } = &self.capture {
            commands.push(("capture", spec(program, args)));
        }
        if let PredictorBackend::Command { program, args } = &self.predictor {
            commands.push(("predictor", spec(program, args)));
        }
        let DetectorBackend::Command { program, args } = &self.detector;
        commands.push(("detector", spec(program, args)));
        if let RobotBackend::Command { program, args } = &self.robot {
            commands.push(("robot", spec(program, args)));
        }
        commands
    }

    /// Instantiate the configured backends.
    pub fn build_collaborators(&self) -> Collaborators {
        let capture: Arc<dyn CaptureProvider> = match &self.capture {
            CaptureBackend::Files { left, right } => Arc::new(FileCapture::new(left, right)),
            CaptureBackend::Command {
                program,
                args,
                left,
                right,
            } => Arc::new(CommandCapture::new(spec(program, args), left, right)),
        };

        let predictor: Arc<dyn GrowthStagePredictor> = match &self.predictor {
            PredictorBackend::Command { program, args } => {
                Arc::new(CommandPredictor::new(spec(program, args)))
            }
            PredictorBackend::Date => Arc::new(DateHeuristicPredictor),
        };

        let DetectorBackend::Command { program, args } = &self.detector;
        let detector = Arc::new(CommandDetector::new(spec(program, args)));

        let robot: Arc<dyn RobotController> = match &self.robot {
            RobotBackend::DryRun { max_picks } => Arc::new(DryRunRobot::new(*max_picks)),
            RobotBackend::Command { program, args } => {
                Arc::new(CommandRobot::new(spec(program, args)))
            }
        };

        Collaborators {
            robot,
            capture,
            detector,
            predictor,
        }
    }
}

fn spec(program: &str, args: &[String]) -> CommandSpec {
    CommandSpec {
        program: program.to_string(),
        args: args.to_vec(),
    }
}

fn user_config_dir() -> Option<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("kr", "smartfarm", "leafbot") {
        Some(proj_dirs.config_dir().to_path_buf())
    } else {
        dirs::home_dir().map(|home| home.join(".leafbot"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafbot_core::InferenceFallback;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.monitoring.interval_secs, 300);
        assert_eq!(config.monitoring.interval(), Duration::from_secs(300));
        assert!(matches!(config.capture, CaptureBackend::Files { .. }));
        assert_eq!(config.robot, RobotBackend::DryRun { max_picks: 10 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_full_config() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            r#"
[harvest]
planting_date = "2025-07-01"
log_dir = "/var/log/leafbot"
inference_fallback = "hold"

[capture]
mode = "command"
program = "stereo-grab"
args = ["--exposure", "auto"]

[predictor]
mode = "date"

[detector]
mode = "command"
program = "python3"
args = ["bridges/detect.py"]

[robot]
mode = "command"
program = "arm-driver"

[monitoring]
interval_secs = 60
"#,
        );

        let config = AppConfig::load_from(&path).unwrap();

        assert_eq!(config.harvest.planting_date.to_string(), "2025-07-01");
        assert_eq!(config.harvest.log_dir, PathBuf::from("/var/log/leafbot"));
        assert_eq!(config.harvest.inference_fallback, InferenceFallback::Hold);
        assert_eq!(config.harvest.harvest_marker, "수확기");
        assert_eq!(
            config.capture,
            CaptureBackend::Command {
                program: "stereo-grab".into(),
                args: vec!["--exposure".into(), "auto".into()],
                left: default_left_image(),
                right: default_right_image(),
            }
        );
        assert_eq!(config.predictor, PredictorBackend::Date);
        assert_eq!(config.monitoring.interval_secs, 60);

        let bridges: Vec<_> = config
            .bridge_commands()
            .into_iter()
            .map(|(role, cmd)| (role, cmd.program))
            .collect();
        assert_eq!(
            bridges,
            vec![
                ("capture", "stereo-grab".to_string()),
                ("detector", "python3".to_string()),
                ("robot", "arm-driver".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "[robot]\nmode = \"teleport\"\n");
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "[monitoring]\ninterval_secs = 0\n");
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_path_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "[monitoring]\ninterval_secs = 5\n");

        let (config, source) = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.monitoring.interval_secs, 5);
        assert_eq!(source, Some(path));
    }

    #[test]
    fn test_build_collaborators_from_defaults() {
        let collaborators = AppConfig::default().build_collaborators();
        assert!(collaborators.capture.describe().contains("left_camera.jpg"));
    }

    #[test]
    fn test_search_paths_start_with_working_dir() {
        let paths = AppConfig::search_paths();
        assert_eq!(paths[0], PathBuf::from(FILE_NAME));
    }
}
