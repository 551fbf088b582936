//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::collaborators::{CaptureProvider, GrowthStagePredictor, LeafDetector, RobotController};
use crate::config::HarvestConfig;
use crate::error::{Error, Result};
use crate::orchestrator::{Collaborators, CycleOrchestrator};
use crate::types::{Frame, GrowthPrediction, LeafCandidate, Point, StereoFramePair};

pub fn leaf(priority: u32, area: f64) -> LeafCandidate {
    LeafCandidate {
        class_label: "leaf".to_string(),
        center: Point::new(100.0 + priority as f64, 200.0),
        area,
        confidence: 0.9,
        maturity_score: 0.8,
        harvest_priority: priority,
    }
}

pub fn frames() -> StereoFramePair {
    StereoFramePair {
        left: Frame::new(b"left-jpeg".to_vec()),
        right: Frame::new(b"right-jpeg".to_vec()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Robot
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotBehavior {
    Harvest(u32),
    Fault,
    Panic,
}

pub struct FakeRobot {
    default: RobotBehavior,
    script: Mutex<VecDeque<RobotBehavior>>,
    init_ok: bool,
    init_calls: AtomicUsize,
    calibrate_calls: AtomicUsize,
    harvest_calls: AtomicUsize,
}

impl FakeRobot {
    pub fn new(behavior: RobotBehavior) -> Self {
        Self {
            default: behavior,
            script: Mutex::new(VecDeque::new()),
            init_ok: true,
            init_calls: AtomicUsize::new(0),
            calibrate_calls: AtomicUsize::new(0),
            harvest_calls: AtomicUsize::new(0),
        }
    }

    /// Play `script` first, one entry per harvest call, then fall back to the default.
    pub fn scripted(behavior: RobotBehavior, script: Vec<RobotBehavior>) -> Self {
        let robot = Self::new(behavior);
        *robot.script.lock().unwrap() = script.into();
        robot
    }

    pub fn refusing_init(mut self) -> Self {
        self.init_ok = false;
        self
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn calibrate_calls(&self) -> usize {
        self.calibrate_calls.load(Ordering::SeqCst)
    }

    pub fn harvest_calls(&self) -> usize {
        self.harvest_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RobotController for FakeRobot {
    async fn initialize(&self) -> Result<bool> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.init_ok)
    }

    async fn calibrate_workspace(&self) -> Result<()> {
        self.calibrate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn execute_harvest_sequence(
        &self,
        _leaves: &[LeafCandidate],
        _left: &Frame,
        _right: &Frame,
    ) -> Result<u32> {
        self.harvest_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default);
        match behavior {
            RobotBehavior::Harvest(n) => Ok(n),
            RobotBehavior::Fault => Err(Error::execution("gripper fault")),
            RobotBehavior::Panic => panic!("robot driver crashed"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capture
// ─────────────────────────────────────────────────────────────────────────────

pub struct FakeCapture {
    init_ok: bool,
    acquire_ok: bool,
    acquire_calls: AtomicUsize,
}

impl FakeCapture {
    pub fn ok() -> Self {
        Self {
            init_ok: true,
            acquire_ok: true,
            acquire_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.init_ok = false;
        self
    }

    pub fn failing_acquire(mut self) -> Self {
        self.acquire_ok = false;
        self
    }

    pub fn acquire_calls(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureProvider for FakeCapture {
    async fn initialize(&self) -> Result<bool> {
        Ok(self.init_ok)
    }

    async fn acquire_pair(&self) -> Result<StereoFramePair> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        if self.acquire_ok {
            Ok(frames())
        } else {
            Err(Error::capture("camera disconnected"))
        }
    }

    fn describe(&self) -> String {
        "fake stereo rig".to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detector
// ─────────────────────────────────────────────────────────────────────────────

pub struct FakeDetector {
    leaves: Option<Vec<LeafCandidate>>,
    calls: AtomicUsize,
}

impl FakeDetector {
    pub fn returning(leaves: Vec<LeafCandidate>) -> Self {
        Self {
            leaves: Some(leaves),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            leaves: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeafDetector for FakeDetector {
    async fn get_harvest_sequence(&self, _image: &Frame) -> Result<Vec<LeafCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.leaves
            .clone()
            .ok_or_else(|| Error::detection("model not loaded"))
    }

    async fn visualize(&self, image: &Frame, leaves: &[LeafCandidate]) -> Result<Frame> {
        let mut bytes = image.as_bytes().to_vec();
        bytes.extend_from_slice(format!("+{}boxes", leaves.len()).as_bytes());
        Ok(Frame::new(bytes))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Predictor
// ─────────────────────────────────────────────────────────────────────────────

pub struct FakePredictor {
    label: Option<String>,
    last_dates: Mutex<Option<(NaiveDate, NaiveDate)>>,
    saw_image: Mutex<Option<bool>>,
    calls: AtomicUsize,
}

impl FakePredictor {
    pub fn label(label: &str) -> Self {
        Self::with(Some(label.to_string()))
    }

    pub fn failing() -> Self {
        Self::with(None)
    }

    fn with(label: Option<String>) -> Self {
        Self {
            label,
            last_dates: Mutex::new(None),
            saw_image: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn last_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        *self.last_dates.lock().unwrap()
    }

    /// Whether the image file existed when the last prediction ran.
    pub fn saw_image(&self) -> Option<bool> {
        *self.saw_image.lock().unwrap()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GrowthStagePredictor for FakePredictor {
    async fn predict(
        &self,
        _model_path: &Path,
        image_path: &Path,
        planting_date: NaiveDate,
        photo_date: NaiveDate,
    ) -> Result<GrowthPrediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_dates.lock().unwrap() = Some((planting_date, photo_date));
        *self.saw_image.lock().unwrap() = Some(image_path.exists());
        match &self.label {
            Some(label) => Ok(GrowthPrediction::from_label(label.clone())),
            None => Err(Error::prediction("checkpoint incompatible")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator rig
// ─────────────────────────────────────────────────────────────────────────────

/// An orchestrator wired to fakes, with its files under a temp dir.
pub struct Rig {
    pub temp: TempDir,
    pub robot: Arc<FakeRobot>,
    pub capture: Arc<FakeCapture>,
    pub detector: Arc<FakeDetector>,
    pub predictor: Arc<FakePredictor>,
}

impl Rig {
    pub fn new(robot: FakeRobot, detector: FakeDetector, predictor: FakePredictor) -> Self {
        Self::with_capture(robot, FakeCapture::ok(), detector, predictor)
    }

    pub fn with_capture(
        robot: FakeRobot,
        capture: FakeCapture,
        detector: FakeDetector,
        predictor: FakePredictor,
    ) -> Self {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("best.pt"), b"weights").unwrap();
        Self {
            temp,
            robot: Arc::new(robot),
            capture: Arc::new(capture),
            detector: Arc::new(detector),
            predictor: Arc::new(predictor),
        }
    }

    pub fn config(&self) -> HarvestConfig {
        HarvestConfig {
            detection_model: self.temp.path().join("best.pt"),
            growth_model: self.temp.path().join("growth.pth"),
            capture_path: self.temp.path().join("temp_left_image.jpg"),
            log_dir: self.temp.path().join("logs"),
            detection_output_dir: self.temp.path().join("detections"),
            ..HarvestConfig::default()
        }
    }

    pub fn orchestrator_with(&self, config: HarvestConfig) -> CycleOrchestrator {
        CycleOrchestrator::new(
            config,
            Collaborators {
                robot: self.robot.clone(),
                capture: self.capture.clone(),
                detector: self.detector.clone(),
                predictor: self.predictor.clone(),
            },
        )
        .unwrap()
    }

    pub fn orchestrator(&self) -> CycleOrchestrator {
        self.orchestrator_with(self.config())
    }

    pub fn capture_path(&self) -> std::path::PathBuf {
        self.temp.path().join("temp_left_image.jpg")
    }

    pub fn log_files(&self) -> Vec<std::path::PathBuf> {
        match std::fs::read_dir(self.temp.path().join("logs")) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
