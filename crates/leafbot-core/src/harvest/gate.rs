//! Growth-stage gate.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::collaborators::GrowthStagePredictor;
use crate::config::InferenceFallback;

/// Label reported when inference failed and the cycle is held.
pub const HELD_LABEL: &str = "판정 보류";

/// Where a gate decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// The predictor answered.
    Model,
    /// The predictor failed and the fallback policy decided.
    Fallback,
}

/// Proceed/skip decision for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub proceed: bool,
    pub stage_label: String,
    pub source: DecisionSource,
}

/// Turns a growth-stage prediction into a proceed/skip decision.
///
/// Predictor errors never leave the gate; the configured
/// [`InferenceFallback`] decides instead.
pub struct GrowthStageGate {
    predictor: Arc<dyn GrowthStagePredictor>,
    model_path: PathBuf,
    harvest_marker: String,
    fallback: InferenceFallback,
}

impl GrowthStageGate {
    pub fn new(
        predictor: Arc<dyn GrowthStagePredictor>,
        model_path: impl Into<PathBuf>,
        harvest_marker: impl Into<String>,
        fallback: InferenceFallback,
    ) -> Self {
        Self {
            predictor,
            model_path: model_path.into(),
            harvest_marker: harvest_marker.into(),
            fallback,
        }
    }

    /// Decide using today's date as the photo date.
    pub async fn evaluate(&self, image_path: &Path, planting_date: NaiveDate) -> GateDecision {
        self.evaluate_on(image_path, planting_date, Local::now().date_naive())
            .await
    }

    pub async fn evaluate_on(
        &self,
        image_path: &Path,
        planting_date: NaiveDate,
        photo_date: NaiveDate,
    ) -> GateDecision {
        match self
            .predictor
            .predict(&self.model_path, image_path, planting_date, photo_date)
            .await
        {
            Ok(prediction) => {
                let proceed = prediction.stage_label.contains(&self.harvest_marker);
                info!(
                    stage = %prediction.stage_label,
                    confidence = ?prediction.confidence,
                    proceed,
                    "Growth stage predicted"
                );
                GateDecision {
                    proceed,
                    stage_label: prediction.stage_label,
                    source: DecisionSource::Model,
                }
            }
            Err(e) => self.fall_back(&e.to_string()),
        }
    }

    fn fall_back(&self, reason: &str) -> GateDecision {
        match self.fallback {
            InferenceFallback::Proceed => {
                warn!(error = %reason, "Growth stage prediction failed; assuming harvest stage");
                GateDecision {
                    proceed: true,
                    stage_label: self.harvest_marker.clone(),
                    source: DecisionSource::Fallback,
                }
            }
            InferenceFallback::Hold => {
                warn!(error = %reason, "Growth stage prediction failed; holding cycle for review");
                GateDecision {
                    proceed: false,
                    stage_label: HELD_LABEL.to_string(),
                    source: DecisionSource::Fallback,
                }
            }
        }
    }
}
