//! Growth-stage predictor backends.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

use super::GrowthStagePredictor;
use crate::bridge::{args, CommandSpec};
use crate::error::{Error, Result};
use crate::types::{GrowthPrediction, GrowthStage};

/// Days from planting to a typical harvest.
const HARVEST_DAYS: i64 = 30;

/// Runs the multimodal growth-stage model as an external program.
///
/// Invoked as `<program> <args..> --model M --image I --planting-date D
/// --photo-date D`, printing a JSON object on stdout.
#[derive(Debug, Clone)]
pub struct CommandPredictor {
    command: CommandSpec,
}

impl CommandPredictor {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }
}

#[async_trait]
impl GrowthStagePredictor for CommandPredictor {
    async fn predict(
        &self,
        model_path: &Path,
        image_path: &Path,
        planting_date: NaiveDate,
        photo_date: NaiveDate,
    ) -> Result<GrowthPrediction> {
        if !model_path.exists() {
            return Err(Error::ModelNotFound(model_path.to_path_buf()));
        }

        let extra = args([
            "--model".into(),
            model_path.as_os_str().to_os_string(),
            "--image".into(),
            image_path.as_os_str().to_os_string(),
            "--planting-date".into(),
            planting_date.format("%Y-%m-%d").to_string().into(),
            "--photo-date".into(),
            photo_date.format("%Y-%m-%d").to_string().into(),
        ]);

        let prediction: GrowthPrediction = self
            .command
            .run_json(&extra, None)
            .await
            .map_err(|e| Error::prediction(e.to_string()))?;

        if prediction.stage_label.trim().is_empty() {
            return Err(Error::prediction("model returned an empty stage label"));
        }
        Ok(prediction)
    }
}

/// Calendar-only estimate: no model, no image.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateHeuristicPredictor;

impl DateHeuristicPredictor {
    pub fn estimate(planting_date: NaiveDate, photo_date: NaiveDate) -> GrowthPrediction {
        let days = (photo_date - planting_date).num_days();
        let stage = GrowthStage::from_days_since_planting(days);
        let days_to_harvest = (HARVEST_DAYS - days).max(0);

        let recommendation = match stage {
            GrowthStage::Harvest => "수확 시기입니다".to_string(),
            _ => format!("수확까지 약 {days_to_harvest}일 남았습니다"),
        };

        GrowthPrediction {
            stage_label: stage.label().to_string(),
            confidence: None,
            days_since_planting: Some(days),
            recommendation: Some(recommendation),
        }
    }
}

#[async_trait]
impl GrowthStagePredictor for DateHeuristicPredictor {
    async fn predict(
        &self,
        _model_path: &Path,
        _image_path: &Path,
        planting_date: NaiveDate,
        photo_date: NaiveDate,
    ) -> Result<GrowthPrediction> {
        if photo_date < planting_date {
            return Err(Error::prediction(format!(
                "photo date {photo_date} precedes planting date {planting_date}"
            )));
        }
        Ok(Self::estimate(planting_date, photo_date))
    }
}
