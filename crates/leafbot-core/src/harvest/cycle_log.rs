//! Harvest log files.
//!
//! One plain-text file per executed cycle, named after the cycle's
//! timestamp: `<log_dir>/harvest_log_<YYYYMMDD_HHMMSS>.txt`.

use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::types::{CycleOutcome, LeafCandidate};

/// Writes harvest logs into a directory.
#[derive(Debug, Clone)]
pub struct CycleLogger {
    log_dir: PathBuf,
}

impl CycleLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path the log for `outcome` is written to.
    pub fn log_path(&self, outcome: &CycleOutcome) -> PathBuf {
        self.log_dir.join(format!(
            "harvest_log_{}.txt",
            outcome.timestamp.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Render and write the log, creating the directory if needed.
    pub async fn write(
        &self,
        outcome: &CycleOutcome,
        leaves: &[LeafCandidate],
        planting_date: NaiveDate,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.log_dir).await?;

        let path = self.log_path(outcome);
        tokio::fs::write(&path, render(outcome, leaves, planting_date)).await?;

        info!(cycle_id = %outcome.cycle_id, path = %path.display(), "Harvest log saved");
        Ok(path)
    }
}

/// Log body for one cycle. Leaves appear in input order.
pub fn render(outcome: &CycleOutcome, leaves: &[LeafCandidate], planting_date: NaiveDate) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "수확 로그 - {}",
        outcome.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "파종일: {}", planting_date.format("%Y-%m-%d"));
    let _ = writeln!(out, "검출된 잎 수: {}", outcome.attempted_count);
    let _ = writeln!(out, "수확 성공: {}", outcome.harvest_count);
    let _ = writeln!(out, "{}", "=".repeat(50));

    for (i, leaf) in leaves.iter().enumerate() {
        let _ = writeln!(out, "{}. 우선순위: {}", i + 1, leaf.harvest_priority);
        let _ = writeln!(out, "   위치: {}", leaf.center);
        let _ = writeln!(out, "   크기: {:.0}", leaf.area);
        let _ = writeln!(out, "   신뢰도: {:.3}", leaf.confidence);
        let _ = writeln!(out, "   성숙도: {:.3}", leaf.maturity_score);
        let _ = writeln!(out, "{}", "-".repeat(30));
    }

    out
}
