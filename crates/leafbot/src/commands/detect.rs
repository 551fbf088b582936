//! Leaf detection test on a stored image.

use anyhow::{anyhow, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use leafbot_core::CycleOrchestrator;
use std::path::Path;
use std::time::Duration;

pub async fn execute(orchestrator: &CycleOrchestrator, image: &Path) -> Result<()> {
    println!("{}", "잎 검출 테스트".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  이미지: {}", image.display());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg}")?);
    spinner.set_message("잎 검출 중...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = orchestrator.test_detection(image).await;
    spinner.finish_and_clear();

    let detection = result.map_err(|e| anyhow!(e).context("잎 검출 실패"))?;

    println!(
        "  {} 검출된 잎: {}개",
        if detection.leaves.is_empty() {
            "⚠".yellow()
        } else {
            "✓".green()
        },
        detection.leaves.len()
    );
    for (i, leaf) in detection.leaves.iter().enumerate() {
        println!(
            "    {}. 우선순위 {} 위치 {} 크기 {:.0} 신뢰도 {:.3}",
            i + 1,
            leaf.harvest_priority,
            leaf.center,
            leaf.area,
            leaf.confidence
        );
    }
    if let Some(path) = &detection.annotated {
        println!("  결과 이미지: {}", path.display().to_string().green());
    }
    Ok(())
}
