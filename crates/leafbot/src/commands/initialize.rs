//! System initialization.

use anyhow::{anyhow, Result};
use colored::Colorize;
use leafbot_core::CycleOrchestrator;

pub async fn execute(orchestrator: &mut CycleOrchestrator) -> Result<()> {
    println!("{}", "시스템 초기화".cyan().bold());
    println!("{}", "─".repeat(50));

    let report = orchestrator
        .initialize()
        .await
        .map_err(|e| anyhow!(e).context("시스템 초기화 실패"))?;

    println!("  로봇팔: {}", "✓ 초기화 및 캘리브레이션 완료".green());
    if report.vision_ready {
        println!("  스테레오 비전: {}", "✓ 준비됨".green());
    } else {
        println!("  스테레오 비전: {}", "⚠ 초기화 실패 (사이클마다 다시 시도)".yellow());
    }
    println!("  {}", "✓ 시스템 초기화 완료".green().bold());
    Ok(())
}
