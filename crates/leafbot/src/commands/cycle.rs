//! Single harvest cycle.

use anyhow::Result;
use colored::Colorize;
use leafbot_core::CycleOrchestrator;

use super::print_report;

pub async fn execute(orchestrator: &mut CycleOrchestrator) -> Result<()> {
    println!("{}", "수확 사이클".cyan().bold());
    println!("{}", "─".repeat(50));

    let report = orchestrator.run_cycle().await;
    print_report(&report);
    Ok(())
}
