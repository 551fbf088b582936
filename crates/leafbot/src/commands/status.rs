//! System status display.

use colored::Colorize;
use leafbot_core::{CycleOrchestrator, SystemState};

use super::marker;
use crate::config::AppConfig;

pub fn execute(orchestrator: &CycleOrchestrator, config: &AppConfig) {
    let status = orchestrator.status();
    let harvest = orchestrator.config();

    println!("{}", "시스템 상태".cyan().bold());
    println!("{}", "─".repeat(50));

    let state = match status.state {
        SystemState::Ready => status.state.to_string().green(),
        SystemState::Uninitialized => status.state.to_string().yellow(),
        SystemState::Failed => status.state.to_string().red(),
    };
    println!("  상태: {} ({})", state, status.phase);
    println!("  파종일: {}", harvest.planting_date.format("%Y-%m-%d"));
    println!("  검출 모델: {}", harvest.detection_model.display());
    println!("  생육 모델: {}", harvest.growth_model.display());
    println!("  카메라: {}", status.capture);
    println!("  로그 디렉토리: {}", harvest.log_dir.display());
    println!("  모니터링 주기: {}초", config.monitoring.interval_secs);
    println!();

    let stats = &status.stats;
    println!("{}", "사이클 통계".cyan().bold());
    println!("  실행: {}", stats.cycles);
    println!(
        "  수확: {}  건너뜀: {}  실패: {}",
        stats.harvested.to_string().green(),
        stats.skipped.to_string().yellow(),
        stats.failed.to_string().red()
    );
    println!(
        "  수확한 잎: {}/{}",
        stats.leaves_harvested, stats.leaves_attempted
    );
    if let Some(at) = stats.last_cycle_at {
        println!("  마지막 사이클: {}", at.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(report) = &status.last_report {
        println!("  마지막 결과: {} {}", marker(report.marker()), report.summary());
    }
}
