//! Continuous monitoring.
//!
//! Runs cycles on a fixed interval until Ctrl+C. The signal only takes
//! effect between cycles; a cycle already running finishes first.

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use leafbot_core::{ContinuousScheduler, CycleOrchestrator};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::print_report;

pub async fn execute(
    orchestrator: &mut CycleOrchestrator,
    interval: Duration,
    max_cycles: Option<usize>,
) -> Result<()> {
    println!("{}", "연속 모니터링".cyan().bold());
    println!("{}", "─".repeat(50));
    let interval_secs = interval.as_secs();
    println!("  주기: {}초 (Ctrl+C로 중지)", interval_secs);
    println!();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let mut scheduler = ContinuousScheduler::new(interval);
    if let Some(cycles) = max_cycles {
        scheduler = scheduler.with_max_cycles(cycles);
    }

    let summary = scheduler
        .run_with(orchestrator, &cancel, |report| {
            println!(
                "{} 수확 사이클",
                Local::now().format("[%H:%M:%S]").to_string().dimmed()
            );
            print_report(report);
            if !cancel.is_cancelled() {
                println!("  {}", format!("{interval_secs}초 대기 중...").dimmed());
            }
        })
        .await;

    signal_task.abort();

    println!();
    println!(
        "  {} 모니터링 종료: {}회 실행, {}회 수확 성공",
        "✓".green(),
        summary.cycles,
        summary.succeeded
    );
    if summary.panics > 0 {
        println!(
            "  {} 비정상 종료된 사이클: {}회",
            "✗".red(),
            summary.panics
        );
    }
    Ok(())
}
