//! Command implementations for the leafbot CLI.
//!
//! Each submodule implements one menu entry / subcommand.

pub mod cycle;
pub mod detect;
pub mod doctor;
pub mod initialize;
pub mod monitor;
pub mod status;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use leafbot_core::types::StatusMarker;
use leafbot_core::{CycleOrchestrator, CycleReport};

use crate::config::AppConfig;

/// Wire the configured backends into an orchestrator.
pub fn build_orchestrator(config: &AppConfig) -> Result<CycleOrchestrator> {
    CycleOrchestrator::new(config.harvest.clone(), config.build_collaborators())
        .context("Failed to build harvest orchestrator")
}

/// Marker symbol in its status colour.
pub fn marker(status: StatusMarker) -> ColoredString {
    match status {
        StatusMarker::Success => status.symbol().green(),
        StatusMarker::Failure => status.symbol().red(),
        StatusMarker::Warning => status.symbol().yellow(),
    }
}

pub fn print_report(report: &CycleReport) {
    println!("  {} {}", marker(report.marker()), report.summary());
    if let CycleReport::Harvested {
        log_path: Some(path),
        ..
    } = report
    {
        println!("    로그: {}", path.display().to_string().dimmed());
    }
}
