//! Diagnostics command.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::{AppConfig, CaptureBackend, PredictorBackend};

pub fn execute(config: &AppConfig, source: Option<&Path>) -> Result<()> {
    println!("{}", "leafbot Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    match source {
        Some(path) => println!("{}", format!("✓ {}", path.display()).green()),
        None => println!("{}", "○ not found (using defaults)".yellow()),
    }

    let harvest = &config.harvest;

    print!("  Detection model: ");
    if harvest.detection_model.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", format!("✗ {} not found", harvest.detection_model.display()).red());
        issues.push("Detection model missing - initialization will fail");
    }

    if matches!(config.predictor, PredictorBackend::Command { .. }) {
        print!("  Growth model: ");
        if harvest.growth_model.exists() {
            println!("{}", "✓ exists".green());
        } else {
            println!(
                "{}",
                format!("○ {} not found", harvest.growth_model.display()).yellow()
            );
            issues.push("Growth model missing - stage gate will use the fallback policy");
        }
    }

    if let CaptureBackend::Files { left, right } = &config.capture {
        for (side, path) in [("left", left), ("right", right)] {
            print!("  Stereo {} image: ", side);
            if path.exists() {
                println!("{}", "✓ exists".green());
            } else {
                println!("{}", format!("✗ {} not found", path.display()).red());
                issues.push("Stereo still image missing - cycles will fail at capture");
            }
        }
    }

    print!("  Log directory: ");
    if harvest.log_dir.is_dir() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ will be created".yellow());
    }

    for (role, command) in config.bridge_commands() {
        print!("  {} bridge ({}): ", role, command.program);
        if command.is_available() {
            println!("{}", "✓ installed".green());
        } else {
            println!("{}", "✗ not found".red());
            issues.push("Bridge program not found on PATH");
        }
    }

    println!();
    if issues.is_empty() {
        println!("{}", "All checks passed!".green().bold());
    } else {
        println!("{}", format!("Found {} issue(s):", issues.len()).yellow().bold());
        for issue in issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}
