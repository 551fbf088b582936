//! leafbot - Lettuce harvest control program
//!
//! Drives the harvest rig from an interactive menu, a single cycle, or a
//! continuous monitoring loop.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod menu;

use cli::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("leafbot=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let (config, source) = AppConfig::load(cli.config.as_deref())?;
    match &source {
        Some(path) => tracing::info!(path = %path.display(), "Loaded configuration"),
        None => tracing::info!("No config file found; using defaults"),
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => menu::run(&config).await,
        Commands::Cycle => {
            let mut orchestrator = commands::build_orchestrator(&config)?;
            commands::initialize::execute(&mut orchestrator).await?;
            commands::cycle::execute(&mut orchestrator).await
        }
        Commands::Monitor { interval, cycles } => {
            let mut orchestrator = commands::build_orchestrator(&config)?;
            commands::initialize::execute(&mut orchestrator).await?;
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.monitoring.interval());
            commands::monitor::execute(&mut orchestrator, interval, cycles).await
        }
        Commands::Detect { image } => {
            let orchestrator = commands::build_orchestrator(&config)?;
            commands::detect::execute(&orchestrator, &image).await
        }
        Commands::Status => {
            let orchestrator = commands::build_orchestrator(&config)?;
            commands::status::execute(&orchestrator, &config);
            Ok(())
        }
        Commands::Doctor => commands::doctor::execute(&config, source.as_deref()),
    }
}
