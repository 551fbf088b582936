//! CLI argument definitions using clap derive macros.

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lettuce harvest control program
///
/// Runs the harvest rig interactively or on a fixed monitoring interval.
#[derive(Parser, Debug)]
#[command(name = "leafbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to $LEAFBOT_CONFIG, ./leafbot.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive control menu (default)
    Menu,

    /// Initialize the rig and run a single harvest cycle
    Cycle,

    /// Initialize the rig and harvest continuously until Ctrl+C
    Monitor {
        /// Seconds between cycles (defaults to monitoring.interval_secs)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Stop after this many cycles
        #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        cycles: Option<usize>,
    },

    /// Run leaf detection on an image and save an annotated copy
    Detect {
        /// Image to analyze
        image: PathBuf,
    },

    /// Show configuration and system status
    Status,

    /// Run diagnostics
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["leafbot"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_monitor_interval() {
        let cli =
            Cli::try_parse_from(["leafbot", "monitor", "--interval", "60", "--config", "rig.toml"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Monitor {
                interval: Some(60),
                cycles: None
            })
        );
        assert_eq!(cli.config, Some(PathBuf::from("rig.toml")));
    }

    #[test]
    fn test_monitor_rejects_zero_interval() {
        let err = Cli::try_parse_from(["leafbot", "monitor", "--interval", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_monitor_cycles_must_be_positive() {
        let err = Cli::try_parse_from(["leafbot", "monitor", "--cycles", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let cli = Cli::try_parse_from(["leafbot", "monitor", "--cycles", "2"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Monitor {
                interval: None,
                cycles: Some(2)
            })
        );
    }

    #[test]
    fn test_detect_requires_image() {
        assert!(Cli::try_parse_from(["leafbot", "detect"]).is_err());
        let cli = Cli::try_parse_from(["leafbot", "detect", "sample.jpg"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Detect {
                image: PathBuf::from("sample.jpg")
            })
        );
    }
}
