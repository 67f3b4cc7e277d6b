//! CLI argument definitions
//!
//! - polystore select [--config <path>]
//! - polystore settings --scheme <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Polystore placement and routing engine
#[derive(Parser, Debug)]
#[command(name = "polystore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select one routing plan from a JSON request on stdin
    Select {
        /// Path to configuration file; built-in defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the settings a partition scheme accepts
    Settings {
        /// Scheme name: NONE, HASH, RANGE, LIST or TEMPERATURE
        #[arg(long)]
        scheme: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_with_config() {
        let cli = Cli::try_parse_from(["polystore", "select", "--config", "poly.json"]).unwrap();
        match cli.command {
            Command::Select { config } => assert_eq!(config, Some(PathBuf::from("poly.json"))),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_settings_requires_scheme() {
        assert!(Cli::try_parse_from(["polystore", "settings"]).is_err());
        let cli = Cli::try_parse_from(["polystore", "settings", "--scheme", "hash"]).unwrap();
        assert!(matches!(cli.command, Command::Settings { scheme } if scheme == "hash"));
    }
}
