//! CLI argument definitions using clap
//!
//! Commands:
//! - resourcekit start [--config <path>] [--port <port>]
//! - resourcekit check [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// resourcekit - schema-validated REST resources
#[derive(Parser, Debug)]
#[command(name = "resourcekit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load resources and serve them over HTTP
    Start {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate configuration and resource definitions, then exit
    Check {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_with_port() {
        let cli = Cli::try_parse_from(["resourcekit", "start", "--port", "8080"]).unwrap();
        match cli.command {
            Command::Start { config, port } => {
                assert!(config.is_none());
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_with_config() {
        let cli = Cli::try_parse_from(["resourcekit", "check", "--config", "app.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Check { config: Some(path) } if path == PathBuf::from("app.json")
        ));
    }
}
