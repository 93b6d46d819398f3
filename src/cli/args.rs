//! CLI argument definitions using clap
//!
//! Commands:
//! - tarpon serve --config <path> [--port <port>]
//! - tarpon check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tarpon - a tokenization service
#[derive(Parser, Debug)]
#[command(name = "tarpon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP token API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./tarpon.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration and datastore connection, then exit
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./tarpon.json")]
        config: PathBuf,
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
    fn test_serve_with_port() {
        let cli = Cli::try_parse_from(["tarpon", "serve", "--config", "/etc/tarpon.json", "--port", "9000"])
            .unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("/etc/tarpon.json"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_config_default_path() {
        let cli = Cli::try_parse_from(["tarpon", "check-config"]).unwrap();
        match cli.command {
            Command::CheckConfig { config } => assert_eq!(config, PathBuf::from("./tarpon.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
