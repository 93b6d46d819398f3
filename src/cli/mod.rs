//! CLI module for tarpon
//!
//! Provides command-line interface for:
//! - serve: Load config and run the HTTP token API
//! - check-config: Validate config and datastore reachability

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_connector, build_state, check_config, run, run_command, serve};
pub use errors::{CliError, CliResult};
