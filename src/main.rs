//! tarpon CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`; all logic lives in
//! the CLI module. Errors go to stderr with a non-zero exit code.

use tarpon::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
