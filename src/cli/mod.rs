//! CLI module
//!
//! Provides command-line interface for:
//! - init: Create collections and indexes
//! - export: Print equivalent MongoDB commands
//! - insert: Insert one document through the store's write path
//! - status: Show collections and indexes

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{export, init, insert, run_command, run_command_with, status};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use io::{read_document, write_error, write_pretty, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
