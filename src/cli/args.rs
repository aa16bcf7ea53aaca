//! CLI argument definitions using clap
//!
//! Commands:
//! - transit-schema init --config <path>
//! - transit-schema export [--collection <name>]
//! - transit-schema insert --config <path> --collection <name>
//! - transit-schema status --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sets up and inspects the transport ticketing document store
#[derive(Parser, Debug)]
#[command(name = "transit-schema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create every collection and index; safe to re-run
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./transit.json")]
        config: PathBuf,
    },

    /// Print the MongoDB commands equivalent to `init`
    Export {
        /// Only export this collection
        #[arg(long)]
        collection: Option<String>,
    },

    /// Insert one JSON document read from stdin
    Insert {
        /// Path to configuration file
        #[arg(long, default_value = "./transit.json")]
        config: PathBuf,

        /// Target collection
        #[arg(long)]
        collection: String,
    },

    /// Show collections, document counts and indexes
    Status {
        /// Path to configuration file
        #[arg(long, default_value = "./transit.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
