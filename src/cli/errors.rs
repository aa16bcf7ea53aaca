//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit.

use std::io;

use thiserror::Error;

use crate::init::InitError;
use crate::store::StoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing or invalid
    #[error("{0}")]
    Config(String),

    /// stdin/stdout failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input is not a JSON document
    #[error("Invalid JSON input: {0}")]
    InvalidInput(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    /// Stable error code for JSON output
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "TRANSIT_CLI_CONFIG_ERROR",
            CliError::Io(_) => "TRANSIT_CLI_IO_ERROR",
            CliError::InvalidInput(_) => "TRANSIT_CLI_INVALID_INPUT",
            CliError::UnknownCollection(_) => "TRANSIT_CLI_UNKNOWN_COLLECTION",
            CliError::Init(e) => e.code(),
            CliError::Store(e) => e.code(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidInput(e.to_string())
    }
}
