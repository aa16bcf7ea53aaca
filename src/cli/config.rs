//! Configuration file
//!
//! ```json
//! { "data_file": "/var/lib/transit/transport_db.json", "database": "transport_db" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::DATABASE_NAME;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file of the store (required)
    pub data_file: String,

    /// Database name (optional, default "transport_db").
    ///
    /// Labels log lines and the init report only. It does not scope the
    /// store: one `data_file` holds exactly one database, so use a separate
    /// file per database.
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    DATABASE_NAME.to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_file.trim().is_empty() {
            return Err(CliError::config_error("data_file must not be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(CliError::config_error("database must not be empty"));
        }
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_file)
    }
}
