use std::path::Path;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use ledger_journal_file::FileJournalConfig;
use sensor_contract::ContractConfig;

use crate::error::CliError;

pub const DEFAULT_CONFIG_PATH: &str = "sensor-ledger.toml";

#[derive(Parser, Debug)]
#[command(name = "sensor-ledger", about = "Versioned ledger of sensor readings")]
pub struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, env = "SENSOR_LEDGER_CONFIG")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create or update a sensor reading.
    Put {
        id: String,
        timestamp: String,
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },
    /// Delete the current reading of a sensor (history is kept).
    Delete { id: String },
    /// Print whether a sensor has a current reading.
    Has { id: String },
    /// Print the current reading of a sensor.
    Get { id: String },
    /// Print readings for a JSON array of ids, e.g. '["s1","s2"]'.
    GetMany { ids_json: String },
    /// Print every current reading, ordered by id.
    All,
    /// Print up to MAX most recent readings of a sensor, newest first.
    History {
        id: String,
        #[arg(allow_hyphen_values = true)]
        max: i64,
    },
}

// ---- TOML Config ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorLedgerConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub contract: ContractConfig,
}

/// Journal backend, selected by `backend = "..."`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Nothing survives the process.
    Memory,
    File(FileJournalConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File(FileJournalConfig::new("ledger-data"))
    }
}

impl SensorLedgerConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file at the default path yields the defaults.
    pub fn load(path: &str) -> Result<Self, CliError> {
        if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
            tracing::debug!(path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| CliError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| match e {
            CliError::Config(msg) => CliError::Config(format!("{path}: {msg}")),
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, CliError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| CliError::Config(e.to_string()))?;
        config.contract.validate()?;
        Ok(config)
    }
}
