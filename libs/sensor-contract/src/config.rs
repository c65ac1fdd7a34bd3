use serde::Deserialize;

use crate::error::ContractError;
use crate::query::BatchPolicy;
use crate::signal::{DEFAULT_THRESHOLD, MAX_VALUE_EVENT};

/// `[contract]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContractConfig {
    /// Readings strictly above this emit an event.
    #[serde(default = "default_threshold")]
    pub threshold: i64,

    #[serde(default = "default_event_name")]
    pub event_name: String,

    #[serde(default)]
    pub batch_policy: BatchPolicy,
}

fn default_threshold() -> i64 {
    DEFAULT_THRESHOLD
}

fn default_event_name() -> String {
    MAX_VALUE_EVENT.to_string()
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            event_name: default_event_name(),
            batch_policy: BatchPolicy::default(),
        }
    }
}

impl ContractConfig {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.event_name.trim().is_empty() {
            return Err(ContractError::Config("event_name must not be empty".into()));
        }
        Ok(())
    }
}
