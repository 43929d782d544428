//! Engine Configuration

use bindery_directives::{ConfigError, DirectiveConfig};
use serde::{Deserialize, Serialize};

/// Runtime configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directive and notification conventions
    pub directives: DirectiveConfig,

    /// Default `tracing` filter, overridden by `BINDERY_LOG`
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directives: DirectiveConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
