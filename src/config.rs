use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};

/// Name of the configuration file looked up inside a config directory.
pub const CONFIG_FILENAME: &str = "resolved-graph.json";

/// Default name under which a resolved node exposes the links leaving it.
pub const DEFAULT_OUTGOING_FIELD: &str = "outgoingLinks";

/// Default name under which a resolved node exposes the links arriving at it.
pub const DEFAULT_INCOMING_FIELD: &str = "incomingLinks";

/// Configuration for a `ResolvedGraph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Query field name for a node's outgoing links.
    pub outgoing_field: String,
    /// Query field name for a node's incoming links.
    pub incoming_field: String,
    /// Log unresolved link endpoints at `warn` instead of `debug`.
    pub warn_on_dangling: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            version: 1,
            outgoing_field: DEFAULT_OUTGOING_FIELD.to_string(),
            incoming_field: DEFAULT_INCOMING_FIELD.to_string(),
            warn_on_dangling: false,
        }
    }
}

impl GraphConfig {
    /// Returns `true` if `field` names one of the derived link lists of a node.
    pub fn is_derived_node_field(&self, field: &str) -> bool {
        field == self.outgoing_field || field == self.incoming_field
    }

    /// Checks that the derived link fields are usable.
    ///
    /// They must be non-empty, distinct, and must not shadow the stored
    /// `id` or `data` fields of a node.
    pub fn validate(&self) -> Result<()> {
        if self.outgoing_field.is_empty() || self.incoming_field.is_empty() {
            return Err(config_error("derived link field names must not be empty"));
        }
        if self.outgoing_field == self.incoming_field {
            return Err(config_error(format!(
                "outgoing and incoming link fields must differ (both '{}')",
                self.outgoing_field
            )));
        }
        for reserved in ["id", "data"] {
            if self.is_derived_node_field(reserved) {
                return Err(config_error(format!(
                    "'{reserved}' cannot be used as a derived link field"
                )));
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> GraphError {
    GraphError::Config {
        message: message.into(),
    }
}

/// Returns the path to the configuration file within `dir`.
pub fn get_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

/// Loads the configuration from `dir`.
///
/// If the configuration file does not exist, returns the default configuration.
pub fn load_config(dir: &Path) -> Result<GraphConfig> {
    let config_path = get_config_path(dir);

    if !config_path.exists() {
        return Ok(GraphConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| {
        config_error(format!("failed to read '{}': {e}", config_path.display()))
    })?;
    let config: GraphConfig = serde_json::from_str(&contents).map_err(|e| {
        config_error(format!("failed to parse '{}': {e}", config_path.display()))
    })?;

    config.validate()?;
    Ok(config)
}

/// Saves the configuration into `dir`, writing a temporary file and renaming
/// it into place.
pub fn save_config(dir: &Path, config: &GraphConfig) -> Result<()> {
    config.validate()?;

    let config_path = get_config_path(dir);
    let tmp_path = config_path.with_extension("tmp");
    let json = serde_json::to_string_pretty(config)?;

    fs::create_dir_all(dir)
        .and_then(|()| fs::write(&tmp_path, &json))
        .and_then(|()| fs::rename(&tmp_path, &config_path))
        .map_err(|e| config_error(format!("failed to write '{}': {e}", config_path.display())))
}
