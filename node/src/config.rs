//! Node configuration with TOML file support.

use rollcall_types::SessionParams;
use serde::{Deserialize, Serialize};

use crate::NodeError;

/// Configuration for a rollcall node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Default parameters applied to new sessions.
    #[serde(default)]
    pub session: SessionParams,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Hex-encoded 32-byte fallback session key for development fixtures.
    /// When unset (production), a student without an enrolled key cannot
    /// be issued a QR.
    #[serde(default)]
    pub dev_fallback_key: Option<String>,
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    /// Decode the configured fallback key, if any.
    pub fn fallback_key(&self) -> Result<Option<[u8; 32]>, NodeError> {
        let Some(hex_key) = &self.dev_fallback_key else {
            return Ok(None);
        };
        let bytes = hex::decode(hex_key)
            .map_err(|e| NodeError::Config(format!("dev_fallback_key is not hex: {e}")))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| NodeError::Config("dev_fallback_key must be 32 bytes".to_string()))?;
        Ok(Some(key))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            session: SessionParams::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            dev_fallback_key: None,
        }
    }
}
