#![forbid(unsafe_code)]

//! Editor configuration as data.
//!
//! ```toml
//! # netdemand.toml
//! [history]
//! max_depth = 200
//! max_bytes = 0        # unlimited
//! ```
//!
//! ```rust,ignore
//! let config = EditorConfig::from_toml_file("netdemand.toml")?;
//! let history = HistoryManager::new(config.history_config());
//! ```
//!
//! Every field has a default matching [`HistoryConfig::default`], so a
//! missing file section behaves like no configuration at all.

use std::path::Path;

use serde::{Deserialize, Serialize};

use netdemand_undo::HistoryConfig;

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo/redo history limits.
    pub history: HistoryPolicyConfig,
}

/// Undo/redo history limits.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPolicyConfig {
    /// Maximum number of undo steps kept.
    pub max_depth: usize,
    /// Byte budget for all recorded commands (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryPolicyConfig {
    fn default() -> Self {
        let d = HistoryConfig::default();
        Self {
            max_depth: d.max_depth,
            max_bytes: d.max_bytes,
        }
    }
}

impl EditorConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSer)
    }

    /// Validate all parameters.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be > 0".into());
        }
        errors
    }

    /// Limits for a [`netdemand_undo::HistoryManager`].
    #[must_use]
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.history.max_depth, self.history.max_bytes)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[source] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
