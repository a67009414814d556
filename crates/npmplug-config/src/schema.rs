//! Configuration schema.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Plugin system configuration.
    #[serde(default)]
    pub plugin: PluginConfig,
}

impl Config {
    /// Checks values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> ConfigResult<()> {
        self.plugin.validate()
    }
}

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Plugin id of the host application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Plugin root directory (defaults to `~/.{id}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// npm registry URL.
    #[serde(default = "default_registry")]
    pub registry: String,

    /// npm executable name or path.
    #[serde(default = "default_npm_path")]
    pub npm_path: String,

    /// Upper bound in seconds for one npm invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl PluginConfig {
    /// Returns the npm timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.registry.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "plugin.registry must not be empty".to_string(),
            ));
        }
        if self.npm_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "plugin.npm_path must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "plugin.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            id: None,
            dir: None,
            registry: default_registry(),
            npm_path: default_npm_path(),
            timeout_secs: None,
        }
    }
}

fn default_registry() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_npm_path() -> String {
    "npm".to_string()
}
