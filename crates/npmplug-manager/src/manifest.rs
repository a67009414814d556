//! `package.json` manifests of installed packages.

use std::path::Path;

use serde::Deserialize;

use crate::{PluginManagerError, PluginManagerResult};

/// Entry file used when a manifest has no `main`.
pub const DEFAULT_ENTRY: &str = "index.js";

/// The subset of `package.json` the plugin manager reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    /// Package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Package version.
    #[serde(default)]
    pub version: String,
    /// Package description.
    #[serde(default)]
    pub description: Option<String>,
    /// Entry file relative to the package directory.
    #[serde(default)]
    pub main: Option<String>,
}

impl PackageManifest {
    /// Reads a manifest, returning `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn read(path: &Path) -> PluginManagerResult<Option<Self>> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(path).await?;
        let manifest =
            serde_json::from_str(&content).map_err(|source| PluginManagerError::InvalidManifest {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Some(manifest))
    }

    /// Returns the declared entry file, or `index.js`.
    #[must_use]
    pub fn entry_point(&self) -> &str {
        self.main
            .as_deref()
            .filter(|main| !main.is_empty())
            .unwrap_or(DEFAULT_ENTRY)
    }

    /// Returns the description, or an empty string.
    #[must_use]
    pub fn description_or_empty(&self) -> String {
        self.description.clone().unwrap_or_default()
    }
}
