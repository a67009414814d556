//! Local cache of installed package metadata.
//!
//! The cache is a JSON object stored at `{plugin-root}/plugins.json`, mapping
//! package name to [`PackageRecord`]. It is a derived view of what npm has
//! installed and can always be rebuilt from `npm list`.
//!
//! Every mutation is a read-modify-write of the whole file with no locking.
//! Two processes mutating the same cache concurrently may lose an update.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{PluginManagerError, PluginManagerResult};

/// Cache file name inside the plugin root.
pub const CACHE_FILE_NAME: &str = "plugins.json";

/// Cached metadata of one installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Installed version.
    #[serde(default)]
    pub version: String,
    /// Resolved location reported by npm (empty for direct installs).
    #[serde(default)]
    pub resolved: String,
    /// Whether npm reports the version as overridden.
    #[serde(default)]
    pub overridden: bool,
    /// Description from the package manifest.
    #[serde(default)]
    pub description: String,
}

/// Package name to record mapping.
pub type CacheMap = BTreeMap<String, PackageRecord>;

/// JSON cache file of installed packages.
#[derive(Debug, Clone)]
pub struct PluginCache {
    path: PathBuf,
}

impl PluginCache {
    /// Creates a cache stored in `plugin_dir`.
    #[must_use]
    pub fn new(plugin_dir: &Path) -> Self {
        Self {
            path: plugin_dir.join(CACHE_FILE_NAME),
        }
    }

    /// Returns the cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole cache. A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn read(&self) -> PluginManagerResult<CacheMap> {
        let exists = tokio::fs::try_exists(&self.path).await.map_err(|source| {
            PluginManagerError::CacheRead {
                path: self.path.clone(),
                source,
            }
        })?;
        if !exists {
            return Ok(CacheMap::new());
        }

        tracing::debug!("Reading cache {}", self.path.display());

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|source| {
            PluginManagerError::CacheRead {
                path: self.path.clone(),
                source,
            }
        })?;

        serde_json::from_str(&content).map_err(|source| PluginManagerError::CacheParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrites the whole cache.
    ///
    /// The content goes to a sibling temporary file first and is renamed into
    /// place, so readers never observe a half-written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be serialized or written.
    pub async fn write(&self, data: &CacheMap) -> PluginManagerResult<()> {
        let content =
            serde_json::to_string_pretty(data).map_err(PluginManagerError::CacheSerialize)?;
        let write_err = |source| PluginManagerError::CacheWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(write_err)?;

        tracing::debug!("Wrote {} cache entries to {}", data.len(), self.path.display());

        Ok(())
    }

    /// Sets the record of one package.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read or written.
    pub async fn update_one(&self, name: &str, record: PackageRecord) -> PluginManagerResult<()> {
        let mut data = self.read().await?;
        data.insert(name.to_string(), record);
        self.write(&data).await
    }

    /// Removes the record of one package, writing only if it was present.
    ///
    /// Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read or written.
    pub async fn remove_one(&self, name: &str) -> PluginManagerResult<bool> {
        let mut data = self.read().await?;
        if data.remove(name).is_none() {
            return Ok(false);
        }
        self.write(&data).await?;
        Ok(true)
    }

    /// Replaces the cache with a freshly derived mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    pub async fn rebuild(&self, data: &CacheMap) -> PluginManagerResult<()> {
        self.write(data).await
    }

    /// Deletes the cache file so the next listing re-derives it.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be removed.
    pub async fn clear(&self) -> PluginManagerResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PluginManagerError::CacheWrite {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
