//! Dynamic loading of installed packages.
//!
//! The loader resolves a package's entry file from its manifest and hands
//! it to a [`ModuleImporter`]. Whatever the importer returns is the plugin's
//! export; it is memoized per package name until unloaded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use npmplug_wasm_runtime::{WasmEngine, WasmPlugin};
use tracing::{debug, info};

use crate::error::BoxError;
use crate::manifest::PackageManifest;
use crate::paths::{manifest_path, package_dir};
use crate::{PluginManagerError, PluginManagerResult};

/// Turns an entry file into a loaded export.
#[async_trait]
pub trait ModuleImporter: Send + Sync {
    /// The loaded export. Cloned out of the loader cache on every hit.
    type Export: Clone + Send + Sync;

    /// Imports the entry file at `entry`.
    async fn import(&self, entry: &Path) -> Result<Self::Export, BoxError>;
}

#[async_trait]
impl ModuleImporter for WasmEngine {
    type Export = WasmPlugin;

    async fn import(&self, entry: &Path) -> Result<Self::Export, BoxError> {
        let bytes = tokio::fs::read(entry).await?;
        Ok(self.load_bytes(entry, &bytes)?)
    }
}

/// Loads and memoizes plugin exports from a plugin root.
pub struct PluginLoader<I: ModuleImporter> {
    plugin_dir: PathBuf,
    importer: I,
    cache: HashMap<String, I::Export>,
}

impl<I: ModuleImporter> PluginLoader<I> {
    /// Creates a loader for packages installed under `plugin_dir`.
    pub fn new(plugin_dir: PathBuf, importer: I) -> Self {
        Self {
            plugin_dir,
            importer,
            cache: HashMap::new(),
        }
    }

    /// Returns the importer.
    pub fn importer(&self) -> &I {
        &self.importer
    }

    /// Loads a package, returning the memoized export if already loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PluginManagerError::PluginNotFound`] if the package has no
    /// manifest, [`PluginManagerError::InvalidManifest`] if it cannot be
    /// parsed, and [`PluginManagerError::Load`] if the import fails.
    pub async fn load(&mut self, name: &str) -> PluginManagerResult<I::Export> {
        if let Some(export) = self.cache.get(name) {
            debug!("Plugin {} already loaded", name);
            return Ok(export.clone());
        }

        let manifest = PackageManifest::read(&manifest_path(&self.plugin_dir, name))
            .await?
            .ok_or_else(|| PluginManagerError::PluginNotFound {
                name: name.to_string(),
            })?;

        let entry = package_dir(&self.plugin_dir, name).join(manifest.entry_point());
        debug!("Importing {} from {}", name, entry.display());

        let export = self
            .importer
            .import(&entry)
            .await
            .map_err(|source| PluginManagerError::Load {
                name: name.to_string(),
                source,
            })?;

        self.cache.insert(name.to_string(), export.clone());
        info!("Loaded plugin {}", name);

        Ok(export)
    }

    /// Forgets a loaded export. Returns whether one was cached.
    pub fn unload(&mut self, name: &str) -> bool {
        self.cache.remove(name).is_some()
    }

    /// Forgets every loaded export.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Returns the names of loaded packages, sorted.
    pub fn loaded_plugins(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cache.keys().cloned().collect();
        names.sort();
        names
    }
}
