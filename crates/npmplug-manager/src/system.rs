//! The plugin system facade.

use std::path::Path;
use std::sync::Arc;

use npmplug_wasm_runtime::WasmEngine;
use serde::Serialize;

use crate::loader::{ModuleImporter, PluginLoader};
use crate::npm::{NpmManager, SearchResult};
use crate::options::PluginOptions;
use crate::paths::{plugin_dir, validate_plugin_id};
use crate::runner::{CommandRunner, TokioCommandRunner};
use crate::{PluginManagerError, PluginManagerResult};

/// Name and version of an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    /// Package name.
    pub name: String,
    /// Installed version.
    pub version: String,
}

/// npm-backed plugin system for one host application.
///
/// Operations on one instance take `&mut self` where they touch the loader,
/// so a single instance never races with itself. Separate instances (or
/// processes) sharing a plugin root are not coordinated: the npm command and
/// the cache update are never atomic together.
pub struct NpmPluginSystem<I: ModuleImporter = WasmEngine> {
    npm: NpmManager,
    loader: PluginLoader<I>,
}

impl NpmPluginSystem<WasmEngine> {
    /// Creates a plugin system that spawns npm and loads entries with wasmtime.
    ///
    /// # Errors
    ///
    /// Returns [`PluginManagerError::InvalidPluginId`] before touching the
    /// filesystem if `id` is invalid, or an error if the plugin root cannot
    /// be resolved or the runtime cannot start.
    pub fn new(id: &str, options: PluginOptions) -> PluginManagerResult<Self> {
        ensure_valid_id(id)?;
        let engine = WasmEngine::new().map_err(PluginManagerError::Runtime)?;
        Self::with_parts(id, options, Arc::new(TokioCommandRunner::new()), engine)
    }
}

impl<I: ModuleImporter> NpmPluginSystem<I> {
    /// Creates a plugin system from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`PluginManagerError::InvalidPluginId`] if `id` is invalid;
    /// in that case neither the plugin directory source nor `runner` is used.
    pub fn with_parts(
        id: &str,
        options: PluginOptions,
        runner: Arc<dyn CommandRunner>,
        importer: I,
    ) -> PluginManagerResult<Self> {
        ensure_valid_id(id)?;

        let root = plugin_dir(id, &options.plugin_dir)?;
        tracing::debug!("Plugin root for {} is {}", id, root.display());

        Ok(Self {
            npm: NpmManager::with_runner(root.clone(), &options, runner),
            loader: PluginLoader::new(root, importer),
        })
    }

    /// Returns the plugin root directory.
    pub fn plugin_dir(&self) -> &Path {
        self.npm.plugin_dir()
    }

    /// Searches the registry.
    ///
    /// # Errors
    ///
    /// See [`NpmManager::search`].
    pub async fn search(&self, keyword: &str) -> PluginManagerResult<Vec<SearchResult>> {
        self.npm.search(keyword).await
    }

    /// Installs a registry package or local directory.
    ///
    /// Returns the name the package was installed under.
    ///
    /// # Errors
    ///
    /// See [`NpmManager::install`].
    pub async fn install(&self, name: &str, version: Option<&str>) -> PluginManagerResult<String> {
        self.npm.install(name, version).await
    }

    /// Unloads and uninstalls a package.
    ///
    /// # Errors
    ///
    /// See [`NpmManager::uninstall`].
    pub async fn uninstall(&mut self, name: &str) -> PluginManagerResult<()> {
        self.loader.unload(name);
        self.npm.uninstall(name).await
    }

    /// Lists installed plugins, from the cache when it is populated.
    ///
    /// # Errors
    ///
    /// See [`NpmManager::list`].
    pub async fn list(&self) -> PluginManagerResult<Vec<PluginInfo>> {
        let installed = self.npm.list().await?;
        Ok(to_infos(installed))
    }

    /// Rebuilds the cache from npm and lists installed plugins.
    ///
    /// # Errors
    ///
    /// See [`NpmManager::refresh`].
    pub async fn refresh(&self) -> PluginManagerResult<Vec<PluginInfo>> {
        let installed = self.npm.refresh().await?;
        Ok(to_infos(installed))
    }

    /// Reinstalls a package, optionally at another version.
    ///
    /// This is an uninstall followed by an install. If the install fails the
    /// package stays uninstalled.
    ///
    /// # Errors
    ///
    /// Returns the uninstall or install error.
    pub async fn update(&mut self, name: &str, version: Option<&str>) -> PluginManagerResult<String> {
        self.uninstall(name).await?;
        self.install(name, version).await
    }

    /// Loads a package's export.
    ///
    /// # Errors
    ///
    /// See [`PluginLoader::load`].
    pub async fn load(&mut self, name: &str) -> PluginManagerResult<I::Export> {
        self.loader.load(name).await
    }

    /// Forgets a loaded export. Returns whether one was cached.
    pub fn unload(&mut self, name: &str) -> bool {
        self.loader.unload(name)
    }

    /// Returns the names of loaded packages.
    pub fn loaded_plugins(&self) -> Vec<String> {
        self.loader.loaded_plugins()
    }

    /// Returns `true` if the package is installed on disk.
    pub async fn is_installed(&self, name: &str) -> bool {
        self.npm.is_installed(name).await
    }

    /// Returns the installed version from the package manifest.
    pub async fn installed_version(&self, name: &str) -> Option<String> {
        self.npm.installed_version(name).await
    }
}

fn ensure_valid_id(id: &str) -> PluginManagerResult<()> {
    if validate_plugin_id(id) {
        Ok(())
    } else {
        Err(PluginManagerError::InvalidPluginId { id: id.to_string() })
    }
}

fn to_infos(installed: crate::cache::CacheMap) -> Vec<PluginInfo> {
    installed
        .into_iter()
        .map(|(name, record)| PluginInfo {
            name,
            version: record.version,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_new_rejects_invalid_id() {
        let result = NpmPluginSystem::new("Invalid-ID", PluginOptions::new());
        assert!(matches!(
            result,
            Err(PluginManagerError::InvalidPluginId { ref id }) if id == "Invalid-ID"
        ));
    }

    #[test]
    fn test_new_with_custom_options() {
        let system = NpmPluginSystem::new(
            "test-app",
            PluginOptions::new()
                .with_plugin_dir("/custom/path")
                .with_registry("https://custom-registry.com"),
        )
        .unwrap();

        assert_eq!(system.plugin_dir(), PathBuf::from("/custom/path"));
        assert!(system.loaded_plugins().is_empty());
    }

    #[test]
    fn test_to_infos() {
        let mut installed = crate::cache::CacheMap::new();
        installed.insert(
            "demo".to_string(),
            crate::cache::PackageRecord {
                version: "1.0.0".to_string(),
                ..Default::default()
            },
        );

        assert_eq!(
            to_infos(installed),
            vec![PluginInfo {
                name: "demo".to_string(),
                version: "1.0.0".to_string(),
            }]
        );
    }
}
