//! npm adapter.
//!
//! Translates plugin operations into `npm` invocations scoped to the plugin
//! root with `--prefix`, and keeps the [`PluginCache`] in step with them.
//! Installed package state is read straight from `node_modules` when npm
//! output is not needed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheMap, PackageRecord, PluginCache};
use crate::manifest::PackageManifest;
use crate::options::PluginOptions;
use crate::paths::{
    is_local_path, manifest_path, package_dir, resolve_local_path, validate_local_path,
};
use crate::runner::{CommandOutput, CommandRunner, TokioCommandRunner};
use crate::{PluginManagerError, PluginManagerResult};

/// One entry of `npm search --json`.
///
/// Registries publish loosely shaped metadata, so every field except
/// `name` accepts `null` or an unexpected type instead of failing the
/// whole result set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    /// Package name.
    pub name: String,
    /// Latest published version, empty when the registry omits it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    /// Package description.
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub description: Option<String>,
    /// Package keywords. A comma or space separated string is split.
    #[serde(default, deserialize_with = "lenient_keywords")]
    pub keywords: Vec<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_optional_string(deserializer)?.unwrap_or_default())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_keywords<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|keyword| !keyword.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Shape of `npm list --json`.
#[derive(Debug, Deserialize)]
struct ListOutput {
    #[serde(default)]
    dependencies: CacheMap,
}

/// npm-backed package operations for one plugin root.
pub struct NpmManager {
    plugin_dir: PathBuf,
    registry: String,
    npm_command: String,
    timeout: Option<Duration>,
    runner: Arc<dyn CommandRunner>,
    cache: PluginCache,
}

impl NpmManager {
    /// Creates a manager that spawns real npm processes.
    #[must_use]
    pub fn new(plugin_dir: PathBuf, options: &PluginOptions) -> Self {
        Self::with_runner(plugin_dir, options, Arc::new(TokioCommandRunner::new()))
    }

    /// Creates a manager that executes commands through `runner`.
    #[must_use]
    pub fn with_runner(
        plugin_dir: PathBuf,
        options: &PluginOptions,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let cache = PluginCache::new(&plugin_dir);
        Self {
            plugin_dir,
            registry: options.registry.clone(),
            npm_command: options.npm_path.clone(),
            timeout: options.command_timeout,
            runner,
            cache,
        }
    }

    /// Returns the plugin root directory.
    #[must_use]
    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Returns the metadata cache.
    #[must_use]
    pub fn cache(&self) -> &PluginCache {
        &self.cache
    }

    /// Installs a package and records it in the cache.
    ///
    /// `name` is either a registry package or a local path (see
    /// [`is_local_path`]). `version` is appended as `name@version` for
    /// registry installs and ignored for local ones.
    ///
    /// Returns the name the package was installed under.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin root cannot be created, the local path
    /// is invalid, npm is missing, or the install command fails.
    pub async fn install(&self, name: &str, version: Option<&str>) -> PluginManagerResult<String> {
        self.ensure_plugin_dir().await?;

        let installed_name = if is_local_path(name) {
            self.install_from_local(name).await?
        } else {
            self.install_from_registry(name, version).await?;
            name.to_string()
        };

        match self.read_record(&installed_name).await {
            Some(record) => {
                info!("Installed {} v{}", installed_name, record.version);
                self.cache.update_one(&installed_name, record).await?;
            }
            None => warn!(
                "Installed {} but found no readable manifest; cache not updated",
                installed_name
            ),
        }

        Ok(installed_name)
    }

    async fn install_from_local(&self, spec: &str) -> PluginManagerResult<String> {
        let cwd = std::env::current_dir().map_err(|e| PluginManagerError::Install {
            name: spec.to_string(),
            reason: format!("cannot resolve working directory: {e}"),
        })?;
        let local_path = resolve_local_path(spec, &cwd);

        if !validate_local_path(&local_path).await {
            return Err(PluginManagerError::Install {
                name: spec.to_string(),
                reason: format!(
                    "local path does not exist or does not contain a valid package.json: {}",
                    local_path.display()
                ),
            });
        }

        // npm links the package under its own name, not under the path
        let package_name = PackageManifest::read(&local_path.join("package.json"))
            .await
            .ok()
            .flatten()
            .and_then(|manifest| manifest.name)
            .unwrap_or_else(|| spec.to_string());

        let args = vec![
            "install".to_string(),
            local_path.display().to_string(),
            "--prefix".to_string(),
            self.plugin_dir.display().to_string(),
        ];

        let target = local_path.display().to_string();
        self.run_checked(&args, |reason| PluginManagerError::Install {
            name: target,
            reason,
        })
        .await?;

        Ok(package_name)
    }

    async fn install_from_registry(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> PluginManagerResult<()> {
        let spec = match version {
            Some(version) => format!("{name}@{version}"),
            None => name.to_string(),
        };

        let args = vec![
            "install".to_string(),
            spec,
            "--prefix".to_string(),
            self.plugin_dir.display().to_string(),
            "--registry".to_string(),
            self.registry.clone(),
        ];

        self.run_checked(&args, |reason| PluginManagerError::Install {
            name: name.to_string(),
            reason,
        })
        .await?;

        Ok(())
    }

    /// Uninstalls a package and drops its cache record.
    ///
    /// # Errors
    ///
    /// Returns [`PluginManagerError::NotInstalled`] without running npm if the
    /// package directory does not exist, or an error if the command fails.
    pub async fn uninstall(&self, name: &str) -> PluginManagerResult<()> {
        if !self.is_installed(name).await {
            return Err(PluginManagerError::NotInstalled {
                name: name.to_string(),
            });
        }

        let args = vec![
            "uninstall".to_string(),
            name.to_string(),
            "--prefix".to_string(),
            self.plugin_dir.display().to_string(),
        ];

        self.run_checked(&args, |reason| PluginManagerError::Uninstall {
            name: name.to_string(),
            reason,
        })
        .await?;

        self.cache.remove_one(name).await?;
        info!("Uninstalled {}", name);

        Ok(())
    }

    /// Lists installed packages.
    ///
    /// A non-empty cache is returned as is and npm is not invoked. Otherwise
    /// the listing is derived from `npm list` and persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read or written, npm is
    /// missing, or npm times out. Unparseable npm output degrades to an
    /// empty listing.
    pub async fn list(&self) -> PluginManagerResult<CacheMap> {
        let cached = self.cache.read().await?;
        if !cached.is_empty() {
            debug!("Listing {} packages from cache", cached.len());
            return Ok(cached);
        }

        self.list_from_npm().await
    }

    /// Discards the cache and re-derives it from npm.
    ///
    /// # Errors
    ///
    /// Same as [`NpmManager::list`].
    pub async fn refresh(&self) -> PluginManagerResult<CacheMap> {
        self.cache.clear().await?;
        self.list_from_npm().await
    }

    async fn list_from_npm(&self) -> PluginManagerResult<CacheMap> {
        let args = vec![
            "list".to_string(),
            "--prefix".to_string(),
            self.plugin_dir.display().to_string(),
            "--depth=0".to_string(),
            "--json".to_string(),
        ];

        let mut dependencies = match self.execute(&args).await {
            Ok(output) => {
                if !output.is_success() {
                    warn!(
                        "npm list failed ({}), salvaging dependencies from its output",
                        output.failure_reason()
                    );
                }
                parse_dependencies(&output.stdout)
            }
            Err(e @ (PluginManagerError::CommandNotFound { .. }
            | PluginManagerError::CommandTimeout { .. })) => return Err(e),
            Err(e) => {
                warn!("npm list could not run: {e}");
                CacheMap::new()
            }
        };

        for (name, record) in &mut dependencies {
            record.description = self.package_description(name).await;
        }

        self.cache.rebuild(&dependencies).await?;
        Ok(dependencies)
    }

    /// Searches the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if npm is missing, the command fails, or its output
    /// is not a JSON array of packages.
    pub async fn search(&self, keyword: &str) -> PluginManagerResult<Vec<SearchResult>> {
        let args = vec![
            "search".to_string(),
            keyword.to_string(),
            "--json".to_string(),
            "--registry".to_string(),
            self.registry.clone(),
        ];

        let output = self
            .run_checked(&args, |reason| PluginManagerError::Search {
                keyword: keyword.to_string(),
                reason,
            })
            .await?;

        serde_json::from_str(&output.stdout).map_err(|e| PluginManagerError::Search {
            keyword: keyword.to_string(),
            reason: format!("invalid JSON output: {e}"),
        })
    }

    /// Returns `true` if the package directory exists under `node_modules`.
    pub async fn is_installed(&self, name: &str) -> bool {
        tokio::fs::try_exists(package_dir(&self.plugin_dir, name))
            .await
            .unwrap_or(false)
    }

    /// Returns the version from the installed package manifest.
    pub async fn installed_version(&self, name: &str) -> Option<String> {
        PackageManifest::read(&manifest_path(&self.plugin_dir, name))
            .await
            .ok()
            .flatten()
            .map(|manifest| manifest.version)
            .filter(|version| !version.is_empty())
    }

    async fn ensure_plugin_dir(&self) -> PluginManagerResult<()> {
        tokio::fs::create_dir_all(&self.plugin_dir)
            .await
            .map_err(|source| PluginManagerError::StorageCreation {
                path: self.plugin_dir.clone(),
                source,
            })
    }

    /// Builds a fresh cache record from the installed manifest.
    async fn read_record(&self, name: &str) -> Option<PackageRecord> {
        match PackageManifest::read(&manifest_path(&self.plugin_dir, name)).await {
            Ok(Some(manifest)) => Some(PackageRecord {
                description: manifest.description_or_empty(),
                version: manifest.version,
                resolved: String::new(),
                overridden: false,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring manifest of {}: {}", name, e);
                None
            }
        }
    }

    async fn package_description(&self, name: &str) -> String {
        PackageManifest::read(&manifest_path(&self.plugin_dir, name))
            .await
            .ok()
            .flatten()
            .map(|manifest| manifest.description_or_empty())
            .unwrap_or_default()
    }

    /// Runs npm and requires a zero exit code.
    ///
    /// Spawn and exit failures are described through `wrap`; a missing
    /// executable and a timeout keep their own error kinds.
    async fn run_checked<F>(&self, args: &[String], wrap: F) -> PluginManagerResult<CommandOutput>
    where
        F: FnOnce(String) -> PluginManagerError,
    {
        let output = match self.execute(args).await {
            Ok(output) => output,
            Err(PluginManagerError::Io(e)) => return Err(wrap(e.to_string())),
            Err(e) => return Err(e),
        };

        if !output.is_success() {
            let reason = output.failure_reason();
            warn!("{} {} failed: {}", self.npm_command, args.join(" "), reason);
            return Err(wrap(reason));
        }

        Ok(output)
    }

    async fn execute(&self, args: &[String]) -> PluginManagerResult<CommandOutput> {
        debug!("Executing: {} {}", self.npm_command, args.join(" "));

        let run = self.runner.run(&self.npm_command, args);
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, run).await.map_err(|_| {
                PluginManagerError::CommandTimeout {
                    command: format!("{} {}", self.npm_command, args.join(" ")),
                    timeout,
                }
            })?,
            None => run.await,
        };

        result.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PluginManagerError::CommandNotFound {
                    command: self.npm_command.clone(),
                }
            } else {
                PluginManagerError::Io(e)
            }
        })
    }
}

/// Extracts the dependency map from `npm list --json` output.
fn parse_dependencies(stdout: &str) -> CacheMap {
    match serde_json::from_str::<ListOutput>(stdout) {
        Ok(output) => output.dependencies,
        Err(e) => {
            warn!("Could not parse npm list output: {e}");
            CacheMap::new()
        }
    }
}
