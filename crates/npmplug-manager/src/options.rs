//! Plugin system options.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default npm registry.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Default package manager executable.
pub const DEFAULT_NPM_PATH: &str = "npm";

/// Where the plugin root directory comes from.
#[derive(Clone, Default)]
pub enum PluginDirSource {
    /// `~/.{plugin-id}`.
    #[default]
    Default,
    /// A fixed directory.
    Path(PathBuf),
    /// Computed when the plugin system is created.
    Producer(Arc<dyn Fn() -> PathBuf + Send + Sync>),
}

impl fmt::Debug for PluginDirSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Options for creating a plugin system.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Plugin root directory.
    pub plugin_dir: PluginDirSource,
    /// Registry passed to install and search commands.
    pub registry: String,
    /// Package manager executable name or path.
    pub npm_path: String,
    /// Upper bound for a single package manager invocation.
    pub command_timeout: Option<Duration>,
}

impl PluginOptions {
    /// Creates options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugin_dir: PluginDirSource::Default,
            registry: DEFAULT_REGISTRY.to_string(),
            npm_path: DEFAULT_NPM_PATH.to_string(),
            command_timeout: None,
        }
    }

    /// Sets a fixed plugin root directory.
    #[must_use]
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = PluginDirSource::Path(dir.into());
        self
    }

    /// Sets a function producing the plugin root directory.
    #[must_use]
    pub fn with_plugin_dir_fn<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> PathBuf + Send + Sync + 'static,
    {
        self.plugin_dir = PluginDirSource::Producer(Arc::new(produce));
        self
    }

    /// Sets the registry URL.
    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Sets the package manager executable.
    #[must_use]
    pub fn with_npm_path(mut self, npm_path: impl Into<String>) -> Self {
        self.npm_path = npm_path.into();
        self
    }

    /// Bounds every package manager invocation.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self::new()
    }
}
