//! Error types for the plugin manager.

use std::path::PathBuf;
use std::time::Duration;

/// Result type for plugin manager operations.
pub type PluginManagerResult<T> = Result<T, PluginManagerError>;

/// Boxed error returned by a module importer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Plugin manager error types.
#[derive(Debug, thiserror::Error)]
pub enum PluginManagerError {
    /// Plugin id does not match `^[a-z][a-z0-9-]*$` or is shorter than 3 characters.
    #[error("invalid plugin id: {id}")]
    InvalidPluginId { id: String },

    /// The home directory could not be determined for the default plugin root.
    #[error("could not determine home directory for plugin root .{id}")]
    HomeDirUnavailable { id: String },

    /// Failed to create the plugin root directory.
    #[error("failed to create plugin directory: {path}")]
    StorageCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured package manager executable cannot be found.
    #[error(
        "npm command not found: {command}. Please ensure npm is installed or configure a custom npm path"
    )]
    CommandNotFound { command: String },

    /// The package manager did not finish within the configured timeout.
    #[error("command timed out after {timeout:?}: {command}")]
    CommandTimeout { command: String, timeout: Duration },

    /// Installation failed.
    #[error("failed to install plugin {name}: {reason}")]
    Install { name: String, reason: String },

    /// Uninstallation failed.
    #[error("failed to uninstall plugin {name}: {reason}")]
    Uninstall { name: String, reason: String },

    /// Registry search failed.
    #[error("failed to search plugins for \"{keyword}\": {reason}")]
    Search { keyword: String, reason: String },

    /// Uninstall requested for a package that is not on disk.
    #[error("plugin {name} is not installed")]
    NotInstalled { name: String },

    /// Load requested for a package without a manifest.
    #[error("plugin package not found: {name}")]
    PluginNotFound { name: String },

    /// A package manifest exists but cannot be parsed.
    #[error("invalid package manifest at {path}")]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Importing the resolved entry module failed.
    #[error("failed to load plugin {name}")]
    Load {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The host module runtime could not be started.
    #[error("failed to start the module runtime")]
    Runtime(#[source] npmplug_wasm_runtime::WasmError),

    /// Failed to read the cache file.
    #[error("failed to read cache file {path}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the cache file.
    #[error("failed to write cache file {path}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the cache file.
    #[error("failed to parse cache file {path}")]
    CacheParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the cache.
    #[error("failed to serialize cache")]
    CacheSerialize(#[source] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
