//! npm-backed plugin manager.
//!
//! This crate handles:
//! - Plugin id validation and plugin root resolution
//! - Installing, uninstalling, listing and searching packages through npm
//! - A local JSON cache of installed package metadata
//! - Loading installed packages through a pluggable module importer
//!   (the WASM runtime by default)

pub mod cache;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod npm;
pub mod options;
pub mod paths;
pub mod runner;
pub mod system;

pub use cache::{CacheMap, PackageRecord, PluginCache};
pub use error::{BoxError, PluginManagerError, PluginManagerResult};
pub use loader::{ModuleImporter, PluginLoader};
pub use manifest::PackageManifest;
pub use npm::{NpmManager, SearchResult};
pub use options::{PluginDirSource, PluginOptions};
pub use paths::{is_local_path, resolve_local_path, validate_local_path, validate_plugin_id};
pub use runner::{CommandOutput, CommandRunner, TokioCommandRunner};
pub use system::{NpmPluginSystem, PluginInfo};
