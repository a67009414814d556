//! Configuration loader.
//!
//! `npmplug.toml` is looked up from the working directory upward. A relative
//! `plugin.dir` is anchored at the directory holding the file that declared
//! it, so a project can keep its plugin root next to its configuration.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Config, ConfigError, ConfigResult};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "npmplug.toml";

/// Loads and validates configuration from the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut config: Config = toml::from_str(&content)?;
    config.validate()?;

    if let (Some(dir), Some(base)) = (config.plugin.dir.as_mut(), path.parent())
        && dir.is_relative()
    {
        *dir = base.join(&*dir);
    }

    debug!(?path, plugin_dir = ?config.plugin.dir, "loaded configuration");
    Ok(config)
}

/// Returns the nearest `npmplug.toml` at or above `start_dir`.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    start_dir
        .as_ref()
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Finds and loads configuration from the current directory or parents.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if no file exists, or the error from
/// [`load_config`] for the nearest one.
pub fn find_and_load_config() -> ConfigResult<Config> {
    let current_dir = std::env::current_dir()?;
    find_and_load_config_from(&current_dir)
}

/// Finds and loads configuration starting from the given directory.
///
/// # Errors
///
/// Same as [`find_and_load_config`].
pub fn find_and_load_config_from(start_dir: impl AsRef<Path>) -> ConfigResult<Config> {
    let start_dir = start_dir.as_ref();
    match find_config_file(start_dir) {
        Some(path) => load_config(path),
        None => Err(ConfigError::NotFound(start_dir.join(CONFIG_FILE_NAME))),
    }
}
