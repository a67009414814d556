//! Command implementations.

pub mod info;
pub mod install;
pub mod list;
pub mod load;
pub mod search;
pub mod uninstall;
pub mod update;

use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use npmplug_config::{Config, ConfigError, find_and_load_config, load_config};
use npmplug_manager::{NpmPluginSystem, PluginOptions};

use crate::cli::GlobalArgs;

/// Plugin id and options resolved from flags, environment and config file.
#[derive(Debug)]
pub struct Context {
    pub id: String,
    pub options: PluginOptions,
}

impl Context {
    /// Merges command line settings over the configuration file.
    pub fn resolve(global: &GlobalArgs) -> Result<Self> {
        let config = match &global.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => match find_and_load_config() {
                Ok(config) => config,
                Err(ConfigError::NotFound(_)) => Config::default(),
                Err(e) => return Err(e).context("failed to load npmplug.toml"),
            },
        };
        let plugin = config.plugin;

        let Some(id) = global.id.clone().or(plugin.id.clone()) else {
            bail!("no plugin id given; pass --id or set plugin.id in npmplug.toml");
        };

        let mut options = PluginOptions::new()
            .with_registry(global.registry.clone().unwrap_or(plugin.registry.clone()))
            .with_npm_path(global.npm_path.clone().unwrap_or(plugin.npm_path.clone()));

        if let Some(dir) = global.plugin_dir.clone().or(plugin.dir.clone()) {
            options = options.with_plugin_dir(dir);
        }

        match global.timeout {
            Some(0) => bail!("--timeout must be positive"),
            Some(secs) => options = options.with_command_timeout(Duration::from_secs(secs)),
            None => {
                if let Some(timeout) = plugin.timeout() {
                    options = options.with_command_timeout(timeout);
                }
            }
        }

        tracing::debug!(?options, "resolved options for {id}");

        Ok(Self { id, options })
    }

    /// Creates the plugin system for this invocation.
    pub fn system(&self) -> Result<NpmPluginSystem> {
        NpmPluginSystem::new(&self.id, self.options.clone())
            .with_context(|| format!("failed to initialize plugin system for {}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use npmplug_manager::PluginDirSource;
    use tempfile::TempDir;

    use super::*;

    fn args_with_config(config: &Path) -> GlobalArgs {
        GlobalArgs {
            id: None,
            plugin_dir: None,
            registry: None,
            npm_path: None,
            timeout: None,
            config: Some(config.to_path_buf()),
        }
    }

    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("npmplug.toml");
        fs::write(
            &path,
            r#"
            [plugin]
            id = "config-app"
            dir = "plugins"
            registry = "https://npm.internal.example"
            npm_path = "/opt/node/bin/npm"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_resolve_uses_config_values() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        let ctx = Context::resolve(&args_with_config(&config)).unwrap();

        assert_eq!(ctx.id, "config-app");
        assert_eq!(ctx.options.registry, "https://npm.internal.example");
        assert_eq!(ctx.options.npm_path, "/opt/node/bin/npm");
        assert_eq!(ctx.options.command_timeout, Some(Duration::from_secs(30)));
        assert!(matches!(
            ctx.options.plugin_dir,
            PluginDirSource::Path(ref dir) if *dir == temp.path().join("plugins")
        ));
    }

    #[test]
    fn test_resolve_flags_override_config() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        let mut args = args_with_config(&config);
        args.id = Some("flag-app".to_string());
        args.registry = Some("https://registry.example.org".to_string());
        args.npm_path = Some("pnpm".to_string());
        args.timeout = Some(5);
        args.plugin_dir = Some(PathBuf::from("/srv/plugins"));

        let ctx = Context::resolve(&args).unwrap();

        assert_eq!(ctx.id, "flag-app");
        assert_eq!(ctx.options.registry, "https://registry.example.org");
        assert_eq!(ctx.options.npm_path, "pnpm");
        assert_eq!(ctx.options.command_timeout, Some(Duration::from_secs(5)));
        assert!(matches!(
            ctx.options.plugin_dir,
            PluginDirSource::Path(ref dir) if dir == Path::new("/srv/plugins")
        ));
    }

    #[test]
    fn test_resolve_rejects_zero_timeout_flag() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        let mut args = args_with_config(&config);
        args.timeout = Some(0);

        assert!(Context::resolve(&args).is_err());
    }

    #[test]
    fn test_resolve_rejects_invalid_config() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("npmplug.toml");
        fs::write(&config, "[plugin]\nid = \"my-app\"\nregistry = \"\"\n").unwrap();

        let err = Context::resolve(&args_with_config(&config)).unwrap_err();
        assert!(format!("{err:#}").contains("plugin.registry must not be empty"));
    }
}
