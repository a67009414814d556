//! CLI definition.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::commands;

/// Install, update and load npm packages as application plugins.
#[derive(Debug, Parser)]
#[command(name = "npmplug")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every command. They override `npmplug.toml`.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Plugin id of the host application (e.g. "my-app")
    #[arg(long, global = true, env = "NPMPLUG_ID")]
    pub id: Option<String>,

    /// Plugin root directory (defaults to ~/.<id>)
    #[arg(long, global = true, env = "NPMPLUG_PLUGIN_DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// npm registry URL
    #[arg(long, global = true, env = "NPMPLUG_REGISTRY")]
    pub registry: Option<String>,

    /// npm executable name or path
    #[arg(long, global = true, env = "NPMPLUG_NPM_PATH")]
    pub npm_path: Option<String>,

    /// Timeout in seconds for each npm invocation
    #[arg(long, global = true, env = "NPMPLUG_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file (defaults to the nearest npmplug.toml)
    #[arg(long, global = true, env = "NPMPLUG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search the registry for plugins
    Search(commands::search::SearchArgs),

    /// Install a plugin from the registry or a local directory
    Install(commands::install::InstallArgs),

    /// Uninstall a plugin
    Uninstall(commands::uninstall::UninstallArgs),

    /// Reinstall a plugin, optionally at another version
    Update(commands::update::UpdateArgs),

    /// List installed plugins
    List(commands::list::ListArgs),

    /// Show whether a plugin is installed and its version
    Info(commands::info::InfoArgs),

    /// Load a plugin and show its exports
    Load(commands::load::LoadArgs),
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
        rt.block_on(self.run_async())
    }

    async fn run_async(self) -> Result<()> {
        let ctx = commands::Context::resolve(&self.global)?;

        match self.command {
            Commands::Search(args) => commands::search::run(&ctx, args).await,
            Commands::Install(args) => commands::install::run(&ctx, args).await,
            Commands::Uninstall(args) => commands::uninstall::run(&ctx, args).await,
            Commands::Update(args) => commands::update::run(&ctx, args).await,
            Commands::List(args) => commands::list::run(&ctx, args).await,
            Commands::Info(args) => commands::info::run(&ctx, args).await,
            Commands::Load(args) => commands::load::run(&ctx, args).await,
        }
    }
}
