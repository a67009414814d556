//! `npmplug list`.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for the `list` command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Rebuild the local cache from npm before listing
    #[arg(long)]
    pub refresh: bool,
}

/// Lists installed plugins.
pub async fn run(ctx: &Context, args: ListArgs) -> Result<()> {
    let system = ctx.system()?;

    let plugins = if args.refresh {
        system.refresh().await
    } else {
        system.list().await
    }
    .context("failed to list plugins")?;

    if plugins.is_empty() {
        println!("No plugins installed.");
        return Ok(());
    }

    println!("Installed plugins:\n");

    for plugin in plugins {
        println!("  {} v{}", plugin.name, plugin.version);
    }

    Ok(())
}
