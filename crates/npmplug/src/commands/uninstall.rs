//! `npmplug uninstall`.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for the `uninstall` command.
#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// Package name
    pub name: String,
}

/// Uninstalls a plugin.
pub async fn run(ctx: &Context, args: UninstallArgs) -> Result<()> {
    let mut system = ctx.system()?;

    system
        .uninstall(&args.name)
        .await
        .with_context(|| format!("failed to uninstall {}", args.name))?;

    println!("Uninstalled {}", args.name);

    Ok(())
}
