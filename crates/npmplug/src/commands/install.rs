//! `npmplug install`.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for the `install` command.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Package name, or a local directory ("./my-plugin", "file:../plugin", "/abs/path")
    pub name: String,

    /// Version or dist-tag to install (registry packages only)
    pub version: Option<String>,
}

/// Installs a plugin.
pub async fn run(ctx: &Context, args: InstallArgs) -> Result<()> {
    let system = ctx.system()?;

    println!("Installing {}...", args.name);

    let installed = system
        .install(&args.name, args.version.as_deref())
        .await
        .with_context(|| format!("failed to install {}", args.name))?;

    match system.installed_version(&installed).await {
        Some(version) => println!("Installed {installed} v{version}"),
        None => println!("Installed {installed}"),
    }

    Ok(())
}
