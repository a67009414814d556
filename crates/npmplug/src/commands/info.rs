//! `npmplug info`.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the `info` command.
#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Package name
    pub name: String,
}

/// Shows the on-disk install state of a plugin.
pub async fn run(ctx: &Context, args: InfoArgs) -> Result<()> {
    let system = ctx.system()?;

    println!("Name:        {}", args.name);
    println!("Plugin root: {}", system.plugin_dir().display());

    if !system.is_installed(&args.name).await {
        println!("Installed:   no");
        return Ok(());
    }

    println!("Installed:   yes");
    match system.installed_version(&args.name).await {
        Some(version) => println!("Version:     {version}"),
        None => println!("Version:     unknown"),
    }

    Ok(())
}
