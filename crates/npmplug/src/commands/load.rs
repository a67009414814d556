//! `npmplug load`.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for the `load` command.
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Package name
    pub name: String,
}

/// Loads a plugin through the WASM runtime and prints its exports.
pub async fn run(ctx: &Context, args: LoadArgs) -> Result<()> {
    let mut system = ctx.system()?;

    let plugin = system
        .load(&args.name)
        .await
        .with_context(|| format!("failed to load {}", args.name))?;

    let kind = if plugin.is_component() {
        "component"
    } else {
        "module"
    };
    println!(
        "Loaded {} ({kind}) from {}",
        args.name,
        plugin.path().display()
    );

    if plugin.exports().is_empty() {
        println!("No exports.");
        return Ok(());
    }

    println!("\nExports:");
    for export in plugin.exports() {
        println!("  - {export}");
    }

    Ok(())
}
