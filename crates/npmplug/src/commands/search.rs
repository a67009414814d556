//! `npmplug search`.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for the `search` command.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search keyword
    pub keyword: String,
}

/// Searches the registry and prints matches.
pub async fn run(ctx: &Context, args: SearchArgs) -> Result<()> {
    let system = ctx.system()?;

    println!("Searching for \"{}\"...\n", args.keyword);

    let results = system
        .search(&args.keyword)
        .await
        .context("failed to search the registry")?;

    if results.is_empty() {
        println!("No plugins found.");
        return Ok(());
    }

    for result in results {
        println!("  {} v{}", result.name, result.version);
        if let Some(desc) = result.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {desc}");
        }
    }

    Ok(())
}
