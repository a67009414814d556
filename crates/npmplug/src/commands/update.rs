//! `npmplug update`.

use std::cmp::Ordering;

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for the `update` command.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Package name
    pub name: String,

    /// Version or dist-tag to install (defaults to latest)
    pub version: Option<String>,
}

/// Reinstalls a plugin.
///
/// The old version is removed before the new one is installed, so a failed
/// install leaves the plugin uninstalled.
pub async fn run(ctx: &Context, args: UpdateArgs) -> Result<()> {
    let mut system = ctx.system()?;

    let previous = system.installed_version(&args.name).await;

    println!("Updating {}...", args.name);

    let installed = system
        .update(&args.name, args.version.as_deref())
        .await
        .with_context(|| {
            format!(
                "failed to update {}; it may now be uninstalled",
                args.name
            )
        })?;

    let current = system.installed_version(&installed).await;

    match (previous, current) {
        (Some(previous), Some(current)) => {
            println!(
                "Updated {installed} {previous} -> {current}{}",
                describe_change(&previous, &current)
            );
        }
        (_, Some(current)) => println!("Updated {installed} to {current}"),
        _ => println!("Updated {installed}"),
    }

    Ok(())
}

/// Describes the direction of a version change when both sides are semver.
fn describe_change(previous: &str, current: &str) -> &'static str {
    let (Ok(previous), Ok(current)) = (
        semver::Version::parse(previous),
        semver::Version::parse(current),
    ) else {
        return "";
    };

    match current.cmp(&previous) {
        Ordering::Greater => " (upgrade)",
        Ordering::Less => " (downgrade)",
        Ordering::Equal => " (reinstalled)",
    }
}
