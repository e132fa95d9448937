//! Deps command implementation.

use anyhow::bail;
use owo_colors::OwoColorize;
use runbook_engine::ModuleSource;

use crate::cli::{Cli, DepsArgs};
use crate::commands::CommandContext;

/// Run the deps command.
pub async fn run(args: &DepsArgs, cli: &Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::scanned(cli).await?;
    let loader = ctx.runtime.loader();

    if ctx.runtime.registry().get(&args.name).is_none() {
        bail!("no code named '{}' in the vault", args.name);
    }

    let specs = loader.dependencies(&args.name).await?;
    if specs.is_empty() {
        println!("{}", "No imports.".dimmed());
        return Ok(());
    }

    for spec in &specs {
        let source = loader.classify(spec);
        let label = format!("({})", source);
        match source {
            ModuleSource::Host => println!("  {} {}", spec.magenta(), label.dimmed()),
            ModuleSource::Remote => println!("  {} {}", spec.blue(), label.dimmed()),
            ModuleSource::Registered => println!("  {} {}", spec.green(), label.dimmed()),
            ModuleSource::Native => println!("  {} {}", spec.yellow(), label.dimmed()),
        }
    }

    Ok(())
}
