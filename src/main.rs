//! runbook - discover, rewrite, and inspect scripts embedded in a vault
//!
//! This is the main entry point for the runbook binary.

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing; --verbose turns on debug logging unless RUST_LOG
    // already says otherwise
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("runbook=debug,runbook_engine=debug")
        })
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    // Execute the command
    match &cli.command {
        Some(Commands::Init(args)) => commands::init::run(args, &cli).await,
        Some(Commands::List(args)) => commands::list::run(args, &cli).await,
        Some(Commands::Show(args)) => commands::show::run(args, &cli).await,
        Some(Commands::Rewrite(args)) => commands::rewrite::run(args, &cli).await,
        Some(Commands::Deps(args)) => commands::deps::run(args, &cli).await,
        Some(Commands::Check(args)) => commands::check::run(args, &cli).await,
        None => {
            println!("{}", "Usage: runbook <command> [options]".yellow());
            println!();
            println!("Run {} for more information", "runbook --help".cyan());
            Ok(())
        }
    }
}
