//! Command implementations for the runbook binary.

pub mod check;
pub mod deps;
pub mod init;
pub mod list;
pub mod rewrite;
pub mod show;

use std::sync::Arc;

use runbook_engine::config::CONFIG_FILE;
use runbook_engine::{Config, NullEngine, Runtime, Vault};
use tracing::debug;

use crate::cli::Cli;

/// Common context for command execution.
pub struct CommandContext {
    pub runtime: Runtime,
}

impl CommandContext {
    /// Build a runtime for the vault named on the command line.
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load(&cli.vault.join(CONFIG_FILE))?;
        let vault = Vault::new(&cli.vault);
        let runtime = Runtime::new(vault, config, Arc::new(NullEngine::new()));
        Ok(Self { runtime })
    }

    /// Build the runtime and scan the vault into its registry.
    pub async fn scanned(cli: &Cli) -> anyhow::Result<Self> {
        let ctx = Self::new(cli)?;
        ctx.runtime.refresh().await?;
        debug!(
            "Scanned {} codes from {}",
            ctx.runtime.registry().len(),
            cli.vault.display()
        );
        Ok(ctx)
    }
}
