//! CLI argument parsing for the runbook binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// runbook - discover, rewrite, and inspect scripts embedded in a vault
#[derive(Parser, Debug)]
#[command(name = "runbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault root directory
    #[arg(long, global = true, default_value = ".", value_name = "PATH")]
    pub vault: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a default .runbook.json in the vault
    Init(InitArgs),

    /// Scan the vault and list discovered codes
    #[command(alias = "ls")]
    List(ListArgs),

    /// Print a code's source text
    #[command(alias = "cat")]
    Show(ShowArgs),

    /// Print a code's source with its imports rewritten
    Rewrite(RewriteArgs),

    /// List the module specifiers a code loads
    Deps(DepsArgs),

    /// Scan the vault and report shadowed names and empty modules
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Print the registry as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Registered code name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Registered code name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Folder to resolve relative specifiers against
    #[arg(long, value_name = "FOLDER")]
    pub folder: Option<String>,
}

#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Registered code name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Print findings as JSON
    #[arg(long)]
    pub json: bool,
}
