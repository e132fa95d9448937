//! Init command implementation.

use owo_colors::OwoColorize;
use runbook_engine::config::CONFIG_FILE;
use runbook_engine::Config;

use crate::cli::{Cli, InitArgs};

/// Run the init command.
pub async fn run(args: &InitArgs, cli: &Cli) -> anyhow::Result<()> {
    let config_path = cli.vault.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        println!(
            "{}",
            format!("{} already exists. Use --force to overwrite.", CONFIG_FILE).yellow()
        );
        return Ok(());
    }

    let config = Config::default();
    config.save(&config_path)?;
    std::fs::create_dir_all(cli.vault.join(&config.scripts_folder))?;

    println!(
        "{} {}",
        "Created".green(),
        config_path.display().to_string().cyan()
    );
    println!(
        "{} {}",
        "Created".green(),
        format!("{}/", config.scripts_folder).cyan()
    );
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
