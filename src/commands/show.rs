//! Show command implementation.

use anyhow::bail;
use owo_colors::OwoColorize;
use runbook_engine::CodeForm;

use crate::cli::{Cli, ShowArgs};
use crate::commands::CommandContext;

/// Run the show command.
pub async fn run(args: &ShowArgs, cli: &Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::scanned(cli).await?;

    let Some(code) = ctx.runtime.registry().get(&args.name) else {
        bail!("no code named '{}' in the vault", args.name);
    };

    let location = match (code.form, code.line) {
        (CodeForm::Codeblock, Some(line)) => format!("{}:{}", code.file, line),
        _ => code.file.clone(),
    };
    println!(
        "{} {} {}",
        code.name.cyan().bold(),
        format!("({})", code.kind).dimmed(),
        location.dimmed()
    );
    if !code.desc.is_empty() {
        println!("{}", code.desc.dimmed());
    }
    println!();

    let text = ctx.runtime.vault().code_text(&code).await?;
    println!("{}", text);

    Ok(())
}
