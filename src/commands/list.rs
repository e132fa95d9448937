//! List command implementation.

use owo_colors::OwoColorize;
use runbook_engine::{Code, CodeKind};

use crate::cli::{Cli, ListArgs};
use crate::commands::CommandContext;

/// Run the list command.
pub async fn run(args: &ListArgs, cli: &Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::scanned(cli).await?;
    let registry = ctx.runtime.registry();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&registry.snapshot())?);
        return Ok(());
    }

    let codes = registry.codes();
    if codes.is_empty() {
        println!("{}", "No codes found.".yellow());
        return Ok(());
    }

    let (scripts, modules): (Vec<_>, Vec<_>) = codes
        .iter()
        .cloned()
        .partition(|code| code.kind == CodeKind::Script);

    if !scripts.is_empty() {
        println!("{}", "scripts:".white().bold());
        for code in &scripts {
            print_code(code);
        }
        println!();
    }

    if !modules.is_empty() {
        println!("{}", "modules:".white().bold());
        for code in &modules {
            print_code(code);
        }
        println!();
    }

    println!(
        "{} script(s), {} module(s) in {}",
        scripts.len(),
        modules.len(),
        ctx.runtime.vault().root().display().to_string().dimmed()
    );

    Ok(())
}

fn print_code(code: &Code) {
    print!("  {}", code.name.cyan());
    match code.line {
        Some(line) => print!("  {}", format!("{}:{}", code.file, line).dimmed()),
        None => print!("  {}", code.file.dimmed()),
    }
    if !code.desc.is_empty() {
        print!(" - {}", code.desc.dimmed());
    }
    println!();
}
