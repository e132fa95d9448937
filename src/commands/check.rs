//! Check command implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::bail;
use owo_colors::OwoColorize;
use runbook_engine::{Code, CodeKind};
use serde_json::json;

use crate::cli::{Cli, CheckArgs};
use crate::commands::CommandContext;

/// Run the check command.
pub async fn run(args: &CheckArgs, cli: &Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::scanned(cli).await?;
    let registry = ctx.runtime.registry();

    // Names registered more than once. Running by name uses the first
    // registration, module imports resolve to the last.
    let codes = registry.codes();
    let mut by_name: BTreeMap<&str, Vec<&Arc<Code>>> = BTreeMap::new();
    for code in &codes {
        by_name.entry(code.name.as_str()).or_default().push(code);
    }
    let collisions: Vec<(&str, &Vec<&Arc<Code>>)> = by_name
        .iter()
        .filter(|(_, entries)| entries.len() > 1)
        .map(|(name, entries)| (*name, entries))
        .collect();

    // Module map winners whose body is blank. Importing one fails at load
    // time with nothing useful to evaluate.
    let mut empty_modules: Vec<Arc<Code>> = Vec::new();
    for code in registry.modules() {
        let text = ctx.runtime.vault().code_text(&code).await?;
        if text.trim().is_empty() {
            empty_modules.push(code);
        }
    }

    let problems = collisions.len() + empty_modules.len();

    if args.json {
        let report = json!({
            "collisions": collisions
                .iter()
                .map(|(name, entries)| {
                    json!({
                        "name": name,
                        "files": entries.iter().map(|code| code.file.clone()).collect::<Vec<_>>(),
                        "runs": entries[0].file,
                        "imports": registry.module(name).map(|code| code.file.clone()),
                    })
                })
                .collect::<Vec<_>>(),
            "empty_modules": empty_modules
                .iter()
                .map(|code| json!({ "name": code.name, "file": code.file }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        if problems > 0 {
            bail!("{} problem(s) found", problems);
        }
        return Ok(());
    }

    if !collisions.is_empty() {
        println!("{}", "shadowed names:".white().bold());
        for (name, entries) in &collisions {
            println!("  {}", name.cyan());
            for code in entries.iter() {
                let location = match code.line {
                    Some(line) => format!("{}:{}", code.file, line),
                    None => code.file.clone(),
                };
                println!("    {} {}", location.dimmed(), format!("({})", code.kind).dimmed());
            }
            println!("    {} {}", "runs:".dimmed(), entries[0].file.yellow());
            if let Some(winner) = registry.module(name) {
                if entries.iter().any(|code| code.kind == CodeKind::Module) {
                    println!("    {} {}", "imports:".dimmed(), winner.file.yellow());
                }
            }
        }
        println!();
    }

    if !empty_modules.is_empty() {
        println!("{}", "empty modules:".white().bold());
        for code in &empty_modules {
            println!("  {}  {}", code.name.cyan(), code.file.dimmed());
        }
        println!();
    }

    if problems == 0 {
        println!(
            "{} {} code(s) checked",
            "No problems found.".green(),
            registry.len()
        );
        Ok(())
    } else {
        bail!("{} problem(s) found", problems);
    }
}
