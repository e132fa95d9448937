//! Rewrite command implementation.

use anyhow::bail;
use runbook_engine::CodeKind;

use crate::cli::{Cli, RewriteArgs};
use crate::commands::CommandContext;

/// Run the rewrite command.
pub async fn run(args: &RewriteArgs, cli: &Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::scanned(cli).await?;

    let Some(code) = ctx.runtime.registry().get(&args.name) else {
        bail!("no code named '{}' in the vault", args.name);
    };

    // Default to the folder the code would resolve against when actually
    // loaded: modules resolve from their registered name, scripts from the
    // file they live in.
    let folder = match &args.folder {
        Some(folder) => folder.clone(),
        None => match code.kind {
            CodeKind::Module => code.folder(),
            CodeKind::Script => code.run_folder(&ctx.runtime.config().scripts_folder),
        },
    };

    let text = ctx.runtime.vault().code_text(&code).await?;
    let rewritten = ctx.runtime.loader().rewriter().rewrite(&text, &folder);
    println!("{}", rewritten);

    Ok(())
}
