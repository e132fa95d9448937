// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Vault scanning
//!
//! Discovers every code in a vault: directive-carrying code blocks in
//! markdown notes first, then script files under the scripts folder.
//! `.js` files register as scripts and `.mjs` files as modules. A file's
//! name defaults to its vault path with the scripts-folder prefix
//! rewritten to `./`, unless a JSDoc `@runbook` directive overrides it.

pub mod directive;
pub mod markdown;

use crate::code::{Code, CodeForm, CodeKind};
use crate::error::Result;
use crate::vault::Vault;
use std::path::Path;
use tracing::{info, warn};

pub use directive::{jsdoc_directive, parse_directive, Directive};
pub use markdown::codes_in_note;

/// Default vault folder holding script and module files
pub const DEFAULT_SCRIPTS_FOLDER: &str = "scripts";

/// Discover every code in the vault, in registration order
pub async fn scan_vault(vault: &Vault, scripts_folder: &str) -> Result<Vec<Code>> {
    let mut codes = Vec::new();

    for note in vault.markdown_files().await? {
        let content = match vault.read(&note).await {
            Ok(content) => content,
            Err(err) => {
                warn!(note = note.as_str(), error = %err, "skipping unreadable note");
                continue;
            }
        };
        codes.extend(markdown::codes_in_note(&note, &content));
    }

    let prefix = format!("{}/", scripts_folder);
    for path in vault.files_with_extensions(&["js", "mjs"]).await? {
        if !path.starts_with(&prefix) {
            continue;
        }
        let content = match vault.read(&path).await {
            Ok(content) => content,
            Err(err) => {
                warn!(file = path.as_str(), error = %err, "skipping unreadable script file");
                continue;
            }
        };
        if let Some(code) = code_in_file(&path, &content, scripts_folder) {
            codes.push(code);
        }
    }

    info!(count = codes.len(), "vault scan complete");
    Ok(codes)
}

/// Build the code a script file registers, if it registers one
///
/// The extension decides the kind. A JSDoc directive may override the
/// name and supply order and description; its `t` field is ignored.
pub fn code_in_file(path: &str, content: &str, scripts_folder: &str) -> Option<Code> {
    if content.is_empty() {
        return None;
    }

    let extension = Path::new(path).extension().and_then(|ext| ext.to_str())?;
    let kind = CodeKind::from_extension(extension)?;

    let directive = directive::jsdoc_directive(content)
        .and_then(|value| directive::parse_directive(&value))
        .unwrap_or_default();

    let prefix = format!("{}/", scripts_folder);
    let name = directive.name.unwrap_or_else(|| match path.strip_prefix(&prefix) {
        Some(rest) => format!("./{}", rest),
        None => path.to_string(),
    });

    Some(Code {
        name,
        desc: directive.desc,
        text: String::new(),
        kind,
        form: CodeForm::File,
        file: path.to_string(),
        order: directive.order,
        line: None,
    })
}
