// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Code records discovered in the vault

use crate::module_system::resolver;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a code record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    /// Directly executable entry point
    Script,
    /// Importable-only, cached by the module loader
    Module,
}

impl CodeKind {
    /// Parse a directive type field (`"s"`/`"m"` short forms accepted)
    pub fn from_directive(value: &str) -> Option<Self> {
        match value {
            "s" | "script" => Some(CodeKind::Script),
            "m" | "module" => Some(CodeKind::Module),
            _ => None,
        }
    }

    /// Kind implied by a script file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" => Some(CodeKind::Script),
            "mjs" => Some(CodeKind::Module),
            _ => None,
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeKind::Script => write!(f, "script"),
            CodeKind::Module => write!(f, "module"),
        }
    }
}

/// Where a code record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeForm {
    /// Fenced code block inside a note
    Codeblock,
    /// Standalone file in the scripts folder
    File,
}

impl fmt::Display for CodeForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeForm::Codeblock => write!(f, "codeblock"),
            CodeForm::File => write!(f, "file"),
        }
    }
}

/// A named script or module discovered in the vault
///
/// `name` is the logical module identifier and carries the folder context
/// for relative imports: file records default to their vault path with the
/// scripts-folder prefix rewritten to `./`. For codeblock records `text`
/// holds the body inline; file records carry an empty `text` and are read
/// through the vault on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    /// Unique logical name
    pub name: String,
    /// Human-readable description from the directive
    #[serde(default)]
    pub desc: String,
    /// Inline source body (empty for file-backed records)
    #[serde(default)]
    pub text: String,
    /// Script or module
    #[serde(rename = "type")]
    pub kind: CodeKind,
    /// Codeblock or file provenance
    pub form: CodeForm,
    /// Path of the originating note or script file
    pub file: String,
    /// Directive-supplied sort key
    #[serde(default)]
    pub order: String,
    /// Line of the opening fence for codeblock records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Code {
    /// Folder context when this code is imported as a module
    ///
    /// The directory part of the logical name. Plain names resolve against
    /// the empty folder; path-shaped names such as `./utils/helpers.js`
    /// resolve against their directory.
    pub fn folder(&self) -> String {
        resolver::dirname(&self.name)
    }

    /// Folder context when this code is run directly as a script
    ///
    /// Codeblocks run against the empty folder. File scripts run against
    /// the file's directory, with the scripts-folder prefix rewritten to
    /// `./`, regardless of any directive-supplied name.
    pub fn run_folder(&self, scripts_folder: &str) -> String {
        match self.form {
            CodeForm::Codeblock => String::new(),
            CodeForm::File => {
                let prefix = format!("{}/", scripts_folder);
                let logical = match self.file.strip_prefix(&prefix) {
                    Some(rest) => format!("./{}", rest),
                    None => self.file.clone(),
                };
                resolver::dirname(&logical)
            }
        }
    }
}
