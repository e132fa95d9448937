// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Vault configuration
//!
//! Read from a `.runbook.json` file at the vault root. Every field has a
//! default, so a missing file yields a usable configuration while a
//! malformed one is reported rather than silently replaced.

use crate::error::{Result, RunbookError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file at the vault root
pub const CONFIG_FILE: &str = ".runbook.json";

/// A code to run automatically after startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autostart {
    /// Registered code name
    pub name: String,
    /// Disabled entries stay listed but do not run
    #[serde(default = "default_true")]
    pub enable: bool,
}

/// Vault-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault folder scanned for script and module files
    pub scripts_folder: String,
    /// Specifier resolving to the host namespace
    pub host_module: String,
    /// Vault path the registry snapshot is written to, when set
    pub snapshot_file: Option<String>,
    /// Codes run after startup, in order
    pub autostarts: Vec<Autostart>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scripts_folder: crate::scan::DEFAULT_SCRIPTS_FOLDER.to_string(),
            host_module: crate::module_system::DEFAULT_HOST_MODULE.to_string(),
            snapshot_file: None,
            autostarts: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, defaulting when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&content).map_err(|err| {
            RunbookError::config(format!("{}: {}", path.display(), err))
        })
    }

    /// Write this configuration to `path` as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
