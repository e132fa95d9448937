// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the runbook engine

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, RunbookError>;

/// Errors that can occur in the runbook engine
#[derive(Debug, Error)]
pub enum RunbookError {
    /// No registered code matches the requested name
    #[error("Cannot find code '{0}'")]
    CodeNotFound(String),

    /// No loader dispatch branch accepts the module name
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Module fetch, rewrite, or evaluation failure
    #[error("Error loading module '{module}': {reason}")]
    ModuleLoad {
        /// Module name
        module: String,
        /// Reason for failure
        reason: String,
    },

    /// Script execution failure
    #[error("Error running '{name}': {reason}")]
    ScriptFailed {
        /// Script or code name
        name: String,
        /// Reason for failure
        reason: String,
    },

    /// A module was requested again while it was still being evaluated
    #[error("Circular dependency detected while loading '{0}'")]
    CircularDependency(String),

    /// Failure reported by the script engine backend
    #[error("Engine error: {0}")]
    Engine(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl RunbookError {
    /// Create a code not found error
    pub fn code_not_found(name: impl Into<String>) -> Self {
        Self::CodeNotFound(name.into())
    }

    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound(module.into())
    }

    /// Create a module load error
    pub fn module_load(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModuleLoad {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Create a script failure error
    pub fn script_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ScriptFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
