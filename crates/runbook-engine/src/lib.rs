// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Import-rewriting script and module engine for note vaults
//!
//! A vault is a directory of markdown notes and script files. Notes
//! register scripts and modules through directive-carrying fenced code
//! blocks; files under the scripts folder register by extension. The
//! engine scans the vault into a [`CodeRegistry`], rewrites ES import
//! syntax into loader calls, caches evaluated modules by source text and
//! runs scripts through a pluggable [`ScriptEngine`].
//!
//! [`Runtime`] bundles the pieces for a single vault session:
//!
//! ```no_run
//! use runbook_engine::{Config, NullEngine, Runtime, Vault};
//! use std::sync::Arc;
//!
//! # async fn demo() -> runbook_engine::Result<()> {
//! let vault = Vault::new("/path/to/vault");
//! let runtime = Runtime::new(vault, Config::default(), Arc::new(NullEngine::new()));
//! runtime.refresh().await?;
//! runtime.import("./utils/helpers.mjs").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod code;
pub mod config;
pub mod engine;
pub mod error;
pub mod module_system;
pub mod registry;
pub mod runtime;
pub mod scan;
pub mod value;
pub mod vault;

pub use code::{Code, CodeForm, CodeKind};
pub use config::{Autostart, Config};
pub use engine::{NullEngine, ScriptEngine};
pub use error::{Result, RunbookError};
pub use module_system::{ImportRewriter, ModuleCache, ModuleLoader, ModuleSource};
pub use registry::CodeRegistry;
pub use runtime::Runtime;
pub use value::{ModuleNamespace, Value};
pub use vault::Vault;

/// Version of the engine crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
