// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loading and dispatch
//!
//! [`ModuleLoader`] is the target of every rewritten import. A specifier
//! is dispatched in a fixed order: the host module name, then remote
//! `http(s)` URLs, then modules registered in the [`CodeRegistry`], and
//! finally the engine's native import as the fallback.
//!
//! Registered modules are evaluated through the [`ModuleCache`]: a cached
//! namespace is reused while the registered source is unchanged, and a
//! stale entry is invalidated before re-evaluation so a failed build never
//! leaves the old namespace behind. A load that re-enters a module already
//! being loaded, from the same task or another, fails with
//! [`RunbookError::CircularDependency`] instead of deadlocking.

use crate::code::Code;
use crate::engine::ScriptEngine;
use crate::error::{Result, RunbookError};
use crate::module_system::cache::ModuleCache;
use crate::module_system::rewrite::ImportRewriter;
use crate::registry::CodeRegistry;
use crate::value::ModuleNamespace;
use crate::vault::Vault;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

/// Default specifier resolving to the host namespace
pub const DEFAULT_HOST_MODULE: &str = "runbook";

/// Where a specifier's module comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleSource {
    /// The host module name
    Host,
    /// A remote `http(s)` URL
    Remote,
    /// A module registered from the vault
    Registered,
    /// Anything else, deferred to the engine's native import
    Native,
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModuleSource::Host => "host",
            ModuleSource::Remote => "remote",
            ModuleSource::Registered => "registered",
            ModuleSource::Native => "native",
        };
        f.write_str(label)
    }
}

/// Loads modules for rewritten imports
pub struct ModuleLoader {
    registry: Arc<CodeRegistry>,
    vault: Arc<Vault>,
    engine: Arc<dyn ScriptEngine>,
    rewriter: ImportRewriter,
    cache: ModuleCache,
    host_module: String,
    loading: DashMap<String, ()>,
}

impl ModuleLoader {
    /// Create a loader with the default rewriter and host module name
    pub fn new(
        registry: Arc<CodeRegistry>,
        vault: Arc<Vault>,
        engine: Arc<dyn ScriptEngine>,
    ) -> Self {
        Self {
            registry,
            vault,
            engine,
            rewriter: ImportRewriter::new(),
            cache: ModuleCache::new(),
            host_module: DEFAULT_HOST_MODULE.to_string(),
            loading: DashMap::new(),
        }
    }

    /// Use `name` as the specifier resolving to the host namespace
    pub fn with_host_module(mut self, name: impl Into<String>) -> Self {
        self.host_module = name.into();
        self
    }

    /// Replace the import rewriter
    pub fn with_rewriter(mut self, rewriter: ImportRewriter) -> Self {
        self.rewriter = rewriter;
        self
    }

    /// The specifier resolving to the host namespace
    pub fn host_module(&self) -> &str {
        &self.host_module
    }

    /// The rewriter applied to registered module sources
    pub fn rewriter(&self) -> &ImportRewriter {
        &self.rewriter
    }

    /// The evaluated-module cache
    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Which source a specifier would be served from
    pub fn classify(&self, name: &str) -> ModuleSource {
        if name == self.host_module {
            ModuleSource::Host
        } else if is_remote(name) {
            ModuleSource::Remote
        } else if self.registry.module(name).is_some() {
            ModuleSource::Registered
        } else {
            ModuleSource::Native
        }
    }

    /// Load the module a specifier resolves to
    pub async fn load(&self, name: &str) -> Result<Arc<ModuleNamespace>> {
        if name == self.host_module {
            return Ok(self.engine.host_namespace());
        }
        if is_remote(name) {
            debug!(module = name, "importing remote module");
            return self.engine.import_remote(name).await;
        }
        match self.registry.module(name) {
            Some(code) => self.load_registered(name, &code).await,
            None => {
                trace!(module = name, "not registered, deferring to native import");
                self.engine.import_native(name).await
            }
        }
    }

    /// Resolved specifiers a registered code imports
    pub async fn dependencies(&self, name: &str) -> Result<Vec<String>> {
        let code = self
            .registry
            .get(name)
            .ok_or_else(|| RunbookError::code_not_found(name))?;
        let source = self.vault.code_text(&code).await?;
        Ok(self.rewriter.imports(&source, &code.folder()))
    }

    async fn load_registered(&self, name: &str, code: &Code) -> Result<Arc<ModuleNamespace>> {
        let source = self
            .vault
            .code_text(code)
            .await
            .map_err(|err| RunbookError::module_load(name, err.to_string()))?;
        if source.is_empty() {
            return Err(RunbookError::module_load(name, "module text is empty"));
        }

        if let Some(namespace) = self.cache.fresh(name, &source) {
            trace!(module = name, "module cache hit");
            return Ok(namespace);
        }

        let _guard = self.begin_load(name)?;
        self.cache.invalidate(name);

        let folder = code.folder();
        let rewritten = self.rewriter.rewrite(&source, &folder);
        debug!(module = name, folder = folder.as_str(), "evaluating module");
        let namespace = Arc::new(self.engine.eval_module(name, &rewritten).await?);
        self.cache.insert(name, source, Arc::clone(&namespace));
        Ok(namespace)
    }

    fn begin_load(&self, name: &str) -> Result<LoadingGuard<'_>> {
        use dashmap::mapref::entry::Entry;
        match self.loading.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RunbookError::CircularDependency(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(LoadingGuard {
                    loading: &self.loading,
                    name: name.to_string(),
                })
            }
        }
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("host_module", &self.host_module)
            .field("cached", &self.cache.len())
            .finish()
    }
}

fn is_remote(name: &str) -> bool {
    Url::parse(name)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Removes the in-flight marker when a load finishes, on success or error
struct LoadingGuard<'a> {
    loading: &'a DashMap<String, ()>,
    name: String,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.loading.remove(&self.name);
    }
}
