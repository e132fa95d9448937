// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Script engine seam
//!
//! The engine executes rewritten source text; everything else in this crate
//! is engine-agnostic. An implementation must expose the module loader to
//! evaluated code under the loader expression spliced in by the rewriter
//! (`__runbook.import` by default), so that `import` syntax in user code
//! re-enters [`ModuleLoader::load`](crate::module_system::ModuleLoader::load)
//! at runtime. The host namespace returned by [`ScriptEngine::host_namespace`]
//! is what scripts see as `this` and what the host-sentinel module name
//! resolves to.

use crate::error::{Result, RunbookError};
use crate::value::{ModuleNamespace, Value};
use async_trait::async_trait;
use std::sync::Arc;

/// Pluggable script evaluation backend
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    /// Evaluate rewritten source as a module body and return its exports
    async fn eval_module(&self, name: &str, source: &str) -> Result<ModuleNamespace>;

    /// Run rewritten source as an async function body with the given arguments
    async fn run_script(&self, name: &str, source: &str, args: Vec<Value>) -> Result<Value>;

    /// Import a remote module by URL
    async fn import_remote(&self, url: &str) -> Result<Arc<ModuleNamespace>>;

    /// Import a module through the backend's native resolver
    async fn import_native(&self, name: &str) -> Result<Arc<ModuleNamespace>>;

    /// The host integration namespace bound as `this` in executed scripts
    fn host_namespace(&self) -> Arc<ModuleNamespace>;
}

/// Backend for tooling paths that never execute code
///
/// Discovery, rewriting, and dependency inspection work without a script
/// backend; any attempt to actually evaluate code through this engine fails.
pub struct NullEngine {
    host: Arc<ModuleNamespace>,
}

impl NullEngine {
    /// Create a new null engine
    pub fn new() -> Self {
        Self {
            host: Arc::new(ModuleNamespace::new()),
        }
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptEngine for NullEngine {
    async fn eval_module(&self, name: &str, _source: &str) -> Result<ModuleNamespace> {
        Err(RunbookError::module_load(name, "no script backend configured"))
    }

    async fn run_script(&self, name: &str, _source: &str, _args: Vec<Value>) -> Result<Value> {
        Err(RunbookError::script_failed(name, "no script backend configured"))
    }

    async fn import_remote(&self, url: &str) -> Result<Arc<ModuleNamespace>> {
        Err(RunbookError::module_load(url, "no script backend configured"))
    }

    async fn import_native(&self, name: &str) -> Result<Arc<ModuleNamespace>> {
        Err(RunbookError::module_not_found(name))
    }

    fn host_namespace(&self) -> Arc<ModuleNamespace> {
        Arc::clone(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_engine_rejects_execution() {
        let engine = NullEngine::new();

        let err = engine.eval_module("m", "export {}").await.unwrap_err();
        assert!(matches!(err, RunbookError::ModuleLoad { .. }));

        let err = engine.run_script("s", "1 + 1", vec![]).await.unwrap_err();
        assert!(matches!(err, RunbookError::ScriptFailed { .. }));

        let err = engine.import_native("fs").await.unwrap_err();
        assert!(matches!(err, RunbookError::ModuleNotFound(_)));
    }

    #[tokio::test]
    async fn test_null_engine_host_namespace_is_shared() {
        let engine = NullEngine::new();
        let a = engine.host_namespace();
        let b = engine.host_namespace();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
