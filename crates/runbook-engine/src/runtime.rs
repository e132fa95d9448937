// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime facade
//!
//! Owns the moving parts of a vault session: the vault, its
//! configuration, the code registry, the module loader and the script
//! engine. Refreshing scans the vault and atomically replaces the
//! registry contents; running a code rewrites its imports and hands the
//! result to the engine.

use crate::code::Code;
use crate::config::Config;
use crate::engine::ScriptEngine;
use crate::error::{Result, RunbookError};
use crate::module_system::ModuleLoader;
use crate::registry::CodeRegistry;
use crate::scan;
use crate::value::{ModuleNamespace, Value};
use crate::vault::Vault;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A vault session: registry, loader and engine behind one handle
pub struct Runtime {
    vault: Arc<Vault>,
    config: Config,
    registry: Arc<CodeRegistry>,
    loader: Arc<ModuleLoader>,
    engine: Arc<dyn ScriptEngine>,
}

impl Runtime {
    /// Build a runtime for a vault with the given engine
    pub fn new(vault: Vault, config: Config, engine: Arc<dyn ScriptEngine>) -> Self {
        let vault = Arc::new(vault);
        let registry = Arc::new(CodeRegistry::new());
        let loader = Arc::new(
            ModuleLoader::new(
                Arc::clone(&registry),
                Arc::clone(&vault),
                Arc::clone(&engine),
            )
            .with_host_module(&config.host_module),
        );

        Self {
            vault,
            config,
            registry,
            loader,
            engine,
        }
    }

    /// The vault this runtime reads from
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The code registry
    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    /// The module loader serving rewritten imports
    pub fn loader(&self) -> &Arc<ModuleLoader> {
        &self.loader
    }

    /// Rescan the vault and replace the registry contents
    ///
    /// Returns the number of codes registered. When a snapshot file is
    /// configured the new registry contents are written to it.
    pub async fn refresh(&self) -> Result<usize> {
        let codes = scan::scan_vault(&self.vault, &self.config.scripts_folder).await?;
        let count = codes.len();
        self.registry.replace_all(codes);
        info!(count, "registry refreshed");

        if let Some(file) = &self.config.snapshot_file {
            let snapshot = serde_json::to_string(&self.registry.snapshot())?;
            self.vault.write(file, &snapshot).await?;
            debug!(file = file.as_str(), "registry snapshot written");
        }

        Ok(count)
    }

    /// Restore the registry from the configured snapshot file
    ///
    /// Useful before the first scan. Returns whether a snapshot was
    /// loaded.
    pub async fn load_snapshot(&self) -> Result<bool> {
        let Some(file) = &self.config.snapshot_file else {
            return Ok(false);
        };
        if !self.vault.exists(file).await {
            return Ok(false);
        }

        let content = self.vault.read(file).await?;
        let codes: Vec<Code> = serde_json::from_str(&content)?;
        let count = codes.len();
        self.registry.replace_all(codes);
        debug!(count, file = file.as_str(), "registry snapshot loaded");
        Ok(true)
    }

    /// Import a module by specifier through the loader
    pub async fn import(&self, name: &str) -> Result<Arc<ModuleNamespace>> {
        self.loader.load(name).await
    }

    /// Run a code with arguments, rewriting its imports first
    pub async fn run_code(&self, code: &Code, args: Vec<Value>) -> Result<Value> {
        let text = self
            .vault
            .code_text(code)
            .await
            .map_err(|err| RunbookError::script_failed(&code.name, err.to_string()))?;

        let folder = code.run_folder(&self.config.scripts_folder);
        let rewritten = self.loader.rewriter().rewrite(&text, &folder);
        debug!(code = code.name.as_str(), folder = folder.as_str(), "running code");
        self.engine.run_script(&code.name, &rewritten, args).await
    }

    /// Run the first registered code with this name
    pub async fn run_by_name(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let code = self
            .registry
            .get(name)
            .ok_or_else(|| RunbookError::code_not_found(name))?;
        self.run_code(&code, args).await
    }

    /// Run the enabled autostart codes in order
    ///
    /// A failing or missing code is reported and does not stop the rest.
    /// Returns the number of codes that ran successfully.
    pub async fn run_autostarts(&self) -> usize {
        let mut started = 0;
        for autostart in &self.config.autostarts {
            if !autostart.enable {
                continue;
            }
            info!(code = autostart.name.as_str(), "autostart");
            match self.run_by_name(&autostart.name, Vec::new()).await {
                Ok(_) => started += 1,
                Err(err) => {
                    error!(code = autostart.name.as_str(), error = %err, "autostart failed");
                }
            }
        }
        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Autostart;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;

    /// Records every script run and succeeds; imports resolve to empty
    /// namespaces.
    struct EchoEngine {
        runs: Mutex<Vec<(String, String, usize)>>,
        host: Arc<ModuleNamespace>,
    }

    impl EchoEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                runs: Mutex::new(Vec::new()),
                host: Arc::new(ModuleNamespace::new()),
            })
        }

        fn runs(&self) -> Vec<(String, String, usize)> {
            self.runs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScriptEngine for EchoEngine {
        async fn eval_module(&self, _name: &str, _source: &str) -> Result<ModuleNamespace> {
            Ok(ModuleNamespace::new())
        }

        async fn run_script(&self, name: &str, source: &str, args: Vec<Value>) -> Result<Value> {
            if name == "boom" {
                return Err(RunbookError::script_failed(name, "exploded"));
            }
            self.runs
                .lock()
                .unwrap()
                .push((name.to_string(), source.to_string(), args.len()));
            Ok(Value::from("ran"))
        }

        async fn import_remote(&self, _url: &str) -> Result<Arc<ModuleNamespace>> {
            Ok(Arc::new(ModuleNamespace::new()))
        }

        async fn import_native(&self, name: &str) -> Result<Arc<ModuleNamespace>> {
            Err(RunbookError::module_not_found(name))
        }

        fn host_namespace(&self) -> Arc<ModuleNamespace> {
            Arc::clone(&self.host)
        }
    }

    fn demo_vault() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("scripts/utils")).unwrap();
        fs::write(
            dir.path().join("note.md"),
            "```js runbook=\"greet\"\nconsole.log(\"hi\");\n```\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("scripts/utils/main.js"),
            "const lib = await import('./lib.mjs');\nlib.go();\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("scripts/utils/lib.mjs"),
            "export function go() {}\n",
        )
        .unwrap();
        dir
    }

    fn runtime_for(dir: &tempfile::TempDir, config: Config, engine: Arc<EchoEngine>) -> Runtime {
        Runtime::new(Vault::new(dir.path()), config, engine)
    }

    #[tokio::test]
    async fn test_refresh_registers_vault_codes() {
        let dir = demo_vault();
        let engine = EchoEngine::new();
        let runtime = runtime_for(&dir, Config::default(), engine);

        let count = runtime.refresh().await.unwrap();
        assert_eq!(count, 3);

        assert!(runtime.registry().get("greet").is_some());
        assert!(runtime.registry().get("./utils/main.js").is_some());
        assert!(runtime.registry().module("./utils/lib.mjs").is_some());
    }

    #[tokio::test]
    async fn test_run_rewrites_relative_imports_against_the_file() {
        let dir = demo_vault();
        let engine = EchoEngine::new();
        let runtime = runtime_for(&dir, Config::default(), Arc::clone(&engine));
        runtime.refresh().await.unwrap();

        runtime
            .run_by_name("./utils/main.js", vec![Value::from(1.0)])
            .await
            .unwrap();

        let runs = engine.runs();
        assert_eq!(runs.len(), 1);
        let (name, source, arg_count) = &runs[0];
        assert_eq!(name, "./utils/main.js");
        assert!(source.contains("await __runbook.import('./utils/lib.mjs')"));
        assert_eq!(*arg_count, 1);

        // the rewritten specifier is exactly the registered module name
        runtime.import("./utils/lib.mjs").await.unwrap();
    }

    #[tokio::test]
    async fn test_codeblock_runs_with_empty_folder() {
        let dir = demo_vault();
        let engine = EchoEngine::new();
        let runtime = runtime_for(&dir, Config::default(), Arc::clone(&engine));
        runtime.refresh().await.unwrap();

        runtime.run_by_name("greet", Vec::new()).await.unwrap();
        let runs = engine.runs();
        assert_eq!(runs[0].1, "console.log(\"hi\");");
    }

    #[tokio::test]
    async fn test_run_by_name_missing_code() {
        let dir = demo_vault();
        let engine = EchoEngine::new();
        let runtime = runtime_for(&dir, Config::default(), engine);
        runtime.refresh().await.unwrap();

        let err = runtime.run_by_name("missing", Vec::new()).await.unwrap_err();
        assert!(matches!(err, RunbookError::CodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_autostarts_continue_past_failures() {
        let dir = demo_vault();
        fs::write(
            dir.path().join("boom.md"),
            "```js runbook=\"boom\"\nthrow new Error();\n```\n",
        )
        .unwrap();

        let engine = EchoEngine::new();
        let config = Config {
            autostarts: vec![
                Autostart {
                    name: "boom".to_string(),
                    enable: true,
                },
                Autostart {
                    name: "absent".to_string(),
                    enable: true,
                },
                Autostart {
                    name: "greet".to_string(),
                    enable: true,
                },
                Autostart {
                    name: "greet".to_string(),
                    enable: false,
                },
            ],
            ..Config::default()
        };
        let runtime = runtime_for(&dir, config, Arc::clone(&engine));
        runtime.refresh().await.unwrap();

        assert_eq!(runtime.run_autostarts().await, 1);
        assert_eq!(engine.runs().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = demo_vault();
        let engine = EchoEngine::new();
        let config = Config {
            snapshot_file: Some("codes.json".to_string()),
            ..Config::default()
        };
        let runtime = runtime_for(&dir, config.clone(), Arc::clone(&engine));
        runtime.refresh().await.unwrap();
        assert!(dir.path().join("codes.json").exists());

        let restored = runtime_for(&dir, config, engine);
        assert!(restored.load_snapshot().await.unwrap());
        assert_eq!(restored.registry().len(), 3);
        assert!(restored.registry().module("./utils/lib.mjs").is_some());
    }

    #[tokio::test]
    async fn test_load_snapshot_without_configuration_is_a_noop() {
        let dir = demo_vault();
        let engine = EchoEngine::new();
        let runtime = runtime_for(&dir, Config::default(), engine);
        assert!(!runtime.load_snapshot().await.unwrap());
        assert!(runtime.registry().is_empty());
    }
}
