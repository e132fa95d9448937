// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Vault filesystem access
//!
//! A vault is a directory tree of notes and script files. Paths exposed
//! here are vault-relative with `/` separators, matching the logical paths
//! used for module registration and resolution. Dot-directories are
//! treated as vault internals and skipped during walks.

use crate::code::{Code, CodeForm};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// A directory tree holding notes and script files
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Open a vault rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem root of the vault
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a file by vault-relative path
    pub async fn read(&self, vault_path: &str) -> Result<String> {
        Ok(tokio::fs::read_to_string(self.root.join(vault_path)).await?)
    }

    /// Whether a vault-relative path exists
    pub async fn exists(&self, vault_path: &str) -> bool {
        tokio::fs::try_exists(self.root.join(vault_path))
            .await
            .unwrap_or(false)
    }

    /// Write a file by vault-relative path, replacing any existing content
    pub async fn write(&self, vault_path: &str, content: &str) -> Result<()> {
        Ok(tokio::fs::write(self.root.join(vault_path), content).await?)
    }

    /// Source text of a code: inline for codeblocks, read from disk for files
    pub async fn code_text(&self, code: &Code) -> Result<String> {
        match code.form {
            CodeForm::Codeblock => Ok(code.text.clone()),
            CodeForm::File => self.read(&code.file).await,
        }
    }

    /// Vault-relative paths of all files matching one of `extensions`
    ///
    /// The walk is depth-first and the result is sorted, so discovery
    /// order is stable across runs.
    pub async fn files_with_extensions(&self, extensions: &[&str]) -> Result<Vec<String>> {
        let mut pending = vec![self.root.clone()];
        let mut files = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let name = entry.file_name();
                let name = name.to_string_lossy();

                if entry.file_type().await?.is_dir() {
                    if !name.starts_with('.') {
                        pending.push(path);
                    }
                    continue;
                }

                let matches = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| extensions.contains(&ext))
                    .unwrap_or(false);
                if matches {
                    files.push(self.relative(&path));
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Vault-relative paths of all markdown notes
    pub async fn markdown_files(&self) -> Result<Vec<String>> {
        self.files_with_extensions(&["md"]).await
    }

    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::CodeKind;
    use std::fs;

    fn demo_vault() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("notes/deep")).unwrap();
        fs::create_dir_all(dir.path().join("scripts")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("notes/a.md"), "# a").unwrap();
        fs::write(dir.path().join("notes/deep/b.md"), "# b").unwrap();
        fs::write(dir.path().join("scripts/tool.js"), "console.log(1)").unwrap();
        fs::write(dir.path().join("scripts/lib.mjs"), "export const x = 1;").unwrap();
        fs::write(dir.path().join(".hidden/c.md"), "# hidden").unwrap();
        fs::write(dir.path().join("readme.txt"), "plain").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_walk_filters_and_skips_dot_dirs() {
        let dir = demo_vault();
        let vault = Vault::new(dir.path());

        let notes = vault.markdown_files().await.unwrap();
        assert_eq!(notes, vec!["notes/a.md", "notes/deep/b.md"]);

        let scripts = vault.files_with_extensions(&["js", "mjs"]).await.unwrap();
        assert_eq!(scripts, vec!["scripts/lib.mjs", "scripts/tool.js"]);
    }

    #[tokio::test]
    async fn test_read_and_exists() {
        let dir = demo_vault();
        let vault = Vault::new(dir.path());

        assert_eq!(vault.read("notes/a.md").await.unwrap(), "# a");
        assert!(vault.exists("scripts/tool.js").await);
        assert!(!vault.exists("scripts/missing.js").await);
        assert!(vault.read("scripts/missing.js").await.is_err());
    }

    #[tokio::test]
    async fn test_code_text_by_form() {
        let dir = demo_vault();
        let vault = Vault::new(dir.path());

        let block = Code {
            name: "inline".to_string(),
            desc: String::new(),
            text: "return 1;".to_string(),
            kind: CodeKind::Script,
            form: CodeForm::Codeblock,
            file: "notes/a.md".to_string(),
            order: String::new(),
            line: Some(3),
        };
        assert_eq!(vault.code_text(&block).await.unwrap(), "return 1;");

        let file = Code {
            name: "scripts/lib.mjs".to_string(),
            desc: String::new(),
            text: String::new(),
            kind: CodeKind::Module,
            form: CodeForm::File,
            file: "scripts/lib.mjs".to_string(),
            order: String::new(),
            line: None,
        };
        assert_eq!(vault.code_text(&file).await.unwrap(), "export const x = 1;");
    }
}
