// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Registry of discovered codes
//!
//! Holds every [`Code`] found during a vault scan. The flat list keeps
//! entries in discovery order, duplicates included. Modules additionally
//! live in a by-name map where a later registration replaces an earlier
//! one, while name lookup over the flat list returns the first match, so
//! scripts and modules deliberately disagree on which duplicate wins.

use crate::code::{Code, CodeKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    codes: Vec<Arc<Code>>,
    modules: HashMap<String, Arc<Code>>,
}

/// Shared, thread-safe collection of registered codes
#[derive(Debug, Default)]
pub struct CodeRegistry {
    inner: RwLock<Inner>,
}

impl CodeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code, appending to the list and updating the module map
    pub fn append(&self, code: Code) {
        let code = Arc::new(code);
        let mut inner = self.inner.write();
        if code.kind == CodeKind::Module {
            inner.modules.insert(code.name.clone(), Arc::clone(&code));
        }
        inner.codes.push(code);
    }

    /// Drop everything and register `codes` in order
    pub fn replace_all(&self, codes: impl IntoIterator<Item = Code>) {
        let mut fresh = Inner::default();
        for code in codes {
            let code = Arc::new(code);
            if code.kind == CodeKind::Module {
                fresh.modules.insert(code.name.clone(), Arc::clone(&code));
            }
            fresh.codes.push(code);
        }
        *self.inner.write() = fresh;
    }

    /// First registered code with this name, regardless of kind
    pub fn get(&self, name: &str) -> Option<Arc<Code>> {
        self.inner
            .read()
            .codes
            .iter()
            .find(|code| code.name == name)
            .cloned()
    }

    /// The module registered under this name, latest registration winning
    pub fn module(&self, name: &str) -> Option<Arc<Code>> {
        self.inner.read().modules.get(name).cloned()
    }

    /// Snapshot of every registered code in discovery order
    pub fn codes(&self) -> Vec<Arc<Code>> {
        self.inner.read().codes.clone()
    }

    /// Snapshot of registered scripts in discovery order
    pub fn scripts(&self) -> Vec<Arc<Code>> {
        self.inner
            .read()
            .codes
            .iter()
            .filter(|code| code.kind == CodeKind::Script)
            .cloned()
            .collect()
    }

    /// Snapshot of the module map, sorted by name
    pub fn modules(&self) -> Vec<Arc<Code>> {
        let mut modules: Vec<Arc<Code>> = self.inner.read().modules.values().cloned().collect();
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        modules
    }

    /// Owned copies of every registered code, for serialization
    pub fn snapshot(&self) -> Vec<Code> {
        self.inner
            .read()
            .codes
            .iter()
            .map(|code| Code::clone(code))
            .collect()
    }

    /// Number of registered codes, duplicates included
    pub fn len(&self) -> usize {
        self.inner.read().codes.len()
    }

    /// Whether no codes are registered
    pub fn is_empty(&self) -> bool {
        self.inner.read().codes.is_empty()
    }
}
