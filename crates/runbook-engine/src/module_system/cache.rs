// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Evaluated-module cache
//!
//! Caches module namespaces keyed by registered name, together with the
//! exact source text that produced them. A cached namespace is served only
//! while the registered source is byte-identical to the text it was
//! evaluated from; any edit makes the entry stale and forces
//! re-evaluation. Only completed evaluations are stored, so readers never
//! observe a half-built namespace.

use crate::value::ModuleNamespace;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CacheEntry {
    source_text: String,
    namespace: Arc<ModuleNamespace>,
}

/// Concurrent cache of evaluated module namespaces
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: DashMap<String, CacheEntry>,
}

impl ModuleCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Cached namespace for `name` if it was built from exactly `source`
    pub fn fresh(&self, name: &str, source: &str) -> Option<Arc<ModuleNamespace>> {
        self.entries.get(name).and_then(|entry| {
            if entry.source_text == source {
                Some(Arc::clone(&entry.namespace))
            } else {
                None
            }
        })
    }

    /// Cached namespace for `name` regardless of source freshness
    pub fn get(&self, name: &str) -> Option<Arc<ModuleNamespace>> {
        self.entries
            .get(name)
            .map(|entry| Arc::clone(&entry.namespace))
    }

    /// Store the namespace evaluated from `source` under `name`
    pub fn insert(&self, name: impl Into<String>, source: impl Into<String>, namespace: Arc<ModuleNamespace>) {
        self.entries.insert(
            name.into(),
            CacheEntry {
                source_text: source.into(),
                namespace,
            },
        );
    }

    /// Drop the entry for `name`, returning whether one existed
    pub fn invalidate(&self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached modules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no modules
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
