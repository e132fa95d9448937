// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module system
//!
//! Everything between a specifier in source text and an evaluated module
//! namespace: logical path resolution, import rewriting, the evaluated
//! module cache, and the loader that dispatches specifiers to the host,
//! remote URLs, registered vault modules or the engine's native import.

pub mod cache;
pub mod loader;
pub mod resolver;
pub mod rewrite;

pub use cache::ModuleCache;
pub use loader::{ModuleLoader, ModuleSource, DEFAULT_HOST_MODULE};
pub use rewrite::{ImportRewriter, DEFAULT_LOADER_EXPR};
