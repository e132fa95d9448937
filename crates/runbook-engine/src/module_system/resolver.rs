// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Logical path resolution for module specifiers
//!
//! Module names here are logical, `/`-separated paths into the vault, not
//! filesystem paths. Resolution is pure text manipulation: no component
//! ever touches the disk.

use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.+/").expect("valid regex"));

/// Check whether a specifier is folder-relative (starts with `./`, `../`, ...)
pub fn is_relative(specifier: &str) -> bool {
    RELATIVE_PREFIX.is_match(specifier)
}

/// Resolve a relative specifier against a logical folder
///
/// Non-relative specifiers (bare package names, URLs, absolute-style
/// logical names) and resolutions against the empty folder pass through
/// unchanged. When the folder itself is relative (starts with `.`), the
/// result keeps a relative-style `./` prefix.
pub fn resolve(folder: &str, specifier: &str) -> String {
    if folder.is_empty() || !is_relative(specifier) {
        return specifier.to_string();
    }

    let path = join_path(folder, specifier);
    if folder.starts_with('.') && !path.starts_with('.') {
        format!("./{}", path)
    } else {
        path
    }
}

/// Join a folder and a path, normalizing `.` and `..` segments
///
/// A path starting with `/` overrides the folder entirely. `..` pops the
/// previous segment unless that segment is itself `..` (an already-relative
/// prefix must not be collapsed), in which case another `..` is appended.
pub fn join_path(folder: &str, path: &str) -> String {
    let base = if path.starts_with('/') { "/" } else { folder };
    let combined = format!("{}/{}", base, path);
    let absolute = combined.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in combined.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(prev) if *prev != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Logical parent of a `/`-separated path, or `""` when there is none
pub fn dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relative() {
        assert!(is_relative("./x"));
        assert!(is_relative("../x"));
        assert!(is_relative("../../deep/x"));
        assert!(!is_relative("pkg"));
        assert!(!is_relative("/abs/x"));
        assert!(!is_relative("https://example.com/mod.js"));
        assert!(!is_relative(".hidden"));
    }

    #[test]
    fn test_resolve_passthrough() {
        assert_eq!(resolve("", "./x"), "./x");
        assert_eq!(resolve("a", "pkg"), "pkg");
        assert_eq!(resolve("a/b", "https://example.com/m.js"), "https://example.com/m.js");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve("a/b", "./c"), "a/b/c");
        assert_eq!(resolve("a/b", "../c"), "a/c");
        assert_eq!(resolve("scripts/a", "./lib"), "scripts/a/lib");
        assert_eq!(resolve("scripts/utils", "./helpers.js"), "scripts/utils/helpers.js");
    }

    #[test]
    fn test_resolve_keeps_relative_prefix() {
        assert_eq!(resolve(".", "./x"), "./x");
        assert_eq!(resolve("./a", "./b"), "./a/b");
        assert_eq!(resolve("./a", "../b"), "./b");
    }

    #[test]
    fn test_resolve_climbs_above_relative_folder() {
        assert_eq!(resolve("./a", "../../b"), "../b");
        assert_eq!(resolve(".", "../x"), "../x");
    }

    #[test]
    fn test_join_path_normalizes() {
        assert_eq!(join_path("a/b", "./c"), "a/b/c");
        assert_eq!(join_path("a//b", "c"), "a/b/c");
        assert_eq!(join_path("a/b", "../../c"), "c");
        assert_eq!(join_path("a", "../../c"), "../c");
    }

    #[test]
    fn test_join_path_absolute_override() {
        assert_eq!(join_path("a/b", "/c/d"), "/c/d");
        assert_eq!(join_path("a/b", "/c/../d"), "/d");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("a/b/c"), "a/b");
        assert_eq!(dirname("./x.js"), ".");
        assert_eq!(dirname("solo"), "");
        assert_eq!(dirname("scripts/utils/helpers.js"), "scripts/utils");
    }
}
