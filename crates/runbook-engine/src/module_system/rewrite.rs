// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source-to-source import rewriting
//!
//! Rewrites ES module syntax in script source into calls against the
//! loader expression, so that evaluated code resolves modules through the
//! registry instead of the host's own resolver. Three passes over the text:
//!
//! - dynamic `import("spec")` / `await import('spec')`
//! - static `import`/`export ... from "spec"` declarations
//! - side-effect `import "spec"`
//!
//! Recognized forms (single-line, as written in practice):
//!
//! ```text
//! import defaultExport from "module-name"
//! import * as name from "module-name"
//! import { export1 } from "module-name"
//! import { export1 as alias1 } from "module-name"
//! import { export1, export2 as alias2 } from "module-name"
//! import defaultExport, { export1 } from "module-name"
//! import defaultExport, * as name from "module-name"
//! import "module-name"
//! export * as name1 from "module-name"
//! export { name1, name2 as alias2 } from "module-name"
//! export { default as name1 } from "module-name"
//! ```
//!
//! `export * from "module-name"` (bare star) has no rewritable binding
//! shape and passes through unchanged. Binding clauses are split by a
//! quote- and brace-aware scanner, so commas and the `as` keyword inside
//! string literals or nested braces never break an item apart.

use crate::module_system::resolver;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// Default loader expression spliced into rewritten code
pub const DEFAULT_LOADER_EXPR: &str = "__runbook.import";

static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\b(await)\s)?\bimport\(\s*(?:'((?:\\.|[^'\\])*)'|"((?:\\.|[^"\\])*)")\s*\)"#)
        .expect("valid regex")
});

static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(import|export)\b([^()\r\n]*?)from\s+(?:'((?:\\.|[^'\\])*)'|"((?:\\.|[^"\\])*)")"#)
        .expect("valid regex")
});

static SIDE_EFFECT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*(?:'((?:\\.|[^'\\])*)'|"((?:\\.|[^"\\])*)")"#).expect("valid regex")
});

static NAMESPACE_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\s+as\s+(.*)$").expect("valid regex"));

static AS_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\bas\b\s*").expect("valid regex"));

static BRACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{(.*)\}$").expect("valid regex"));

/// Rewrites import/export syntax against an injected loader expression
///
/// The rewriter is pure text-in, text-out; resolution of relative
/// specifiers happens through [`resolver::resolve`] with the folder passed
/// per call.
#[derive(Debug, Clone)]
pub struct ImportRewriter {
    loader_expr: String,
}

impl ImportRewriter {
    /// Create a rewriter using [`DEFAULT_LOADER_EXPR`]
    pub fn new() -> Self {
        Self::with_loader_expr(DEFAULT_LOADER_EXPR)
    }

    /// Create a rewriter splicing a custom loader expression
    pub fn with_loader_expr(loader_expr: impl Into<String>) -> Self {
        Self {
            loader_expr: loader_expr.into(),
        }
    }

    /// The loader expression spliced into generated code
    pub fn loader_expr(&self) -> &str {
        &self.loader_expr
    }

    /// Rewrite every recognized import construct in `source`
    ///
    /// Relative specifiers are resolved against `folder`. Unrecognized
    /// constructs and all other text pass through verbatim.
    pub fn rewrite(&self, source: &str, folder: &str) -> String {
        self.rewrite_collect(source, folder).0
    }

    /// Resolved specifiers a rewrite of `source` would load
    ///
    /// Deduplicated, in pass order (dynamic imports first, then static
    /// declarations, then side-effect imports).
    pub fn imports(&self, source: &str, folder: &str) -> Vec<String> {
        let mut unique: Vec<String> = Vec::new();
        for spec in self.rewrite_collect(source, folder).1 {
            if !unique.contains(&spec) {
                unique.push(spec);
            }
        }
        unique
    }

    fn rewrite_collect(&self, source: &str, folder: &str) -> (String, Vec<String>) {
        let mut specs: Vec<String> = Vec::new();

        let dynamic = DYNAMIC_IMPORT.replace_all(source, |caps: &Captures| {
            let (quote, raw) = quoted_spec(caps, 2, 3);
            let resolved = resolver::resolve(folder, raw);
            let awaited = if caps.get(1).is_some() { "await " } else { "" };
            specs.push(resolved.clone());
            format!("{}{}({}{}{})", awaited, self.loader_expr, quote, resolved, quote)
        });

        let statics = STATIC_IMPORT.replace_all(&dynamic, |caps: &Captures| {
            let keyword = &caps[1];
            let clause = &caps[2];
            let (_, raw) = quoted_spec(caps, 3, 4);

            match parse_clause(clause) {
                Clause::PassThrough => {
                    debug!(statement = &caps[0], "leaving unrecognized declaration unrewritten");
                    caps[0].to_string()
                }
                Clause::Bindings {
                    namespace,
                    bindings,
                    braced,
                } => {
                    let resolved = resolver::resolve(folder, raw);
                    specs.push(resolved.clone());
                    let prefix = if keyword == "export" { "export " } else { "" };
                    let loader_call = format!("await {}(\"{}\")", self.loader_expr, resolved);

                    let mut commands: Vec<String> = Vec::new();
                    if let Some(ns) = &namespace {
                        commands.push(format!("{}const {} = {}", prefix, ns, loader_call));
                    }
                    if !bindings.is_empty() || (braced && namespace.is_none()) {
                        let list = bindings.join(", ");
                        let init = match &namespace {
                            Some(ns) => ns.clone(),
                            None => loader_call,
                        };
                        commands.push(format!("{}const {{{}}} = {}", prefix, list, init));
                    }
                    commands.join(";\n")
                }
            }
        });

        let effects = SIDE_EFFECT_IMPORT.replace_all(&statics, |caps: &Captures| {
            let (quote, raw) = quoted_spec(caps, 1, 2);
            let resolved = resolver::resolve(folder, raw);
            specs.push(resolved.clone());
            format!("await {}({}{}{})", self.loader_expr, quote, resolved, quote)
        });

        (effects.into_owned(), specs)
    }
}

impl Default for ImportRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the matched quote alternative: `(quote char, raw specifier text)`
fn quoted_spec<'t>(caps: &Captures<'t>, single: usize, double: usize) -> (char, &'t str) {
    match caps.get(single) {
        Some(m) => ('\'', m.as_str()),
        None => ('"', caps.get(double).map(|m| m.as_str()).unwrap_or("")),
    }
}

/// Parsed binding clause of a static declaration
enum Clause {
    /// Nothing rewritable (bare `*`, empty clause): leave the statement alone
    PassThrough,
    /// Namespace alias and/or destructurable bindings
    Bindings {
        namespace: Option<String>,
        bindings: Vec<String>,
        braced: bool,
    },
}

/// Parse a static import/export binding clause into namespace and bindings
///
/// `* as ns` becomes the namespace variable. `name as alias` becomes
/// `name: alias`. A bare item without `:` is a default-import alias and
/// becomes `default: item`. Braced groups contribute their items verbatim
/// (already destructuring syntax).
fn parse_clause(clause: &str) -> Clause {
    let mut namespace: Option<String> = None;
    let mut bindings: Vec<String> = Vec::new();
    let mut braced = false;

    for item in split_top_level(clause) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        if item == "*" {
            return Clause::PassThrough;
        }

        if let Some(caps) = NAMESPACE_ALIAS.captures(item) {
            namespace = Some(caps[1].to_string());
            continue;
        }

        let item = map_unquoted(item, |chunk| AS_KEYWORD.replace_all(chunk, ": ").into_owned());
        let item = item.trim();

        if let Some(caps) = BRACED.captures(item) {
            braced = true;
            for inner in split_top_level(&caps[1]) {
                let inner = inner.trim();
                if !inner.is_empty() {
                    bindings.push(inner.to_string());
                }
            }
        } else if item.contains(':') {
            bindings.push(item.to_string());
        } else {
            bindings.push(format!("default: {}", item));
        }
    }

    if namespace.is_none() && bindings.is_empty() && !braced {
        Clause::PassThrough
    } else {
        Clause::Bindings {
            namespace,
            bindings,
            braced,
        }
    }
}

/// Split on commas outside quotes and braces
fn split_top_level(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth: usize = 0;

    for ch in text.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                current.push(ch);
            }
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                items.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    items.push(current);
    items
}

/// Apply `f` to the stretches of `text` outside string literals
///
/// Quoted spans (including their escapes) are copied through untouched, so
/// keyword replacement cannot fire inside a string.
fn map_unquoted<F: Fn(&str) -> String>(text: &str, f: F) -> String {
    let mut out = String::new();
    let mut chunk = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in text.chars() {
        match quote {
            Some(q) => {
                out.push(ch);
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => {
                if ch == '\'' || ch == '"' {
                    out.push_str(&f(&chunk));
                    chunk.clear();
                    out.push(ch);
                    quote = Some(ch);
                } else {
                    chunk.push(ch);
                }
            }
        }
    }

    out.push_str(&f(&chunk));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> ImportRewriter {
        ImportRewriter::new()
    }

    #[test]
    fn test_no_imports_unchanged() {
        let source = "const x = 1;\nfunction f() { return x * 2; }\n// important note from 'the author'\n";
        assert_eq!(rewriter().rewrite(source, "scripts"), source);
    }

    #[test]
    fn test_dynamic_import() {
        let out = rewriter().rewrite(r#"const m = import("./lib");"#, "scripts/a");
        assert_eq!(out, r#"const m = __runbook.import("scripts/a/lib");"#);
    }

    #[test]
    fn test_dynamic_import_preserves_await_and_quotes() {
        let out = rewriter().rewrite(r#"const m = await import('./lib');"#, "scripts/a");
        assert_eq!(out, r#"const m = await __runbook.import('scripts/a/lib');"#);

        let out = rewriter().rewrite(r#"import("pkg")"#, "scripts/a");
        assert_eq!(out, r#"__runbook.import("pkg")"#);
    }

    #[test]
    fn test_dynamic_import_escaped_quote_in_specifier() {
        let out = rewriter().rewrite(r#"import('a\'b')"#, "");
        assert_eq!(out, r#"__runbook.import('a\'b')"#);
    }

    #[test]
    fn test_default_import() {
        let out = rewriter().rewrite(r#"import defaultExport from "module-name";"#, "");
        assert_eq!(
            out,
            r#"const {default: defaultExport} = await __runbook.import("module-name");"#
        );
    }

    #[test]
    fn test_named_import() {
        let out = rewriter().rewrite(r#"import { foo, bar as baz } from "./m";"#, "");
        assert_eq!(
            out,
            r#"const {foo, bar: baz} = await __runbook.import("./m");"#
        );
    }

    #[test]
    fn test_namespace_import() {
        let out = rewriter().rewrite(r#"import * as name from "./m";"#, "a/b");
        assert_eq!(out, r#"const name = await __runbook.import("a/b/m");"#);
    }

    #[test]
    fn test_default_plus_namespace() {
        let out = rewriter().rewrite(r#"import defaultExport, * as ns from "./m";"#, "");
        assert_eq!(
            out,
            "const ns = await __runbook.import(\"./m\");\nconst {default: defaultExport} = ns;"
        );
    }

    #[test]
    fn test_default_plus_named() {
        let out = rewriter().rewrite(r#"import defaultExport, { export1 } from "./m";"#, "");
        assert_eq!(
            out,
            r#"const {default: defaultExport, export1} = await __runbook.import("./m");"#
        );
    }

    #[test]
    fn test_export_from_prefixes_every_statement() {
        let out = rewriter().rewrite(r#"export { a, b as c } from "./m";"#, "");
        assert_eq!(
            out,
            r#"export const {a, b: c} = await __runbook.import("./m");"#
        );

        let out = rewriter().rewrite(r#"export * as ns from "./m";"#, "");
        assert_eq!(out, r#"export const ns = await __runbook.import("./m");"#);
    }

    #[test]
    fn test_export_default_reexport() {
        let out = rewriter().rewrite(r#"export { default as main } from "./m";"#, "");
        assert_eq!(
            out,
            r#"export const {default: main} = await __runbook.import("./m");"#
        );
    }

    #[test]
    fn test_export_bare_star_passes_through() {
        let source = r#"export * from "./m";"#;
        assert_eq!(rewriter().rewrite(source, "a"), source);
    }

    #[test]
    fn test_side_effect_import() {
        let out = rewriter().rewrite(r#"import "./init";"#, "a");
        assert_eq!(out, r#"await __runbook.import("a/init");"#);

        let out = rewriter().rewrite(r#"import 'polyfill';"#, "a");
        assert_eq!(out, r#"await __runbook.import('polyfill');"#);
    }

    #[test]
    fn test_quoted_comma_and_as_not_split() {
        let out = rewriter().rewrite(r#"import { a, "x,as y" as weird, b } from './m';"#, "");
        assert_eq!(
            out,
            r#"const {a, "x,as y": weird, b} = await __runbook.import("./m");"#
        );
    }

    #[test]
    fn test_nested_braces_not_split() {
        let out = rewriter().rewrite(r#"import { a = { x: 1, y: 2 }, b } from "./m";"#, "");
        assert_eq!(
            out,
            r#"const {a = { x: 1, y: 2 }, b} = await __runbook.import("./m");"#
        );
    }

    #[test]
    fn test_empty_braces_still_load() {
        let out = rewriter().rewrite(r#"export {} from "./m";"#, "");
        assert_eq!(out, r#"export const {} = await __runbook.import("./m");"#);
    }

    #[test]
    fn test_static_keeps_following_line_intact() {
        let out = rewriter().rewrite("import { x } from \"./m\"\nlet y = x;", "");
        assert_eq!(
            out,
            "const {x} = await __runbook.import(\"./m\")\nlet y = x;"
        );
    }

    #[test]
    fn test_dynamic_then_static_on_one_line() {
        let out = rewriter().rewrite(
            r#"await import("./a"); import b from "./b";"#,
            "scripts",
        );
        assert_eq!(
            out,
            r#"await __runbook.import("scripts/a"); const {default: b} = await __runbook.import("scripts/b");"#
        );
    }

    #[test]
    fn test_multiline_script() {
        let source = "import { helper } from \"./lib\";\n\nconst data = await import(\"./data\");\nhelper(data);\n";
        let out = rewriter().rewrite(source, "scripts/tools");
        assert_eq!(
            out,
            "const {helper} = await __runbook.import(\"scripts/tools/lib\");\n\nconst data = await __runbook.import(\"scripts/tools/data\");\nhelper(data);\n"
        );
    }

    #[test]
    fn test_end_to_end_helper_resolution() {
        let out = rewriter().rewrite(r#"await import('./helpers.js')"#, "scripts/utils");
        assert!(out.contains(r#"await __runbook.import('scripts/utils/helpers.js')"#));
    }

    #[test]
    fn test_custom_loader_expression() {
        let rewriter = ImportRewriter::with_loader_expr("host.load");
        let out = rewriter.rewrite(r#"import("./x")"#, "a");
        assert_eq!(out, r#"host.load("a/x")"#);
    }

    #[test]
    fn test_imports_collects_resolved_specs() {
        let source = r#"
import { a } from "./one";
import "./two";
const m = await import("./one");
"#;
        let specs = rewriter().imports(source, "scripts");
        assert_eq!(specs, vec!["scripts/one", "scripts/two"]);
    }

    #[test]
    fn test_imports_skips_passthrough_statements() {
        let specs = rewriter().imports(r#"export * from "./m";"#, "scripts");
        assert!(specs.is_empty());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a, b"), vec!["a", " b"]);
        assert_eq!(split_top_level("{ a, b }, c"), vec!["{ a, b }", " c"]);
        assert_eq!(split_top_level(r#""a,b", c"#), vec![r#""a,b""#, " c"]);
    }

    #[test]
    fn test_map_unquoted_protects_strings() {
        let out = map_unquoted(r#"x as y "a as b" z as w"#, |chunk| {
            AS_KEYWORD.replace_all(chunk, ": ").into_owned()
        });
        assert_eq!(out, r#"x: y "a as b" z: w"#);
    }
}
