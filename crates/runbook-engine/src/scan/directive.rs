// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Directive values
//!
//! A directive names and classifies a code. It is either a bare name,
//! registering a script, or a relaxed JSON object with short keys:
//! `{n: "name", t: "m", o: 1, d: "description"}`. The relaxed form
//! tolerates single quotes and unquoted keys, which get normalized before
//! parsing. In script files the directive rides in a JSDoc comment on an
//! `@runbook` tag line.

use crate::code::CodeKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

static KEY_BEFORE_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+):").expect("valid regex"));

static JSDOC_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*\*((?s:.*?))\*/").expect("valid regex"));

static JSDOC_TAG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\*\s*@runbook\s+(.*)$").expect("valid regex"));

/// Parsed directive fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    /// Registered name, when given
    pub name: Option<String>,
    /// Kind from the `t` field, when given and recognized
    pub kind: Option<CodeKind>,
    /// Sort key from the `o` field
    pub order: String,
    /// Description from the `d` field
    pub desc: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawDirective {
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    o: Option<serde_json::Value>,
    #[serde(default)]
    d: Option<String>,
}

/// Parse a directive value into its fields
///
/// A value starting with `{` is parsed as a relaxed JSON object; anything
/// after the closing brace is ignored. Any other non-empty value is a bare
/// name registering a script. Returns `None` for empty or unparseable
/// values.
pub fn parse_directive(value: &str) -> Option<Directive> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.starts_with('{') {
        if let Some(end) = value.rfind('}') {
            return parse_object(&value[..=end]);
        }
    }

    Some(Directive {
        name: Some(value.to_string()),
        kind: Some(CodeKind::Script),
        order: String::new(),
        desc: String::new(),
    })
}

/// Directive value from the JSDoc comments of a script file, if any
pub fn jsdoc_directive(source: &str) -> Option<String> {
    let blocks: Vec<&str> = JSDOC_BLOCK
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    if blocks.is_empty() {
        return None;
    }

    JSDOC_TAG_LINE
        .captures(&blocks.join("\n"))
        .map(|caps| caps[1].trim().to_string())
}

fn parse_object(text: &str) -> Option<Directive> {
    let normalized = normalize_quotes(text);
    let keyed = map_unquoted(&normalized, |chunk| {
        KEY_BEFORE_COLON.replace_all(chunk, "\"$1\":").into_owned()
    });

    let raw: RawDirective = match serde_json::from_str(&keyed) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(directive = text, error = %err, "unparseable directive");
            return None;
        }
    };

    Some(Directive {
        name: raw.n,
        kind: raw.t.as_deref().and_then(CodeKind::from_directive),
        order: raw.o.map(order_string).unwrap_or_default(),
        desc: raw.d.unwrap_or_default(),
    })
}

fn order_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Convert single-quoted strings to JSON double-quoted strings
fn normalize_quotes(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Plain,
        Single,
        Double,
    }

    let mut out = String::new();
    let mut state = State::Plain;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match state {
            State::Plain => match ch {
                '\'' => {
                    out.push('"');
                    state = State::Single;
                }
                '"' => {
                    out.push('"');
                    state = State::Double;
                }
                _ => out.push(ch),
            },
            State::Single => match ch {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '\'' => {
                    out.push('"');
                    state = State::Plain;
                }
                '"' => out.push_str("\\\""),
                _ => out.push(ch),
            },
            State::Double => match ch {
                '\\' => {
                    out.push('\\');
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                '"' => {
                    out.push('"');
                    state = State::Plain;
                }
                _ => out.push(ch),
            },
        }
    }

    out
}

/// Apply `f` to the stretches of `text` outside double-quoted strings
fn map_unquoted<F: Fn(&str) -> String>(text: &str, f: F) -> String {
    let mut out = String::new();
    let mut chunk = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_quotes {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_quotes = false;
            }
        } else if ch == '"' {
            out.push_str(&f(&chunk));
            chunk.clear();
            out.push(ch);
            in_quotes = true;
        } else {
            chunk.push(ch);
        }
    }

    out.push_str(&f(&chunk));
    out
}
