// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Codeblock extraction from notes
//!
//! Walks the fenced code blocks of a note and registers the ones whose
//! info string carries a directive, as in:
//!
//! ````text
//! ```js runbook="hello"
//! console.log("hi");
//! ```
//! ````
//!
//! The fence language must be `js` or `javascript` and the directive value
//! follows `runbook=` in single or double quotes. Blocks without a
//! directive, without a name or with an empty body are ignored.

use crate::code::{Code, CodeForm, CodeKind};
use crate::scan::directive;
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;

static FENCE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^(?:javascript|js)\b.*?\srunbook=(?:'((?:\\.|[^'\\])*)'|"((?:\\.|[^"\\])*)")"#)
        .expect("valid regex")
});

/// Codes registered by the directive-carrying code blocks of a note
pub fn codes_in_note(file: &str, content: &str) -> Vec<Code> {
    let mut codes = Vec::new();
    let mut open: Option<(String, usize)> = None;
    let mut body = String::new();

    for (event, range) in Parser::new(content).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                body.clear();
                open = directive_value(&info)
                    .map(|value| (value, line_of(content, range.start)));
            }
            Event::Text(text) if open.is_some() => body.push_str(&text),
            Event::End(TagEnd::CodeBlock) => {
                if let Some((value, line)) = open.take() {
                    if let Some(code) = block_code(file, &value, &body, line) {
                        codes.push(code);
                    }
                }
            }
            _ => {}
        }
    }

    codes
}

/// Directive value from a fence info string, if any
fn directive_value(info: &str) -> Option<String> {
    FENCE_DIRECTIVE.captures(info).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    })
}

fn block_code(file: &str, directive_value: &str, body: &str, line: usize) -> Option<Code> {
    let directive = directive::parse_directive(directive_value)?;
    let name = directive.name?;
    let text = body.trim();
    if text.is_empty() {
        return None;
    }

    Some(Code {
        name,
        desc: directive.desc,
        text: text.to_string(),
        kind: directive.kind.unwrap_or(CodeKind::Script),
        form: CodeForm::Codeblock,
        file: file.to_string(),
        order: directive.order,
        line: Some(line),
    })
}

/// 1-based line of a byte offset
fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_block_is_extracted() {
        let note = r#"# Title

```js runbook="hello"
console.log("hi");
```

Some prose in between.

```js
ignored();
```

```python runbook="nope"
print()
```
"#;
        let codes = codes_in_note("notes/demo.md", note);
        assert_eq!(codes.len(), 1);

        let code = &codes[0];
        assert_eq!(code.name, "hello");
        assert_eq!(code.kind, CodeKind::Script);
        assert_eq!(code.form, CodeForm::Codeblock);
        assert_eq!(code.file, "notes/demo.md");
        assert_eq!(code.text, "console.log(\"hi\");");
        assert_eq!(code.line, Some(3));
    }

    #[test]
    fn test_object_directive_registers_a_module() {
        let note = "```javascript runbook='{n: \"lib\", t: \"m\", d: \"shared helpers\"}'\nexport const x = 1;\n```\n";
        let codes = codes_in_note("notes/lib.md", note);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].name, "lib");
        assert_eq!(codes[0].kind, CodeKind::Module);
        assert_eq!(codes[0].desc, "shared helpers");
    }

    #[test]
    fn test_json_fence_language_is_not_javascript() {
        let note = "```json runbook=\"x\"\n{\"a\": 1}\n```\n";
        assert!(codes_in_note("n.md", note).is_empty());
    }

    #[test]
    fn test_empty_body_is_skipped() {
        let note = "```js runbook=\"empty\"\n\n   \n```\n";
        assert!(codes_in_note("n.md", note).is_empty());
    }

    #[test]
    fn test_unnamed_object_directive_is_skipped() {
        let note = "```js runbook='{t: \"m\"}'\ncode();\n```\n";
        assert!(codes_in_note("n.md", note).is_empty());
    }

    #[test]
    fn test_multiple_blocks_keep_their_lines() {
        let note = "```js runbook=\"first\"\na();\n```\n\ntext\n\n```js runbook=\"second\"\nb();\n```\n";
        let codes = codes_in_note("n.md", note);
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].name, "first");
        assert_eq!(codes[0].line, Some(1));
        assert_eq!(codes[1].name, "second");
        assert_eq!(codes[1].line, Some(7));
    }

    #[test]
    fn test_indented_blocks_are_ignored() {
        let note = "paragraph\n\n    indented code\n";
        assert!(codes_in_note("n.md", note).is_empty());
    }

    #[test]
    fn test_fence_directive_is_case_insensitive() {
        let note = "```JS Runbook=\"shout\"\nx();\n```\n";
        let codes = codes_in_note("n.md", note);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].name, "shout");
    }
}
