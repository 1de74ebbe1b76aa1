//! Markdown extractor: ATX headers, fenced code blocks (with
//! identifier extraction filtered through the shared blocklists), inline
//! code spans, and Markdown links. Code block identifiers and inline code
//! spans inside fences are never double-counted — fenced ranges are found
//! first and excluded from the line-by-line inline-code/link pass.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::extractors::patterns::{
    js_filter_blocked, python_filter_blocked, JS_ALIASES, MIN_IDENTIFIER_LENGTH, PYTHON_ALIASES,
};
use crate::models::{DocFile, DocFormat, DocReference, HeaderInfo, Location, ReferenceKind};

struct Patterns {
    atx_header: Regex,
    fence_open: Regex,
    inline_code: Regex,
    link: Regex,
    identifier: Regex,
}

fn patterns() -> &'static Patterns {
    static CELL: OnceLock<Patterns> = OnceLock::new();
    CELL.get_or_init(|| Patterns {
        atx_header: Regex::new(r"^(?P<hashes>#{1,6})\s+(?P<text>.+?)\s*#*\s*$").unwrap(),
        fence_open: Regex::new(r"^(?P<fence>```|~~~)\s*(?P<lang>[\w+-]*)\s*$").unwrap(),
        inline_code: Regex::new(r"`([^`\n]+)`").unwrap(),
        link: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap(),
        identifier: Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap(),
    })
}

/// Extract headers, code-block identifiers, inline code, and links from
/// Markdown source.
pub fn extract(path: &Path, content: &str) -> DocFile {
    let pats = patterns();
    let lines: Vec<&str> = content.lines().collect();

    let mut file = DocFile::new(path, DocFormat::Markdown);
    let mut in_fence: Vec<bool> = vec![false; lines.len()];

    let mut idx = 0;
    while idx < lines.len() {
        if let Some(caps) = pats.fence_open.captures(lines[idx]) {
            let fence = caps["fence"].to_string();
            let language = if caps["lang"].is_empty() {
                None
            } else {
                Some(caps["lang"].to_string())
            };
            let start_line = idx + 1;
            in_fence[idx] = true;

            let mut end_idx = idx + 1;
            let mut body_lines = Vec::new();
            while end_idx < lines.len() {
                in_fence[end_idx] = true;
                if lines[end_idx].trim_end() == fence {
                    break;
                }
                body_lines.push(lines[end_idx]);
                end_idx += 1;
            }
            let end_line = end_idx.min(lines.len() - 1) + 1;
            let code = body_lines.join("\n");

            for name in extract_code_block_identifiers(&code, language.as_deref()) {
                let location = Location::with_end(path, start_line, end_line);
                file.references
                    .push(DocReference::new(name, location, ReferenceKind::CodeBlock));
            }

            idx = end_idx + 1;
            continue;
        }
        idx += 1;
    }

    for (i, line) in lines.iter().enumerate() {
        if in_fence[i] {
            continue;
        }
        let lineno = i + 1;

        if let Some(caps) = pats.atx_header.captures(line) {
            let level = caps["hashes"].len() as u8;
            let text = caps["text"].trim().to_string();
            if file.title.is_none() && level == 1 {
                file.title = Some(text.clone());
            }
            file.headers.push(HeaderInfo {
                text: text.clone(),
                level,
                line: lineno,
            });
            file.references.push(DocReference::new(
                text,
                Location::new(path, lineno),
                ReferenceKind::Header,
            ));
            continue;
        }

        for caps in pats.link.captures_iter(line) {
            let text = caps[1].to_string();
            file.references.push(DocReference::new(
                text,
                Location::new(path, lineno),
                ReferenceKind::Link,
            ));
        }

        for caps in pats.inline_code.captures_iter(line) {
            let text = caps[1].to_string();
            file.references.push(DocReference::new(
                text,
                Location::new(path, lineno),
                ReferenceKind::InlineCode,
            ));
        }
    }

    file
}

/// Tokenize `code`, keep identifiers of at least [`MIN_IDENTIFIER_LENGTH`],
/// drop built-ins/keywords for the fence's declared language, dedup
/// preserving first occurrence order.
pub fn extract_code_block_identifiers(code: &str, language: Option<&str>) -> Vec<String> {
    let pats = patterns();
    let is_python = language.is_some_and(|l| PYTHON_ALIASES.contains(&l.to_lowercase().as_str()));
    let is_js = language.is_some_and(|l| JS_ALIASES.contains(&l.to_lowercase().as_str()));

    let mut out = Vec::new();
    for m in pats.identifier.find_iter(code) {
        let name = m.as_str();
        if name.len() < MIN_IDENTIFIER_LENGTH {
            continue;
        }
        let blocked = if is_python {
            python_filter_blocked(name)
        } else if is_js {
            js_filter_blocked(name)
        } else {
            python_filter_blocked(name) || js_filter_blocked(name)
        };
        if blocked {
            continue;
        }
        if !out.iter().any(|existing: &String| existing == name) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract_md(src: &str) -> DocFile {
        extract(&PathBuf::from("README.md"), src)
    }

    #[test]
    fn headers_extracted_with_level_and_title() {
        let file = extract_md("# Title\n\n## Section\n");
        assert_eq!(file.title.as_deref(), Some("Title"));
        assert_eq!(file.headers.len(), 2);
        assert_eq!(file.headers[1].level, 2);
    }

    #[test]
    fn inline_code_and_links_extracted() {
        let file = extract_md("Call `process_data` then see [the docs](https://example.com).\n");
        let inline: Vec<_> = file
            .references
            .iter()
            .filter(|r| r.kind == ReferenceKind::InlineCode)
            .collect();
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].text, "process_data");

        let links: Vec<_> = file.references.iter().filter(|r| r.kind == ReferenceKind::Link).collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "the docs");
    }

    #[test]
    fn fenced_code_block_identifiers_extracted_and_filtered() {
        let file = extract_md("```python\ndef process_data(items):\n    return len(items)\n```\n");
        let code_refs: Vec<_> = file
            .references
            .iter()
            .filter(|r| r.kind == ReferenceKind::CodeBlock)
            .map(|r| r.text.as_str())
            .collect();
        assert!(code_refs.contains(&"process_data"));
        assert!(code_refs.contains(&"items"));
        assert!(!code_refs.contains(&"def"));
        assert!(!code_refs.contains(&"len"));
    }

    #[test]
    fn inline_code_inside_fence_not_double_counted() {
        let file = extract_md("```\n`not_inline`\n```\n");
        assert!(file.references.iter().all(|r| r.kind != ReferenceKind::InlineCode));
    }
}
