//! reStructuredText extractor. Headers are title lines
//! underlined (optionally overlined) by a run of a single punctuation
//! character; docutils assigns section level by the order each underline
//! character is first seen, which this extractor mirrors. Code blocks come
//! from `.. code-block::` directives and bare `::` literal blocks; links
//! from `` `text <url>`_ ``; inline code from double backticks.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::extractors::markdown::extract_code_block_identifiers;
use crate::models::{DocFile, DocFormat, DocReference, HeaderInfo, Location, ReferenceKind};

const UNDERLINE_CHARS: &str = "=-~^\"'*+#:._`";

struct Patterns {
    code_block_directive: Regex,
    inline_code: Regex,
    link: Regex,
}

fn patterns() -> &'static Patterns {
    static CELL: OnceLock<Patterns> = OnceLock::new();
    CELL.get_or_init(|| Patterns {
        code_block_directive: Regex::new(r"^\s*\.\.\s+code-block::\s*(?P<lang>\S*)\s*$").unwrap(),
        inline_code: Regex::new(r"``([^`]+)``").unwrap(),
        link: Regex::new(r"`([^`<]+)\s*<([^>]+)>`_+").unwrap(),
    })
}

fn is_underline(line: &str) -> Option<char> {
    let trimmed = line.trim_end();
    if trimmed.len() < 3 {
        return None;
    }
    let first = trimmed.chars().next()?;
    if !UNDERLINE_CHARS.contains(first) {
        return None;
    }
    if trimmed.chars().all(|c| c == first) {
        Some(first)
    } else {
        None
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Extract headers, code-block identifiers, inline code, and links from RST
/// source.
pub fn extract(path: &Path, content: &str) -> DocFile {
    let pats = patterns();
    let lines: Vec<&str> = content.lines().collect();
    let mut file = DocFile::new(path, DocFormat::Rst);
    let mut level_order: HashMap<char, u8> = HashMap::new();
    let mut next_level: u8 = 1;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(title_line) = i.checked_sub(1).map(|p| lines[p]) {
            if !title_line.trim().is_empty() {
                if let Some(ch) = is_underline(line) {
                    if line.trim_end().len() >= title_line.trim().len() {
                        let level = *level_order.entry(ch).or_insert_with(|| {
                            let lvl = next_level;
                            next_level += 1;
                            lvl
                        });
                        let text = title_line.trim().to_string();
                        if file.title.is_none() && level == 1 {
                            file.title = Some(text.clone());
                        }
                        file.headers.push(HeaderInfo {
                            text: text.clone(),
                            level,
                            line: i,
                        });
                        file.references.push(DocReference::new(
                            text,
                            Location::new(path, i),
                            ReferenceKind::Header,
                        ));
                        i += 1;
                        continue;
                    }
                }
            }
        }

        let directive_lang = pats.code_block_directive.captures(line).map(|c| c["lang"].to_string());
        let is_literal_marker = line.trim_end().ends_with("::") && directive_lang.is_none();

        if directive_lang.is_some() || is_literal_marker {
            let lang = directive_lang.filter(|s| !s.is_empty());
            let (code, start_line, end_line, consumed) = collect_indented_block(&lines, i + 1);
            if !code.trim().is_empty() {
                let location = Location::with_end(path, start_line, end_line);
                for name in extract_code_block_identifiers(&code, lang.as_deref()) {
                    file.references
                        .push(DocReference::new(name, location.clone(), ReferenceKind::CodeBlock));
                }
            }
            i += 1 + consumed;
            continue;
        }

        for caps in pats.link.captures_iter(line) {
            file.references.push(DocReference::new(
                caps[1].trim().to_string(),
                Location::new(path, i + 1),
                ReferenceKind::Link,
            ));
        }

        for caps in pats.inline_code.captures_iter(line) {
            file.references.push(DocReference::new(
                caps[1].to_string(),
                Location::new(path, i + 1),
                ReferenceKind::InlineCode,
            ));
        }

        i += 1;
    }

    file
}

/// Starting at `start`, skip blank lines, then collect lines indented
/// relative to the first non-blank line until indentation drops. Returns
/// `(code, start_line, end_line, lines_consumed)`, 1-based.
fn collect_indented_block(lines: &[&str], start: usize) -> (String, usize, usize, usize) {
    let mut idx = start;
    while idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }
    if idx >= lines.len() {
        return (String::new(), start + 1, start + 1, idx - start);
    }
    let base_indent = indent_of(lines[idx]);
    if base_indent == 0 {
        return (String::new(), start + 1, start + 1, idx - start);
    }

    let block_start = idx;
    let mut body = Vec::new();
    while idx < lines.len() && (lines[idx].trim().is_empty() || indent_of(lines[idx]) >= base_indent) {
        if !lines[idx].trim().is_empty() {
            body.push(lines[idx].trim_start());
        }
        idx += 1;
    }
    (body.join("\n"), block_start + 1, idx, idx - start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract_rst(src: &str) -> DocFile {
        extract(&PathBuf::from("README.rst"), src)
    }

    #[test]
    fn title_and_section_levels_assigned_by_underline_order() {
        let file = extract_rst("Title\n=====\n\nSection\n-------\n\nSubsection\n~~~~~~~~~~\n");
        assert_eq!(file.title.as_deref(), Some("Title"));
        assert_eq!(file.headers[0].level, 1);
        assert_eq!(file.headers[1].level, 2);
        assert_eq!(file.headers[2].level, 3);
    }

    #[test]
    fn code_block_directive_identifiers_extracted() {
        let file = extract_rst(".. code-block:: python\n\n    def process_data(items):\n        return items\n");
        let names: Vec<_> = file
            .references
            .iter()
            .filter(|r| r.kind == ReferenceKind::CodeBlock)
            .map(|r| r.text.as_str())
            .collect();
        assert!(names.contains(&"process_data"));
    }

    #[test]
    fn inline_code_and_links_extracted() {
        let file = extract_rst("See ``run_server`` and `the guide <https://example.com>`_.\n");
        assert!(file.references.iter().any(|r| r.kind == ReferenceKind::InlineCode && r.text == "run_server"));
        assert!(file.references.iter().any(|r| r.kind == ReferenceKind::Link && r.text == "the guide"));
    }
}
