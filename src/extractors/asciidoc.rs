//! AsciiDoc extractor. Headers are `=`-prefixed like Markdown's
//! `#` but use the opposite convention (a single `=` is the document title,
//! `==` is a level-1 section, and so on). Code blocks are `[source,lang]`
//! blocks delimited by `----`; inline code is single-backtick; links use
//! AsciiDoc's `link:url[text]` and bare `scheme://url[text]` forms.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::extractors::markdown::extract_code_block_identifiers;
use crate::models::{DocFile, DocFormat, DocReference, HeaderInfo, Location, ReferenceKind};

struct Patterns {
    header: Regex,
    source_block: Regex,
    delimiter: Regex,
    inline_code: Regex,
    link: Regex,
}

fn patterns() -> &'static Patterns {
    static CELL: OnceLock<Patterns> = OnceLock::new();
    CELL.get_or_init(|| Patterns {
        header: Regex::new(r"^(?P<eq>=+)\s+(?P<text>.+?)\s*$").unwrap(),
        source_block: Regex::new(r"^\[source,\s*(?P<lang>[\w+-]*)\s*\]\s*$").unwrap(),
        delimiter: Regex::new(r"^-{4,}\s*$").unwrap(),
        inline_code: Regex::new(r"`([^`\n]+)`").unwrap(),
        link: Regex::new(r"(?:link:)?(?:\w+://[^\[\s]+)\[([^\]]*)\]").unwrap(),
    })
}

/// Extract headers, code-block identifiers, inline code, and links from
/// AsciiDoc source.
pub fn extract(path: &Path, content: &str) -> DocFile {
    let pats = patterns();
    let lines: Vec<&str> = content.lines().collect();
    let mut file = DocFile::new(path, DocFormat::Asciidoc);

    let mut idx = 0;
    while idx < lines.len() {
        let line = lines[idx];

        if let Some(caps) = pats.source_block.captures(line) {
            let lang = caps["lang"].to_string();
            let lang = if lang.is_empty() { None } else { Some(lang) };

            if idx + 1 < lines.len() && pats.delimiter.is_match(lines[idx + 1]) {
                let start_line = idx + 3;
                let mut end_idx = idx + 2;
                let mut body = Vec::new();
                while end_idx < lines.len() && !pats.delimiter.is_match(lines[end_idx]) {
                    body.push(lines[end_idx]);
                    end_idx += 1;
                }
                let end_line = end_idx;
                let code = body.join("\n");
                let location = Location::with_end(path, start_line.min(end_line.max(1)), end_line.max(start_line));
                for name in extract_code_block_identifiers(&code, lang.as_deref()) {
                    file.references
                        .push(DocReference::new(name, location.clone(), ReferenceKind::CodeBlock));
                }
                idx = end_idx + 1;
                continue;
            }
        }

        if let Some(caps) = pats.header.captures(line) {
            let level = caps["eq"].len() as u8;
            let text = caps["text"].to_string();
            if file.title.is_none() && level == 1 {
                file.title = Some(text.clone());
            }
            file.headers.push(HeaderInfo {
                text: text.clone(),
                level,
                line: idx + 1,
            });
            file.references
                .push(DocReference::new(text, Location::new(path, idx + 1), ReferenceKind::Header));
            idx += 1;
            continue;
        }

        for caps in pats.link.captures_iter(line) {
            let text = caps[1].to_string();
            if !text.is_empty() {
                file.references
                    .push(DocReference::new(text, Location::new(path, idx + 1), ReferenceKind::Link));
            }
        }

        for caps in pats.inline_code.captures_iter(line) {
            file.references.push(DocReference::new(
                caps[1].to_string(),
                Location::new(path, idx + 1),
                ReferenceKind::InlineCode,
            ));
        }

        idx += 1;
    }

    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract_adoc(src: &str) -> DocFile {
        extract(&PathBuf::from("README.adoc"), src)
    }

    #[test]
    fn title_and_section_levels() {
        let file = extract_adoc("= Title\n\n== Section\n");
        assert_eq!(file.title.as_deref(), Some("Title"));
        assert_eq!(file.headers[0].level, 1);
        assert_eq!(file.headers[1].level, 2);
    }

    #[test]
    fn source_block_identifiers_extracted() {
        let file = extract_adoc("[source,python]\n----\ndef process_data(items):\n    return items\n----\n");
        let names: Vec<_> = file
            .references
            .iter()
            .filter(|r| r.kind == ReferenceKind::CodeBlock)
            .map(|r| r.text.as_str())
            .collect();
        assert!(names.contains(&"process_data"));
    }

    #[test]
    fn inline_code_and_link_extracted() {
        let file = extract_adoc("Run `build_index` or see https://example.com[the docs].\n");
        assert!(file.references.iter().any(|r| r.kind == ReferenceKind::InlineCode && r.text == "build_index"));
        assert!(file.references.iter().any(|r| r.kind == ReferenceKind::Link && r.text == "the docs"));
    }
}
