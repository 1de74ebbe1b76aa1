//! Per-language/per-format extraction: turns a file's bytes into a
//! [`CodeFile`](crate::models::CodeFile) or
//! [`DocFile`](crate::models::DocFile). Python is parsed with a full syntax
//! tree; JavaScript/TypeScript and the documentation formats use compiled
//! regex batteries.

pub mod asciidoc;
pub mod javascript;
pub mod markdown;
pub mod notebook;
pub mod patterns;
pub mod python;
pub mod rst;

use std::path::Path;

use tracing::warn;

use crate::models::{CodeFile, DocFile, DocFormat, Language};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Decode raw file bytes, tolerating anything: UTF-8 (with or without a
/// byte-order mark) first, then an 8-bit superset decode that cannot fail
/// (every byte maps to its own Unicode scalar value).
pub fn decode_source(bytes: &[u8]) -> String {
    let without_bom = bytes
        .strip_prefix(&[0xEF, 0xBB, 0xBF])
        .unwrap_or(bytes);

    match std::str::from_utf8(without_bom) {
        Ok(s) => s.to_string(),
        Err(_) => without_bom.iter().map(|&b| b as char).collect(),
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(|s| s.to_lowercase())
}

/// Map a file extension to the code [`Language`] it should be parsed as,
/// `None` if this extension has no extractor (e.g. Go, Rust, Java — scanned
/// and classified as `code` by the scanner, but outside the set of
/// languages this tool actually implements extractors for).
pub fn language_for_path(path: &Path) -> Option<Language> {
    match extension_of(path)?.as_str() {
        "py" | "pyi" => Some(Language::Python),
        "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
        "ts" | "tsx" => Some(Language::TypeScript),
        _ => None,
    }
}

fn is_notebook(path: &Path) -> bool {
    extension_of(path).as_deref() == Some("ipynb")
}

/// Map a file extension to the [`DocFormat`] it should be parsed as.
pub fn doc_format_for_path(path: &Path) -> Option<DocFormat> {
    match extension_of(path)?.as_str() {
        "md" | "markdown" => Some(DocFormat::Markdown),
        "rst" => Some(DocFormat::Rst),
        "adoc" | "asciidoc" => Some(DocFormat::Asciidoc),
        "txt" | "org" | "tex" | "latex" => Some(DocFormat::Plain),
        _ => None,
    }
}

/// Extract a `CodeFile` from raw bytes already in memory (e.g. read from a
/// historical VCS blob rather than the working tree). Returns `None` for
/// extensions with no code extractor.
pub fn extract_code_bytes(path: &Path, bytes: &[u8]) -> Option<CodeFile> {
    if is_notebook(path) {
        return Some(notebook::extract(path, bytes));
    }

    let language = language_for_path(path)?;
    let source = decode_source(bytes);
    Some(match language {
        Language::Python => python::extract(path, &source),
        Language::JavaScript | Language::TypeScript => javascript::extract(path, &source, language),
    })
}

/// Extract a `CodeFile` from a file on disk. Returns `None` for extensions
/// with no code extractor, or an empty `CodeFile` (with a warning) on
/// read/parse failure —, a single bad file never aborts a run.
pub fn extract_code_file(path: &Path) -> Option<CodeFile> {
    if !is_notebook(path) {
        language_for_path(path)?;
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("extractor: failed to read {}: {e}", path.display());
            let language = language_for_path(path).unwrap_or(Language::Python);
            return Some(CodeFile::new(path, language));
        }
    };

    extract_code_bytes(path, &bytes)
}

/// Extract a `DocFile` from a file on disk. `None` for extensions with no
/// doc extractor.
pub fn extract_doc_file(path: &Path) -> Option<DocFile> {
    let format = doc_format_for_path(path)?;

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("extractor: failed to read {}: {e}", path.display());
            return Some(DocFile::new(path, format));
        }
    };
    let source = decode_source(&bytes);

    let file = match format {
        DocFormat::Markdown => markdown::extract(path, &source),
        DocFormat::Rst => rst::extract(path, &source),
        DocFormat::Asciidoc => asciidoc::extract(path, &source),
        DocFormat::Plain => DocFile::new(path, DocFormat::Plain),
    };
    Some(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_handles_valid_utf8() {
        assert_eq!(decode_source("hello".as_bytes()), "hello");
    }

    #[test]
    fn decode_strips_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"def f(): pass");
        assert_eq!(decode_source(&bytes), "def f(): pass");
    }

    #[test]
    fn decode_falls_back_on_invalid_utf8() {
        let bytes = vec![0xFF, 0xFE, b'x'];
        let decoded = decode_source(&bytes);
        assert_eq!(decoded.chars().count(), 3);
    }

    #[test]
    fn language_and_format_dispatch() {
        assert_eq!(language_for_path(Path::new("a.py")), Some(Language::Python));
        assert_eq!(language_for_path(Path::new("a.tsx")), Some(Language::TypeScript));
        assert_eq!(language_for_path(Path::new("a.rs")), None);
        assert_eq!(doc_format_for_path(Path::new("a.md")), Some(DocFormat::Markdown));
        assert_eq!(doc_format_for_path(Path::new("a.adoc")), Some(DocFormat::Asciidoc));
    }
}
