//! Core data model shared by every extractor, the graph, the matcher, and the
//! VCS differential: entities, documentation references, and the links
//! between them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Leading path segments stripped when deriving a module path from a file
/// path (see [`file_path_to_module_path`]).
const SOURCE_DIR_PREFIXES: &[&str] = &["src", "lib", "source", "pkg", "packages", "app"];

/// Characters stripped from the outside of a reference's raw text to produce
/// its `clean_text`.
const CLEAN_TEXT_CHARS: &[char] = &['`', '\'', '"', '[', ']'];

/// Source languages the code extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
}

/// Documentation formats the doc extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    Markdown,
    Rst,
    Asciidoc,
    Plain,
}

/// Kind of a named code construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
    Method,
    Variable,
    Constant,
    Module,
}

/// Kind of a documentation mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    InlineCode,
    CodeBlock,
    Link,
    Header,
}

/// Confidence tier assigned by the matcher to a `CodeDocLink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Exact,
    Qualified,
    Partial,
}

/// A location within a file: 1-based line numbers, optional end line for
/// multi-line spans (code blocks, multi-line class/function bodies).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub line_start: usize,
    pub line_end: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line_start: usize) -> Self {
        Self {
            file: file.into(),
            line_start,
            line_end: None,
        }
    }

    pub fn with_end(file: impl Into<PathBuf>, line_start: usize, line_end: usize) -> Self {
        Self {
            file: file.into(),
            line_start,
            line_end: Some(line_end),
        }
    }

    /// `(start, end)`, with `end` defaulting to `start` for single-line spans.
    pub fn span(&self) -> (usize, usize) {
        (self.line_start, self.line_end.unwrap_or(self.line_start))
    }

    /// The `(file, line_start)` key used to identify a reference for linkage
    /// purposes.
    pub fn ref_key(&self) -> (PathBuf, usize) {
        (self.file.clone(), self.line_start)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_end {
            Some(end) if end != self.line_start => {
                write!(f, "{}:{}-{}", self.file.display(), self.line_start, end)
            }
            _ => write!(f, "{}:{}", self.file.display(), self.line_start),
        }
    }
}

/// Strip `` ` '' [] `` from the outside of `text`, then trim whitespace.
/// The result never has leading/trailing whitespace and never has a
/// leading/trailing quote-like character.
pub fn clean_text(text: &str) -> String {
    text.trim()
        .trim_matches(|c| CLEAN_TEXT_CHARS.contains(&c))
        .trim()
        .to_string()
}

/// Derive a dotted module path from a file path: drop the extension, then
/// strip a single leading segment if it matches [`SOURCE_DIR_PREFIXES`].
/// Falls back to the file stem if nothing remains.
pub fn file_path_to_module_path(path: &Path) -> String {
    let without_ext = path.with_extension("");
    let mut parts: Vec<String> = without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(first) = parts.first() {
        if SOURCE_DIR_PREFIXES.contains(&first.as_str()) {
            parts.remove(0);
        }
    }

    if parts.is_empty() {
        return without_ext
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    parts.join(".")
}

/// A named, definable code construct: a function, class, method, module-level
/// constant, variable, or type alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEntity {
    pub name: String,
    pub kind: EntityKind,
    pub location: Location,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub parent_name: Option<String>,
}

impl CodeEntity {
    pub fn new(name: impl Into<String>, kind: EntityKind, location: Location) -> Self {
        Self {
            name: name.into(),
            kind,
            location,
            signature: None,
            docstring: None,
            parent_name: None,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    /// Module path derived from this entity's file location.
    pub fn module_path(&self) -> String {
        file_path_to_module_path(&self.location.file)
    }

    /// The canonical identity key: `module_path + "." + (parent + ".")? + name`.
    pub fn qualified_name(&self) -> String {
        let module = self.module_path();
        match &self.parent_name {
            Some(parent) => format!("{module}.{parent}.{}", self.name),
            None => format!("{module}.{}", self.name),
        }
    }

    /// `parent.name` if this entity has a parent, else just `name` — the key
    /// used to match entities across commits when diffing a changed file.
    pub fn diff_key(&self) -> String {
        match &self.parent_name {
            Some(parent) => format!("{parent}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn is_dunder(&self) -> bool {
        self.name.starts_with("__") && self.name.ends_with("__") && self.name.len() > 4
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// A documentation mention that may name an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocReference {
    pub text: String,
    pub location: Location,
    pub kind: ReferenceKind,
    pub context: Option<String>,
}

impl DocReference {
    pub fn new(text: impl Into<String>, location: Location, kind: ReferenceKind) -> Self {
        Self {
            text: text.into(),
            location,
            kind,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn clean_text(&self) -> String {
        clean_text(&self.text)
    }
}

/// An asserted correspondence between one entity and one reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDocLink {
    pub entity_qualified_name: String,
    pub reference_location: Location,
    pub reference_clean_text: String,
    pub link_kind: LinkKind,
    pub confidence: f64,
}

impl CodeDocLink {
    pub fn new(
        entity_qualified_name: impl Into<String>,
        reference_location: Location,
        reference_clean_text: impl Into<String>,
        link_kind: LinkKind,
        confidence: f64,
    ) -> Self {
        Self {
            entity_qualified_name: entity_qualified_name.into(),
            reference_location,
            reference_clean_text: reference_clean_text.into(),
            link_kind,
            confidence,
        }
    }
}

/// A Markdown/RST/AsciiDoc header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub text: String,
    pub level: u8,
    pub line: usize,
}

/// A fenced/literal code block extracted from a doc file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockInfo {
    pub language: Option<String>,
    pub code: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// A source file classified as code, with its extracted entities and
/// deduplicated top-level imports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeFile {
    pub path: PathBuf,
    pub language: Option<Language>,
    pub entities: Vec<CodeEntity>,
    pub imports: Vec<String>,
}

impl CodeFile {
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            path: path.into(),
            language: Some(language),
            entities: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &CodeEntity> {
        self.entities.iter().filter(|e| e.kind == EntityKind::Function)
    }

    pub fn classes(&self) -> impl Iterator<Item = &CodeEntity> {
        self.entities.iter().filter(|e| e.kind == EntityKind::Class)
    }

    pub fn entity_names(&self) -> Vec<String> {
        self.entities.iter().map(CodeEntity::qualified_name).collect()
    }

    pub fn get_entity(&self, name: &str) -> Option<&CodeEntity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// A documentation file, with its extracted references and headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocFile {
    pub path: PathBuf,
    pub format: Option<DocFormat>,
    pub title: Option<String>,
    pub references: Vec<DocReference>,
    pub headers: Vec<HeaderInfo>,
}

impl DocFile {
    pub fn new(path: impl Into<PathBuf>, format: DocFormat) -> Self {
        Self {
            path: path.into(),
            format: Some(format),
            title: None,
            references: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn referenced_names(&self) -> Vec<String> {
        self.references.iter().map(DocReference::clean_text).collect()
    }
}
