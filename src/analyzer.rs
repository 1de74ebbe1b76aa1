//! The top-level orchestrator: scans a tree, extracts every code
//! and doc file, matches references against entities, and answers coverage
//! and VCS-impact queries over the result. The derived graph and coverage
//! stats are cached and rebuilt only when the `(code_files, doc_files,
//! links)` length triple changes — cheap to check, and correct because
//! every mutation this type exposes appends to exactly one of those three
//! vectors (or replaces `links` wholesale via `relink`).

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::coverage::{CoverageCalculator, CoverageStats};
use crate::errors::AnalyzerError;
use crate::extractors::{extract_code_file, extract_doc_file};
use crate::graph::DocumentationGraph;
use crate::matcher::ReferenceMatcher;
use crate::models::{CodeDocLink, CodeFile, DocFile};
use crate::scanner::{FileClass, ScanError, Scanner};
use crate::vcs::git::GitBackend;
use crate::vcs::impact::{DocumentationImpact, ImpactAnalyzer};
use crate::vcs::tracker::{AnalyzedCommit, EntityChange};

enum ExtractedFile {
    Code(Option<CodeFile>),
    Doc(Option<DocFile>),
    Skipped,
}

struct Cache {
    built_for: (usize, usize, usize),
    graph: DocumentationGraph,
    coverage: CoverageStats,
}

/// A full analysis result, ready to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub root: PathBuf,
    pub code_file_count: usize,
    pub doc_file_count: usize,
    pub coverage: CoverageStats,
    pub links: Vec<CodeDocLink>,
}

#[derive(Default)]
pub struct DocumentationAnalyzer {
    code_files: Vec<CodeFile>,
    doc_files: Vec<DocFile>,
    links: Vec<CodeDocLink>,
    cache: Option<Cache>,
}

impl DocumentationAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code_files(&self) -> &[CodeFile] {
        &self.code_files
    }

    pub fn doc_files(&self) -> &[DocFile] {
        &self.doc_files
    }

    pub fn links(&self) -> &[CodeDocLink] {
        &self.links
    }

    /// Scan `root`, extract every recognized code and doc file, and match
    /// references against entities. Replaces any previously analyzed files.
    pub fn analyze_directory(&mut self, root: &Path) -> Result<(), AnalyzerError> {
        let scanner = Scanner::new();
        let scanned = scanner.scan(root).map_err(|e| match e {
            ScanError::NotFound(p) => AnalyzerError::PathNotFound(p),
            ScanError::NotADirectory(p) => AnalyzerError::NotADirectory(p),
        })?;

        self.code_files.clear();
        self.doc_files.clear();

        // Extraction is per-file and side-effect-free, so a tree with
        // thousands of files parses its members across the Rayon pool
        // instead of one at a time; `scan` already returned `scanned` in a
        // fixed traversal order and `par_iter` preserves it on collect.
        let extracted: Vec<ExtractedFile> = scanned
            .par_iter()
            .map(|file| match file.class {
                FileClass::Code => ExtractedFile::Code(extract_code_file(&file.path)),
                FileClass::Doc => ExtractedFile::Doc(extract_doc_file(&file.path)),
                FileClass::Other => ExtractedFile::Skipped,
            })
            .collect();

        for entry in extracted {
            match entry {
                ExtractedFile::Code(Some(code_file)) => self.code_files.push(code_file),
                ExtractedFile::Doc(Some(doc_file)) => self.doc_files.push(doc_file),
                ExtractedFile::Code(None) | ExtractedFile::Doc(None) | ExtractedFile::Skipped => {}
            }
        }

        self.relink();
        Ok(())
    }

    /// Recompute every code-doc link from the currently held files. Called
    /// automatically by `analyze_directory`; exposed separately so a caller
    /// that adds files one at a time (e.g. incremental re-analysis) can
    /// defer matching until it is done.
    pub fn relink(&mut self) {
        let entities: Vec<_> = self.code_files.iter().flat_map(|f| f.entities.iter().cloned()).collect();
        let matcher = ReferenceMatcher::new(&entities);
        self.links = self
            .doc_files
            .iter()
            .flat_map(|f| matcher.match_all(&f.references))
            .collect();
    }

    fn ensure_cache(&mut self) {
        let key = (self.code_files.len(), self.doc_files.len(), self.links.len());
        let stale = !matches!(&self.cache, Some(c) if c.built_for == key);
        if !stale {
            return;
        }

        let mut graph = DocumentationGraph::new();
        for code_file in &self.code_files {
            graph.add_code_file(code_file);
        }
        for doc_file in &self.doc_files {
            graph.add_doc_file(doc_file);
        }
        for link in &self.links {
            graph.add_link(link);
        }

        let entities: Vec<_> = self.code_files.iter().flat_map(|f| f.entities.iter().cloned()).collect();
        let references: Vec<_> = self.doc_files.iter().flat_map(|f| f.references.iter().cloned()).collect();
        let coverage = CoverageCalculator::compute(&graph, &entities, &references);

        self.cache = Some(Cache { built_for: key, graph, coverage });
    }

    pub fn graph(&mut self) -> &DocumentationGraph {
        self.ensure_cache();
        &self.cache.as_ref().expect("ensure_cache always populates this").graph
    }

    pub fn coverage(&mut self) -> &CoverageStats {
        self.ensure_cache();
        &self.cache.as_ref().expect("ensure_cache always populates this").coverage
    }

    /// Full report for `root`, assuming `root` is what `analyze_directory`
    /// was last called with.
    pub fn report(&mut self, root: &Path) -> AnalysisReport {
        let code_file_count = self.code_files.len();
        let doc_file_count = self.doc_files.len();
        let links = self.links.clone();
        let coverage = self.coverage().clone();
        AnalysisReport { root: root.to_path_buf(), code_file_count, doc_file_count, coverage, links }
    }

    /// Analyze one commit's documentation impact against the tree already
    /// loaded via `analyze_directory`.
    pub fn analyze_commit(&mut self, repo_root: &Path, commit_ref: &str) -> Result<Vec<DocumentationImpact>, AnalyzerError> {
        let backend = GitBackend::new(repo_root)?;
        let analyzed = AnalyzedCommit::new(&backend, commit_ref);
        let changes = analyzed.changes()?;
        let entity_changes: Vec<EntityChange> =
            changes.iter().flat_map(|c| c.entity_changes.iter().cloned()).collect();

        let graph = self.graph();
        Ok(ImpactAnalyzer::analyze(&entity_changes, graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.py"),
            "def process_data(items):\n    \"\"\"Process items.\"\"\"\n    return items\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("README.md"),
            "# Docs\n\nCall `process_data` to process items.\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn analyze_directory_extracts_and_links() {
        let dir = sample_tree();
        let mut analyzer = DocumentationAnalyzer::new();
        analyzer.analyze_directory(dir.path()).unwrap();

        assert_eq!(analyzer.code_files().len(), 1);
        assert_eq!(analyzer.doc_files().len(), 1);
        assert_eq!(analyzer.links().len(), 1);

        let coverage = analyzer.coverage();
        assert_eq!(coverage.total_entities, 1);
        assert_eq!(coverage.documented_entities, 1);
    }

    #[test]
    fn cache_rebuilds_only_when_counts_change() {
        let dir = sample_tree();
        let mut analyzer = DocumentationAnalyzer::new();
        analyzer.analyze_directory(dir.path()).unwrap();
        let node_count_first = analyzer.graph().node_count();

        analyzer.relink();
        let node_count_second = analyzer.graph().node_count();
        assert_eq!(node_count_first, node_count_second);
    }

    #[test]
    fn analyze_directory_on_missing_path_errors() {
        let mut analyzer = DocumentationAnalyzer::new();
        let result = analyzer.analyze_directory(Path::new("/does/not/exist"));
        assert!(matches!(result, Err(AnalyzerError::PathNotFound(_))));
    }

    #[test]
    fn report_serializes_to_json() {
        let dir = sample_tree();
        let mut analyzer = DocumentationAnalyzer::new();
        analyzer.analyze_directory(dir.path()).unwrap();
        let report = analyzer.report(dir.path());
        let json = crate::serializer::AnalysisSerializer::to_json_string(&report).unwrap();
        assert!(json.contains("process_data"));
    }
}
