//! Directory scanner: walks a root, classifies every file as
//! `code`, `doc`, or `other` by extension, honoring a configurable ignore-set
//! of directory basenames independent of any `.gitignore`.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::warn;

/// Directory basenames skipped by default (version control, dependency
/// caches, virtual environments, IDE state, build output, test runners).
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "vendor",
    "__pycache__",
    ".pytest_cache",
    "venv",
    ".venv",
    "env",
    ".env",
    ".idea",
    ".vscode",
    "dist",
    "build",
    "target",
    ".tox",
    ".nox",
];

const CODE_EXTENSIONS: &[&str] = &[
    "py", "pyi", "ipynb", "js", "ts", "tsx", "jsx", "mjs", "cjs", "php", "rb", "java", "c", "cpp",
    "h", "hpp", "cs", "go", "rs", "swift", "kt", "scala", "sh", "bash", "zsh", "fish", "sql",
    "html", "css", "scss", "sass", "tcss", "vue", "svelte", "lua", "r", "m", "mm", "pl", "pm",
    "asp", "aspx", "jsp", "erb", "ejs", "twig", "xsl", "xslt",
];

const DOC_EXTENSIONS: &[&str] = &[
    "md", "markdown", "rst", "txt", "adoc", "asciidoc", "org", "tex", "latex",
];

/// Classification bucket for a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Code,
    Doc,
    Other,
}

/// Classify a path by its lowercased extension against the two disjoint
/// extension tables above.
pub fn classify(path: &Path) -> FileClass {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some(e) if CODE_EXTENSIONS.contains(&e) => FileClass::Code,
        Some(e) if DOC_EXTENSIONS.contains(&e) => FileClass::Doc,
        _ => FileClass::Other,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// A file found by a scan, with its classification.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub class: FileClass,
}

/// Walks a directory tree, applying an ignore-set of directory basenames.
pub struct Scanner {
    ignored_dirs: Vec<String>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add directory basenames to the default ignore-set.
    pub fn with_extra_ignored_dirs(mut self, dirs: impl IntoIterator<Item = String>) -> Self {
        self.ignored_dirs.extend(dirs);
        self
    }

    fn is_ignored_dir_name(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name) || name.ends_with(".egg-info")
    }

    /// Scan the whole tree at once, in pre-order lexicographic order.
    pub fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>, ScanError> {
        let mut out = Vec::new();
        self.scan_batched(root, usize::MAX, |batch, _| out.extend_from_slice(batch))?;
        Ok(out)
    }

    /// Scan in batches no larger than `batch_size`, invoking `on_batch` with
    /// each batch and the cumulative count seen so far. Ordering across
    /// batches matches the unbatched traversal order.
    pub fn scan_batched<F>(
        &self,
        root: &Path,
        batch_size: usize,
        mut on_batch: F,
    ) -> Result<Vec<ScannedFile>, ScanError>
    where
        F: FnMut(&[ScannedFile], usize),
    {
        if !root.exists() {
            return Err(ScanError::NotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let ignored = self.ignored_dirs.clone();
        let mut builder = WalkBuilder::new(root);
        builder.standard_filters(false).sort_by_file_name(std::cmp::Ord::cmp);
        builder.filter_entry(move |entry| {
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                let name = entry.file_name().to_string_lossy();
                if name.ends_with(".egg-info") || ignored.iter().any(|d| d.as_str() == name) {
                    return false;
                }
            }
            true
        });

        let mut all = Vec::new();
        let mut batch = Vec::with_capacity(batch_size.min(1024));
        let mut cumulative = 0usize;

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }
                    let path = entry.path().to_path_buf();
                    let class = classify(&path);
                    let scanned = ScannedFile { path, class };
                    batch.push(scanned.clone());
                    all.push(scanned);
                    cumulative += 1;

                    if batch.len() >= batch_size {
                        on_batch(&batch, cumulative);
                        batch.clear();
                    }
                }
                Err(err) => {
                    warn!("scanner: skipping unreadable entry: {err}");
                }
            }
        }

        if !batch.is_empty() {
            on_batch(&batch, cumulative);
        }

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/a.py"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();
        fs::write(dir.path().join("image.png"), "").unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "").unwrap();
        dir
    }

    #[test]
    fn classifies_code_doc_other() {
        assert_eq!(classify(Path::new("a.py")), FileClass::Code);
        assert_eq!(classify(Path::new("README.md")), FileClass::Doc);
        assert_eq!(classify(Path::new("image.png")), FileClass::Other);
    }

    #[test]
    fn scan_skips_ignored_dirs() {
        let dir = sample_tree();
        let files = Scanner::new().scan(dir.path()).unwrap();
        assert!(files.iter().any(|f| f.path.ends_with("a.py")));
        assert!(files.iter().any(|f| f.path.ends_with("README.md")));
        assert!(!files.iter().any(|f| f.path.ends_with("index.js")));
    }

    #[test]
    fn scan_nonexistent_root_errors() {
        let result = Scanner::new().scan(Path::new("/does/not/exist"));
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }

    #[test]
    fn scan_batched_respects_batch_size() {
        let dir = sample_tree();
        let mut batch_sizes = Vec::new();
        let all = Scanner::new()
            .scan_batched(dir.path(), 1, |batch, _| batch_sizes.push(batch.len()))
            .unwrap();
        assert!(batch_sizes.iter().all(|&n| n <= 1));
        assert_eq!(batch_sizes.iter().sum::<usize>(), all.len());
    }
}
