//! Result serialization: renders the analysis output to JSON,
//! either as a string or to a file under a caller-chosen root. Output paths
//! are resolved component-by-component so a `..` or an absolute path in a
//! user-supplied output path can never escape that root.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("output path escapes its root: {0}")]
    PathEscapesRoot(PathBuf),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error writing output: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AnalysisSerializer;

impl AnalysisSerializer {
    /// Render `value` as pretty-printed JSON.
    pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Write `value` as JSON to `relative_output` resolved under `root`,
    /// creating parent directories as needed. Returns the resolved path.
    pub fn write_json<T: Serialize>(
        value: &T,
        root: &Path,
        relative_output: &Path,
    ) -> Result<PathBuf, SerializeError> {
        let target = Self::resolve_within_root(root, relative_output)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, Self::to_json_string(value)?)?;
        Ok(target)
    }

    /// Join `relative` onto `root`, rejecting any component that would
    /// escape it: an absolute path, a `..`, or a root/prefix component.
    fn resolve_within_root(root: &Path, relative: &Path) -> Result<PathBuf, SerializeError> {
        let mut resolved = root.to_path_buf();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(SerializeError::PathEscapesRoot(relative.to_path_buf())),
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize as _;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn to_json_string_round_trips() {
        let json = AnalysisSerializer::to_json_string(&Sample { value: 42 }).unwrap();
        assert!(json.contains("42"));
    }

    #[test]
    fn write_json_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let path = AnalysisSerializer::write_json(&Sample { value: 1 }, dir.path(), Path::new("out/report.json")).unwrap();
        assert!(path.exists());
        assert!(path.starts_with(dir.path()));
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        let dir = TempDir::new().unwrap();
        let result = AnalysisSerializer::write_json(&Sample { value: 1 }, dir.path(), Path::new("../escape.json"));
        assert!(matches!(result, Err(SerializeError::PathEscapesRoot(_))));
    }

    #[test]
    fn rejects_absolute_output_path() {
        let dir = TempDir::new().unwrap();
        let result = AnalysisSerializer::write_json(&Sample { value: 1 }, dir.path(), Path::new("/etc/passwd"));
        assert!(matches!(result, Err(SerializeError::PathEscapesRoot(_))));
    }
}
