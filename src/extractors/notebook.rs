//! Jupyter notebook extractor: collects the code cells of an
//! `.ipynb` file into one synthetic Python source, rebasing line numbers by
//! each cell's cumulative offset, then delegates to [`python::extract`].
//! Malformed notebook JSON yields an empty result rather than an error, the
//! same per-file tolerance every extractor in this crate follows.

use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::extractors::python;
use crate::models::{CodeFile, Language};

/// Extract entities from notebook `bytes`. `path` is used only to label the
/// resulting entity locations; it need not exist on disk.
pub fn extract(path: &Path, bytes: &[u8]) -> CodeFile {
    let text = super::decode_source(bytes);
    let parsed: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!("notebook extractor: invalid JSON in {}: {e}", path.display());
            return CodeFile::new(path, Language::Python);
        }
    };

    let Some(cells) = parsed.get("cells").and_then(Value::as_array) else {
        warn!("notebook extractor: no cells array in {}", path.display());
        return CodeFile::new(path, Language::Python);
    };

    let mut line_offset: usize = 0;
    let mut file = CodeFile::new(path, Language::Python);

    for cell in cells {
        let is_code = cell.get("cell_type").and_then(Value::as_str) == Some("code");
        let source = cell_source_text(cell);
        let cell_line_count = source.lines().count().max(1);

        if is_code && !source.trim().is_empty() {
            let mut cell_file = python::extract(path, &source);
            for mut entity in cell_file.entities.drain(..) {
                entity.location.line_start += line_offset;
                if let Some(end) = entity.location.line_end.as_mut() {
                    *end += line_offset;
                }
                file.entities.push(entity);
            }
            for import in cell_file.imports {
                if !file.imports.contains(&import) {
                    file.imports.push(import);
                }
            }
        }

        line_offset += cell_line_count;
    }

    file
}

fn cell_source_text(cell: &Value) -> String {
    match cell.get("source") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn notebook_json(cells_json: &str) -> Vec<u8> {
        format!(r#"{{"cells": [{cells_json}], "metadata": {{}}, "nbformat": 4}}"#).into_bytes()
    }

    #[test]
    fn extracts_function_from_code_cell() {
        let bytes = notebook_json(
            r#"{"cell_type": "markdown", "source": ["# Title\n"]},
               {"cell_type": "code", "source": ["def greet(name):\n", "    return name\n"]}"#,
        );
        let file = extract(&PathBuf::from("nb.ipynb"), &bytes);
        assert_eq!(file.entities.len(), 1);
        assert_eq!(file.entities[0].name, "greet");
    }

    #[test]
    fn line_numbers_rebased_by_prior_cells() {
        let bytes = notebook_json(
            r#"{"cell_type": "code", "source": ["x = 1\n", "y = 2\n", "z = 3\n"]},
               {"cell_type": "code", "source": ["def f():\n", "    pass\n"]}"#,
        );
        let file = extract(&PathBuf::from("nb.ipynb"), &bytes);
        let f = file.entities.iter().find(|e| e.name == "f").unwrap();
        assert_eq!(f.location.line_start, 4);
    }

    #[test]
    fn malformed_json_yields_empty_result() {
        let file = extract(&PathBuf::from("nb.ipynb"), b"not json at all {{{");
        assert!(file.entities.is_empty());
    }

    #[test]
    fn markdown_only_notebook_yields_no_entities() {
        let bytes = notebook_json(r#"{"cell_type": "markdown", "source": ["plain text\n"]}"#);
        let file = extract(&PathBuf::from("nb.ipynb"), &bytes);
        assert!(file.entities.is_empty());
    }
}
