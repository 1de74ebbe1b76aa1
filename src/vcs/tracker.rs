//! Commit-level entity diffing: re-extracts each changed file's
//! entities at a commit and its parent, keyed by [`CodeEntity::diff_key`],
//! and classifies every key present on at least one side as added, deleted,
//! or changed. A changed entity's category is the first of
//! signature/docstring/body that actually differs — signature changes are
//! the most consequential for documentation, so they take priority over a
//! docstring edit that happened to land in the same commit.
//!
//! `CodeEntity` does not retain full body text (only its span), so a body
//! change is detected by span length rather than content; this misses a
//! same-length body rewrite, a gap the original Python implementation this
//! was ported from accepted too.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::extractors::extract_code_bytes;
use crate::models::CodeEntity;
use crate::vcs::{ChangeKind, ChangedFile, VcsBackend, VcsError};

#[derive(Debug, Clone)]
pub enum EntityChange {
    Added(CodeEntity),
    Deleted(CodeEntity),
    SignatureChanged { before: CodeEntity, after: CodeEntity },
    DocstringChanged { before: CodeEntity, after: CodeEntity },
    BodyChanged { before: CodeEntity, after: CodeEntity },
}

impl EntityChange {
    /// The entity this change is about: the new version if one exists, else
    /// the deleted version.
    pub fn entity(&self) -> &CodeEntity {
        match self {
            EntityChange::Added(e) | EntityChange::Deleted(e) => e,
            EntityChange::SignatureChanged { after, .. }
            | EntityChange::DocstringChanged { after, .. }
            | EntityChange::BodyChanged { after, .. } => after,
        }
    }
}

fn span_len(entity: &CodeEntity) -> usize {
    let (start, end) = entity.location.span();
    end.saturating_sub(start)
}

fn diff_entity_lists(before: &[CodeEntity], after: &[CodeEntity]) -> Vec<EntityChange> {
    let before_map: HashMap<String, &CodeEntity> = before.iter().map(|e| (e.diff_key(), e)).collect();
    let after_map: HashMap<String, &CodeEntity> = after.iter().map(|e| (e.diff_key(), e)).collect();

    let mut keys: Vec<&String> = before_map.keys().chain(after_map.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut changes = Vec::new();
    for key in keys {
        match (before_map.get(key), after_map.get(key)) {
            (None, Some(&new)) => changes.push(EntityChange::Added(new.clone())),
            (Some(&old), None) => changes.push(EntityChange::Deleted(old.clone())),
            (Some(&old), Some(&new)) => {
                if old.signature != new.signature {
                    changes.push(EntityChange::SignatureChanged { before: old.clone(), after: new.clone() });
                } else if old.docstring != new.docstring {
                    changes.push(EntityChange::DocstringChanged { before: old.clone(), after: new.clone() });
                } else if span_len(old) != span_len(new) {
                    changes.push(EntityChange::BodyChanged { before: old.clone(), after: new.clone() });
                }
            }
            (None, None) => unreachable!("key came from one of the two maps"),
        }
    }
    changes
}

/// Diffs entities for one changed file across a commit boundary.
pub struct ChangeTracker<'b, B: VcsBackend> {
    backend: &'b B,
}

impl<'b, B: VcsBackend> ChangeTracker<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self { backend }
    }

    pub fn diff_file(&self, commit_ref: &str, file: &ChangedFile) -> Vec<EntityChange> {
        let parent_ref = format!("{commit_ref}~1");

        let before_path = file.previous_path.as_deref().unwrap_or(&file.path);
        let before_entities = if file.kind == ChangeKind::Added {
            Vec::new()
        } else {
            self.entities_at(&parent_ref, before_path)
        };

        let after_entities = if file.kind == ChangeKind::Deleted {
            Vec::new()
        } else {
            self.entities_at(commit_ref, &file.path)
        };

        diff_entity_lists(&before_entities, &after_entities)
    }

    fn entities_at(&self, commit_ref: &str, path: &std::path::Path) -> Vec<CodeEntity> {
        match self.backend.file_content_at(commit_ref, path) {
            Ok(bytes) => extract_code_bytes(path, &bytes).map(|f| f.entities).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

/// One changed file's path plus its entity-level diff, computed once and
/// memoized — a commit with a hundred changed files should not re-extract
/// the same blob twice if this is inspected from multiple places.
pub struct AnalyzedChange {
    pub file: PathBuf,
    pub entity_changes: Vec<EntityChange>,
}

/// A commit whose entity-level diff is computed lazily on first access and
/// cached for the rest of the guard's lifetime.
pub struct AnalyzedCommit<'b, B: VcsBackend> {
    backend: &'b B,
    commit_ref: String,
    changes: OnceCell<Vec<AnalyzedChange>>,
}

impl<'b, B: VcsBackend> AnalyzedCommit<'b, B> {
    pub fn new(backend: &'b B, commit_ref: impl Into<String>) -> Self {
        Self { backend, commit_ref: commit_ref.into(), changes: OnceCell::new() }
    }

    pub fn commit_ref(&self) -> &str {
        &self.commit_ref
    }

    pub fn changes(&self) -> Result<&[AnalyzedChange], VcsError> {
        if self.changes.get().is_none() {
            let computed = self.compute()?;
            let _ = self.changes.set(computed);
        }
        Ok(self.changes.get().expect("just initialized above"))
    }

    fn compute(&self) -> Result<Vec<AnalyzedChange>, VcsError> {
        let tracker = ChangeTracker::new(self.backend);
        let changed_files = self.backend.changed_files(&self.commit_ref)?;
        Ok(changed_files
            .into_iter()
            .map(|file| {
                let entity_changes = tracker.diff_file(&self.commit_ref, &file);
                AnalyzedChange { file: file.path, entity_changes }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, Location};

    fn entity(name: &str, signature: &str, docstring: Option<&str>, end_line: usize) -> CodeEntity {
        let mut e = CodeEntity::new(name, EntityKind::Function, Location::with_end("a.py", 1, end_line))
            .with_signature(signature);
        if let Some(doc) = docstring {
            e = e.with_docstring(doc);
        }
        e
    }

    #[test]
    fn detects_added_and_deleted() {
        let before = vec![entity("old_fn", "def old_fn():", None, 2)];
        let after = vec![entity("new_fn", "def new_fn():", None, 2)];
        let changes = diff_entity_lists(&before, &after);
        assert!(changes.iter().any(|c| matches!(c, EntityChange::Added(e) if e.name == "new_fn")));
        assert!(changes.iter().any(|c| matches!(c, EntityChange::Deleted(e) if e.name == "old_fn")));
    }

    #[test]
    fn signature_change_takes_priority_over_docstring_change() {
        let before = vec![entity("f", "def f(a):", Some("old doc"), 2)];
        let after = vec![entity("f", "def f(a, b):", Some("new doc"), 2)];
        let changes = diff_entity_lists(&before, &after);
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], EntityChange::SignatureChanged { .. }));
    }

    #[test]
    fn docstring_only_change_detected() {
        let before = vec![entity("f", "def f():", Some("old"), 2)];
        let after = vec![entity("f", "def f():", Some("new"), 2)];
        let changes = diff_entity_lists(&before, &after);
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], EntityChange::DocstringChanged { .. }));
    }

    #[test]
    fn body_change_detected_via_span_length() {
        let before = vec![entity("f", "def f():", None, 2)];
        let after = vec![entity("f", "def f():", None, 10)];
        let changes = diff_entity_lists(&before, &after);
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], EntityChange::BodyChanged { .. }));
    }

    #[test]
    fn unchanged_entity_produces_no_change() {
        let before = vec![entity("f", "def f():", Some("doc"), 2)];
        let after = vec![entity("f", "def f():", Some("doc"), 2)];
        assert!(diff_entity_lists(&before, &after).is_empty());
    }
}
