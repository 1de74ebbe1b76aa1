//! The `git` CLI backend, shelled out to with `std::process::Command` via
//! `-C <repo>` plus an explicit argument list, never a shell string. Every
//! public entry point validates its commit reference first.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};

use super::{validate_commit_ref, ChangeKind, ChangedFile, Commit, VcsBackend, VcsError};

/// A git repository on disk, addressed by `git -C <root>`.
pub struct GitBackend {
    root: PathBuf,
}

impl GitBackend {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, VcsError> {
        let root = root.into();
        let backend = Self { root };
        if !backend.root.join(".git").exists() {
            let inside = backend.run(&["rev-parse", "--is-inside-work-tree"]);
            if inside.is_err() {
                return Err(VcsError::NotARepository(backend.root));
            }
        }
        Ok(backend)
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, VcsError> {
        let output = Command::new("git").arg("-C").arg(&self.root).args(args).output()?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn run_text(&self, args: &[&str]) -> Result<String, VcsError> {
        Ok(String::from_utf8(self.run(args)?)?)
    }
}

impl VcsBackend for GitBackend {
    fn commit_info(&self, commit_ref: &str) -> Result<Commit, VcsError> {
        validate_commit_ref(commit_ref)?;
        let raw = self.run_text(&[
            "show",
            "-s",
            "--format=%H%x00%P%x00%an%x00%aI%x00%B",
            commit_ref,
        ])?;

        let mut parts = raw.splitn(5, '\0');
        let hash = parts.next().unwrap_or_default().to_string();
        let parents = parts.next().unwrap_or_default();
        let author = parts.next().unwrap_or_default().to_string();
        let iso_date = parts.next().unwrap_or_default();
        let message = parts.next().unwrap_or_default().trim_end().to_string();

        let parent_hash = parents.split_whitespace().next().map(str::to_string);
        let timestamp = DateTime::parse_from_rfc3339(iso_date)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Commit { hash, parent_hash, author, message, timestamp })
    }

    fn changed_files(&self, commit_ref: &str) -> Result<Vec<ChangedFile>, VcsError> {
        validate_commit_ref(commit_ref)?;
        let raw = self.run_text(&[
            "diff-tree",
            "--no-commit-id",
            "--name-status",
            "-r",
            "-z",
            commit_ref,
        ])?;

        let tokens: Vec<&str> = raw.split('\0').filter(|t| !t.is_empty()).collect();
        let mut out = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let status = tokens[i];
            i += 1;
            let first_char = status.chars().next().unwrap_or('?');
            match first_char {
                'R' | 'C' => {
                    if i + 1 >= tokens.len() {
                        break;
                    }
                    let previous_path = PathBuf::from(tokens[i]);
                    let path = PathBuf::from(tokens[i + 1]);
                    i += 2;
                    out.push(ChangedFile { path, previous_path: Some(previous_path), kind: ChangeKind::Renamed });
                }
                'A' => {
                    if i >= tokens.len() {
                        break;
                    }
                    out.push(ChangedFile { path: PathBuf::from(tokens[i]), previous_path: None, kind: ChangeKind::Added });
                    i += 1;
                }
                'D' => {
                    if i >= tokens.len() {
                        break;
                    }
                    out.push(ChangedFile { path: PathBuf::from(tokens[i]), previous_path: None, kind: ChangeKind::Deleted });
                    i += 1;
                }
                _ => {
                    if i >= tokens.len() {
                        break;
                    }
                    out.push(ChangedFile { path: PathBuf::from(tokens[i]), previous_path: None, kind: ChangeKind::Modified });
                    i += 1;
                }
            }
        }
        Ok(out)
    }

    fn file_content_at(&self, commit_ref: &str, path: &Path) -> Result<Vec<u8>, VcsError> {
        validate_commit_ref(commit_ref)?;
        let spec = format!("{commit_ref}:{}", path.display());
        self.run(&["show", &spec])
    }
}
