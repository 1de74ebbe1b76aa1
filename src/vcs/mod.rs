//! Version-control backend: everything needed to compare two
//! commits' worth of source against each other without touching the
//! caller's working tree. `git.rs` is the only backend today; `VcsBackend`
//! exists so the commit-level tracker in `tracker.rs` never has to shell out
//! directly.

pub mod context;
pub mod git;
pub mod impact;
pub mod tracker;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("invalid commit reference: {0}")]
    InvalidCommitRef(String),

    #[error("git command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("commit output was not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("IO error running git: {0}")]
    Io(#[from] std::io::Error),
}

/// A single commit's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub hash: String,
    pub parent_hash: Option<String>,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// How a path changed between a commit and its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangedFile {
    pub path: PathBuf,
    pub previous_path: Option<PathBuf>,
    pub kind: ChangeKind,
}

/// Anything that can answer "what changed, and what did this file look like
/// at that point" for a commit range. Kept narrow and synchronous, since a
/// single analyzer run never needs more than sequential access to one repo.
pub trait VcsBackend {
    fn commit_info(&self, commit_ref: &str) -> Result<Commit, VcsError>;
    fn changed_files(&self, commit_ref: &str) -> Result<Vec<ChangedFile>, VcsError>;
    fn file_content_at(&self, commit_ref: &str, path: &Path) -> Result<Vec<u8>, VcsError>;
}

/// Reject anything that is not a plausible git ref: a hex object id, `HEAD`
/// with optional `~N`/`^N` suffixes, or a conventional branch/tag name.
/// Every backend call runs this before building a `Command`, so a commit
/// reference that smuggled in control characters or shell metacharacters
/// never reaches a subprocess argument.
pub fn validate_commit_ref(commit_ref: &str) -> Result<(), VcsError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(HEAD(~\d+|\^+)*|[0-9a-fA-F]{4,40}|[A-Za-z0-9][A-Za-z0-9._/-]*)$").unwrap()
    });
    if pattern.is_match(commit_ref) {
        Ok(())
    } else {
        Err(VcsError::InvalidCommitRef(commit_ref.to_string()))
    }
}
