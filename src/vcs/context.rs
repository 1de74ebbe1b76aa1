//! RAII scratch-space guards for operating on a commit without disturbing
//! the caller's working tree: a throwaway clone, a temporary
//! checkout that restores the original ref on drop, and a stash/unstash
//! pair around operations that must run against a clean tree. Each guard
//! logs rather than panics if its cleanup step fails, since a `Drop` cannot
//! propagate an error and a failed cleanup should never mask the result the
//! caller already has.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::warn;

use super::validate_commit_ref;

#[derive(Debug, thiserror::Error)]
pub enum VcsContextError {
    #[error("failed to clone {source_path} to scratch directory: {stderr}")]
    CloneFailed { source_path: PathBuf, stderr: String },

    #[error("failed to checkout {commit_ref} in {repo}: {stderr}")]
    CheckoutFailed { repo: PathBuf, commit_ref: String, stderr: String },

    #[error("failed to resolve current ref in {0}")]
    CurrentRefUnresolvable(PathBuf),

    #[error(transparent)]
    InvalidCommitRef(#[from] super::VcsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn run(repo: &Path, args: &[&str]) -> Result<std::process::Output, std::io::Error> {
    Command::new("git").arg("-C").arg(repo).args(args).output()
}

/// A disposable full clone of a repository, removed when dropped. Analysis
/// that needs to check out arbitrary historical commits runs against this
/// clone instead of the caller's actual working tree.
pub struct ClonedRepo {
    _tempdir: TempDir,
    path: PathBuf,
}

impl ClonedRepo {
    pub fn clone_from(source: &Path) -> Result<Self, VcsContextError> {
        let tempdir = TempDir::new()?;
        let dest = tempdir.path().join("repo");
        let output = Command::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg("--no-hardlinks")
            .arg(source)
            .arg(&dest)
            .output()?;
        if !output.status.success() {
            return Err(VcsContextError::CloneFailed {
                source_path: source.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(Self { _tempdir: tempdir, path: dest })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Checks out `commit_ref` in `repo` for the guard's lifetime, restoring
/// whatever ref `HEAD` pointed at before on drop.
pub struct CheckoutCommit {
    repo: PathBuf,
    original_ref: String,
}

impl CheckoutCommit {
    pub fn enter(repo: &Path, commit_ref: &str) -> Result<Self, VcsContextError> {
        validate_commit_ref(commit_ref)?;

        let head = run(repo, &["rev-parse", "HEAD"])?;
        if !head.status.success() {
            return Err(VcsContextError::CurrentRefUnresolvable(repo.to_path_buf()));
        }
        let original_ref = String::from_utf8_lossy(&head.stdout).trim().to_string();

        let checkout = run(repo, &["checkout", "--quiet", commit_ref])?;
        if !checkout.status.success() {
            return Err(VcsContextError::CheckoutFailed {
                repo: repo.to_path_buf(),
                commit_ref: commit_ref.to_string(),
                stderr: String::from_utf8_lossy(&checkout.stderr).trim().to_string(),
            });
        }

        Ok(Self { repo: repo.to_path_buf(), original_ref })
    }
}

impl Drop for CheckoutCommit {
    fn drop(&mut self) {
        if let Ok(output) = run(&self.repo, &["checkout", "--quiet", &self.original_ref]) {
            if !output.status.success() {
                warn!(
                    "vcs: failed to restore original ref {} in {}: {}",
                    self.original_ref,
                    self.repo.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
        } else {
            warn!("vcs: failed to spawn git to restore ref in {}", self.repo.display());
        }
    }
}

/// Stashes uncommitted changes in `repo` for the guard's lifetime, popping
/// them back on drop. A no-op (no stash created) if the tree was already
/// clean.
pub struct StashedChanges {
    repo: PathBuf,
    stashed: bool,
}

impl StashedChanges {
    pub fn enter(repo: &Path) -> Result<Self, VcsContextError> {
        let output = run(repo, &["stash", "push", "--quiet", "--include-untracked"])?;
        let stderr_and_out = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let stashed = output.status.success() && !stderr_and_out.contains("No local changes to save");
        Ok(Self { repo: repo.to_path_buf(), stashed })
    }
}

impl Drop for StashedChanges {
    fn drop(&mut self) {
        if !self.stashed {
            return;
        }
        match run(&self.repo, &["stash", "pop", "--quiet"]) {
            Ok(output) if output.status.success() => {}
            Ok(output) => warn!(
                "vcs: failed to pop stash in {}: {}",
                self.repo.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => warn!("vcs: failed to spawn git to pop stash in {}: {e}", self.repo.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn init_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let git = |args: &[&str]| {
            assert!(StdCommand::new("git").arg("-C").arg(root).args(args).status().unwrap().success());
        };
        git(&["init", "-q"]);
        git(&["config", "user.email", "test@example.com"]);
        git(&["config", "user.name", "Test"]);
        std::fs::write(root.join("a.txt"), "one\n").unwrap();
        git(&["add", "-A"]);
        git(&["commit", "-q", "-m", "first"]);
        std::fs::write(root.join("a.txt"), "two\n").unwrap();
        git(&["add", "-A"]);
        git(&["commit", "-q", "-m", "second"]);
        dir
    }

    #[test]
    fn checkout_commit_restores_original_head_on_drop() {
        let dir = init_repo();
        let root = dir.path();
        let before = String::from_utf8(
            StdCommand::new("git").arg("-C").arg(root).args(["rev-parse", "HEAD"]).output().unwrap().stdout,
        )
        .unwrap();

        {
            let _guard = CheckoutCommit::enter(root, "HEAD~1").unwrap();
            let content = std::fs::read_to_string(root.join("a.txt")).unwrap();
            assert_eq!(content, "one\n");
        }

        let after = String::from_utf8(
            StdCommand::new("git").arg("-C").arg(root).args(["rev-parse", "HEAD"]).output().unwrap().stdout,
        )
        .unwrap();
        assert_eq!(before, after);
        assert_eq!(std::fs::read_to_string(root.join("a.txt")).unwrap(), "two\n");
    }

    #[test]
    fn stashed_changes_noop_on_clean_tree() {
        let dir = init_repo();
        let guard = StashedChanges::enter(dir.path()).unwrap();
        assert!(!guard.stashed);
    }

    #[test]
    fn cloned_repo_is_independent_of_source() {
        let dir = init_repo();
        let clone = ClonedRepo::clone_from(dir.path()).unwrap();
        assert!(clone.path().join(".git").exists());
    }
}
