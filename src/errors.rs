//! Top-level error type for docdecay, following the recovery rule:
//! only deserialization errors, VCS backend errors, and scoped-resource entry
//! errors ever propagate out of the analyzer. Everything else (file-access,
//! decode, parse failures) is recorded through the warning side-channel
//! (`tracing::warn!`) and the run continues.

use std::path::PathBuf;

use crate::serializer::SerializeError;
use crate::vcs::context::VcsContextError;
use crate::vcs::VcsError;

/// Errors that can propagate out of the public API.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("vcs error: {0}")]
    Vcs(#[from] VcsError),

    #[error("vcs context error: {0}")]
    VcsContext(#[from] VcsContextError),

    #[error("serialization error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Map an error to its process exit code, consumed only by the CLI.
pub fn exit_code(error: &AnalyzerError) -> i32 {
    match error {
        AnalyzerError::PathNotFound(_) => 2,
        AnalyzerError::NotADirectory(_) => 2,
        AnalyzerError::Vcs(_) => 3,
        AnalyzerError::VcsContext(_) => 3,
        AnalyzerError::Serialize(_) => 4,
        AnalyzerError::Io(_) => 1,
    }
}
