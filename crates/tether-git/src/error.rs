//! Error types for tether-git.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Path is not inside a git repository.
    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// Repository has no working directory.
    #[error("bare repository has no working tree: {}", .0.display())]
    BareRepository(PathBuf),

    /// HEAD is detached (not on a branch).
    #[error("HEAD is detached - checkout a branch first")]
    DetachedHead,

    /// Reference or revision could not be resolved.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// A git subprocess exited non-zero where success was required.
    #[error("`git {command}` failed with exit code {code}: {output}")]
    CommandFailed {
        /// The arguments passed to git, space separated.
        command: String,
        /// Exit code (`-1` when terminated by a signal).
        code: i32,
        /// Combined stdout/stderr of the process.
        output: String,
    },

    /// Git produced output we could not interpret.
    #[error("unexpected git output for {context}: {output}")]
    InvalidOutput {
        /// What was being parsed.
        context: &'static str,
        /// The offending output.
        output: String,
    },

    /// The git executable could not be spawned.
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
