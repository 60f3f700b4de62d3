//! Error types for tether-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tether-core operations.
///
/// Per-repository problems during a batch run are reported as outcomes, not
/// errors. These variants cover conditions that stop a single operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Target directory does not exist.
    #[error("{} doesn't exist", .0.display())]
    NotFound(PathBuf),

    /// Branch has no upstream configured.
    #[error("branch '{0}' has no tracking branch - push it once with `git push -u`")]
    NoTrackingBranch(String),

    /// Local branch has no commits the upstream lacks.
    #[error("there is no commit to push")]
    NothingToPush,

    /// A rebase stopped on a conflict and was aborted.
    #[error("rebase onto '{onto}' failed and was aborted")]
    RebaseConflict { onto: String, output: String },

    /// Alias not present in the registry.
    #[error("no registered repository named '{0}'")]
    UnknownTarget(String),

    /// Two registrations share one path.
    #[error("{} is registered more than once", .0.display())]
    DuplicatePath(PathBuf),

    /// No configuration directory could be determined.
    #[error("cannot determine config directory - set XDG_CONFIG_HOME or pass --config")]
    NoConfigDir,

    /// Config file parsing error.
    #[error("failed to parse {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(#[from] tether_git::Error),
}
