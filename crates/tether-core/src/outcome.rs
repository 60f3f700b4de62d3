//! Results of sync, push and batch runs.

use std::fmt;
use std::path::PathBuf;

use crate::safety::RebaseSafety;

/// Which operation to run over a set of repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Classify and report, read-only.
    Status,
    /// Fetch, then report.
    Fetch,
    /// Rebase diverged branches that are predicted safe.
    Merge,
    /// Pull (or fetch and rebase interactively), then report.
    Update,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Status => "status",
            Self::Fetch => "fetch",
            Self::Merge => "merge",
            Self::Update => "update",
        })
    }
}

/// Why a repository could not be synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// Directory is missing.
    NotFound(PathBuf),
    /// Rebase stopped on a conflict; it has been aborted.
    RebaseConflict { onto: String },
    /// Pull (or the fetch standing in for it) exited non-zero.
    PullFailed(String),
    /// Fetch exited non-zero.
    FetchFailed(String),
    /// Merge exited non-zero.
    MergeFailed(String),
    /// The backend itself failed.
    Backend(String),
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "{} doesn't exist", path.display()),
            Self::RebaseConflict { onto } => write!(f, "rebase onto {onto} failed, aborted"),
            Self::PullFailed(_) => f.write_str("pull failed"),
            Self::FetchFailed(_) => f.write_str("fetch failed"),
            Self::MergeFailed(_) => f.write_str("merge failed"),
            Self::Backend(message) => f.write_str(message),
        }
    }
}

/// Result of one action on one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Same as upstream, or ahead of it.
    UpToDate,
    /// Local had no commits of its own and now matches upstream.
    FastForwarded,
    /// Local commits were replayed onto upstream.
    Rebased,
    /// Upstream was merged in (binary repositories).
    Merged,
    /// Read-only report of a diverged branch.
    Diverged(RebaseSafety),
    /// The person chose to leave the repository alone.
    Skipped,
    /// Automation stopped; someone has to look.
    NeedsManualResolution(String),
    /// The action failed.
    Failed(SyncFailure),
}

impl SyncOutcome {
    /// Whether the repository needs attention.
    #[must_use]
    pub const fn needs_attention(&self) -> bool {
        matches!(
            self,
            Self::Failed(_) | Self::NeedsManualResolution(_) | Self::Diverged(RebaseSafety::Unsafe(_))
        )
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => f.write_str("up to date"),
            Self::FastForwarded => f.write_str("fast-forwarded"),
            Self::Rebased => f.write_str("rebased"),
            Self::Merged => f.write_str("merged"),
            Self::Diverged(RebaseSafety::Safe) => f.write_str("diverged, can be rebased"),
            Self::Diverged(RebaseSafety::Unsafe(files)) => {
                write!(f, "diverged, {} conflicting file(s)", files.len())
            }
            Self::Skipped => f.write_str("skipped"),
            Self::NeedsManualResolution(reason) => write!(f, "needs attention: {reason}"),
            Self::Failed(failure) => write!(f, "failed: {failure}"),
        }
    }
}

/// Result of the push workflow when it ran to a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Commits were pushed.
    Pushed {
        remote: String,
        destination: String,
        forced: bool,
    },
    /// Empty destination given.
    Cancelled,
    /// The person chose to skip the rebase; nothing was pushed.
    Skipped,
    /// The remote refused the push and force was declined or also refused.
    Rejected,
}

/// Outcome of one repository in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub name: String,
    pub path: PathBuf,
    pub outcome: SyncOutcome,
}

/// Outcomes of a batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub entries: Vec<RepoReport>,
    /// The run stopped early after a failed pull.
    pub halted: bool,
}

impl RunReport {
    /// Number of entries that need attention.
    #[must_use]
    pub fn attention_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.needs_attention())
            .count()
    }

    /// Outcome recorded for the repository called `name`.
    #[must_use]
    pub fn outcome_of(&self, name: &str) -> Option<&SyncOutcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.outcome)
    }
}
