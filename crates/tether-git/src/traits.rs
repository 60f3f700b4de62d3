//! Trait abstractions for version-control operations.
//!
//! This module defines the `VcsBackend` trait which abstracts the queries and
//! mutations the sync engine performs against one working copy, enabling
//! dependency injection and testability.

use std::collections::BTreeSet;
use std::path::Path;

use crate::{CommandOutput, Result, StatusEntry};

/// Trait for operations against a single local working copy.
///
/// This trait abstracts git operations, allowing for:
/// - Dependency injection in the sync engine
/// - Mock implementations for testing
/// - Alternative implementations (e.g., dry-run mode)
///
/// Query methods return `Err` when git cannot answer. Mutations that are
/// expected to fail in normal use (fetch, pull, rebase, merge, push, stash)
/// return a [`CommandOutput`] and leave interpretation of the exit code to
/// the caller.
#[allow(clippy::missing_errors_doc)]
pub trait VcsBackend {
    // === Repository Info ===

    /// Root of the working tree this backend operates on.
    fn workdir(&self) -> &Path;

    /// Name of the checked-out branch.
    ///
    /// Returns an error if HEAD is detached.
    fn current_branch(&self) -> Result<String>;

    /// Upstream of the current branch in `<remote>/<branch>` form.
    ///
    /// `Ok(None)` when no upstream is configured.
    fn tracking_branch(&self) -> Result<Option<String>>;

    /// Check if a rebase is in progress.
    fn is_rebasing(&self) -> bool;

    // === Revision Queries ===

    /// Resolve a branch or revision expression to a commit id (hex).
    fn resolve_revision(&self, reference: &str) -> Result<String>;

    /// Most recent commit reachable from both references.
    fn common_ancestor(&self, one: &str, two: &str) -> Result<String>;

    /// Number of commits reachable from `new` but not from `old`.
    fn commits_ahead_count(&self, new: &str, old: &str) -> Result<usize>;

    /// One-line log of `old..new`, newest first.
    fn commit_log(&self, old: &str, new: &str) -> Result<String>;

    /// Paths that differ between two revisions.
    fn changed_files(&self, from: &str, to: &str) -> Result<BTreeSet<String>>;

    // === Working Directory ===

    /// Staged, modified and untracked paths.
    fn working_tree_status(&self) -> Result<Vec<StatusEntry>>;

    // === Remote Operations ===

    /// Fetch all remotes, pruning deleted branches.
    fn fetch(&self) -> Result<CommandOutput>;

    /// Pull the upstream into the current branch with `--rebase`.
    ///
    /// A conflicting pull leaves the rebase in progress; see
    /// [`is_rebasing`](Self::is_rebasing).
    fn pull_rebase(&self) -> Result<CommandOutput>;

    /// Push `local` to `remote_branch` on `remote`.
    fn push(
        &self,
        remote: &str,
        local: &str,
        remote_branch: &str,
        force: bool,
    ) -> Result<CommandOutput>;

    // === Rebase / Merge ===

    /// Rebase the current branch onto `onto`.
    fn rebase(&self, onto: &str) -> Result<CommandOutput>;

    /// Abort a rebase in progress. A no-op when none is.
    fn rebase_abort(&self) -> Result<()>;

    /// Merge `reference` into the current branch.
    fn merge(&self, reference: &str) -> Result<CommandOutput>;

    /// Abort a merge in progress. A no-op when none is.
    fn merge_abort(&self) -> Result<()>;

    // === Stash ===

    /// Find the newest stash entry whose message starts with `tag`.
    ///
    /// Returns the entry's name (`stash@{n}`).
    fn find_stash(&self, tag: &str) -> Result<Option<String>>;

    /// Stash local changes, including untracked files, under `message`.
    fn stash_push(&self, message: &str) -> Result<CommandOutput>;

    /// Apply and drop the named stash entry.
    fn stash_pop(&self, name: &str) -> Result<CommandOutput>;
}
