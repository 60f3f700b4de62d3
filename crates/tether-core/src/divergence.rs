//! Relationship between a local branch and its upstream.

use tether_git::VcsBackend;

use crate::branch::BranchRef;
use crate::error::Result;

/// How a local branch relates to its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    /// Both point at the same commit.
    Same,
    /// Upstream is an ancestor of local; local has this many extra commits.
    Ahead(usize),
    /// Upstream has commits local does not contain.
    Diverged,
}

/// Classify `local` against `upstream`.
///
/// Read-only. Callers must handle a missing upstream before calling this.
///
/// # Errors
/// Returns error if the backend cannot compute the merge base or count.
pub fn classify<B: VcsBackend>(
    local: &BranchRef,
    upstream: &BranchRef,
    backend: &B,
) -> Result<Divergence> {
    if local.same_commit(upstream) {
        return Ok(Divergence::Same);
    }

    let ancestor = backend.common_ancestor(&local.revision, &upstream.revision)?;
    let result = if ancestor == upstream.revision {
        let ahead = backend.commits_ahead_count(&local.revision, &upstream.revision)?;
        Divergence::Ahead(ahead)
    } else {
        Divergence::Diverged
    };

    tracing::debug!(local = %local, upstream = %upstream, ?result, "classified");
    Ok(result)
}
