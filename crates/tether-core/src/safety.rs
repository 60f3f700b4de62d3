//! Path-level conflict prediction for rebases.

use std::collections::BTreeSet;

use tether_git::VcsBackend;

use crate::branch::BranchRef;
use crate::error::Result;

/// Whether rebasing local onto upstream is predicted to be conflict-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseSafety {
    /// No path was changed on both sides since the merge base.
    Safe,
    /// Paths changed on both sides.
    Unsafe(BTreeSet<String>),
}

impl RebaseSafety {
    /// Whether no overlap was found.
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// Intersect the paths each side changed since the common ancestor.
///
/// Coarse on purpose: any shared path counts as a conflict, even when the
/// hunks would merge cleanly.
///
/// # Errors
/// Returns error if the merge base or either diff cannot be computed.
pub fn check_rebase_safe<B: VcsBackend>(
    local: &BranchRef,
    upstream: &BranchRef,
    backend: &B,
) -> Result<RebaseSafety> {
    let ancestor = backend.common_ancestor(&local.revision, &upstream.revision)?;
    let ours = backend.changed_files(&ancestor, &local.revision)?;
    let theirs = backend.changed_files(&ancestor, &upstream.revision)?;

    let overlap: BTreeSet<String> = ours.intersection(&theirs).cloned().collect();
    tracing::debug!(
        ours = ours.len(),
        theirs = theirs.len(),
        overlap = overlap.len(),
        "rebase safety"
    );

    if overlap.is_empty() {
        Ok(RebaseSafety::Safe)
    } else {
        Ok(RebaseSafety::Unsafe(overlap))
    }
}
