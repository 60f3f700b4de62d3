//! Branch references resolved to commit ids.

use std::fmt;

use tether_git::VcsBackend;

use crate::error::Result;

/// A branch name paired with the commit it pointed at when resolved.
///
/// The revision is a snapshot; later commands on the repository do not
/// update it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch or revision expression, e.g. `main` or `origin/main`.
    pub name: String,
    /// Full commit id.
    pub revision: String,
}

impl BranchRef {
    /// Create a reference from already-known parts.
    #[must_use]
    pub fn new(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
        }
    }

    /// Resolve `name` against `backend`.
    ///
    /// # Errors
    /// Returns error if the name does not resolve to a commit.
    pub fn resolve<B: VcsBackend>(backend: &B, name: &str) -> Result<Self> {
        let revision = backend.resolve_revision(name)?;
        Ok(Self::new(name, revision))
    }

    /// Abbreviated commit id for display.
    #[must_use]
    pub fn short(&self) -> &str {
        self.revision.get(..7).unwrap_or(&self.revision)
    }

    /// Whether both references point at the same commit.
    #[must_use]
    pub fn same_commit(&self, other: &Self) -> bool {
        self.revision == other.revision
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.short())
    }
}
