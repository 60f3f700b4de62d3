//! Working-tree status entries.

use std::fmt;

use git2::Status;

/// How a path differs from HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusTag {
    /// Change recorded in the index.
    Staged,
    /// Tracked file changed in the working tree only.
    Modified,
    /// File not known to git.
    Untracked,
}

impl StatusTag {
    /// Classify a libgit2 status bitset.
    ///
    /// Returns `None` for clean or ignored entries. A path that is both staged
    /// and modified again in the working tree counts as staged.
    #[must_use]
    pub fn from_status(status: Status) -> Option<Self> {
        if status.is_ignored() {
            return None;
        }
        if status.intersects(
            Status::INDEX_NEW
                | Status::INDEX_MODIFIED
                | Status::INDEX_DELETED
                | Status::INDEX_RENAMED
                | Status::INDEX_TYPECHANGE,
        ) {
            return Some(Self::Staged);
        }
        if status.is_wt_new() {
            return Some(Self::Untracked);
        }
        if status.intersects(
            Status::WT_MODIFIED
                | Status::WT_DELETED
                | Status::WT_RENAMED
                | Status::WT_TYPECHANGE
                | Status::CONFLICTED,
        ) {
            return Some(Self::Modified);
        }
        None
    }

    /// Two-column marker in the spirit of `git status -s`.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Staged => "S ",
            Self::Modified => " M",
            Self::Untracked => "??",
        }
    }
}

/// One changed path in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// Kind of change.
    pub tag: StatusTag,
}

impl StatusEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(path: impl Into<String>, tag: StatusTag) -> Self {
        Self {
            path: path.into(),
            tag,
        }
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag.marker(), self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_changes_win_over_worktree_changes() {
        let status = Status::INDEX_MODIFIED | Status::WT_MODIFIED;
        assert_eq!(StatusTag::from_status(status), Some(StatusTag::Staged));
    }

    #[test]
    fn new_files_are_untracked() {
        assert_eq!(
            StatusTag::from_status(Status::WT_NEW),
            Some(StatusTag::Untracked)
        );
    }

    #[test]
    fn deletions_count_as_modified() {
        assert_eq!(
            StatusTag::from_status(Status::WT_DELETED),
            Some(StatusTag::Modified)
        );
    }

    #[test]
    fn clean_and_ignored_are_skipped() {
        assert_eq!(StatusTag::from_status(Status::CURRENT), None);
        assert_eq!(StatusTag::from_status(Status::IGNORED), None);
    }

    #[test]
    fn display_matches_short_status() {
        let entry = StatusEntry::new("src/main.rs", StatusTag::Untracked);
        assert_eq!(entry.to_string(), "?? src/main.rs");
    }
}
