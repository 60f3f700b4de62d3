//! Repository wrapper implementing [`VcsBackend`].
//!
//! Read-only queries go through libgit2. Anything that touches remotes, runs
//! hooks or rewrites history is delegated to the `git` executable so that the
//! user's credentials, config and hooks apply exactly as on the command line.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use git2::{BranchType, ErrorCode, Oid, RepositoryState, StatusOptions};

use crate::command::{CommandOutput, run_git, run_git_checked};
use crate::error::{Error, Result};
use crate::status::{StatusEntry, StatusTag};
use crate::traits::VcsBackend;

/// High-level wrapper around a git working copy.
pub struct Repository {
    inner: git2::Repository,
    workdir: PathBuf,
}

impl Repository {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    /// Returns error if no repository is found at `path` or any parent, or if
    /// the repository is bare.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = git2::Repository::discover(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::NotARepository(path.to_path_buf())
            } else {
                Error::Git2(e)
            }
        })?;
        let workdir = inner
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::BareRepository(path.to_path_buf()))?;
        Ok(Self { inner, workdir })
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Get the current repository state.
    #[must_use]
    pub fn state(&self) -> RepositoryState {
        self.inner.state()
    }

    fn resolve_oid(&self, reference: &str) -> Result<Oid> {
        let object = self
            .inner
            .revparse_single(reference)
            .map_err(|_| Error::RefNotFound(reference.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| Error::RefNotFound(reference.to_string()))?;
        Ok(commit.id())
    }

    fn commit_tree(&self, reference: &str) -> Result<git2::Tree<'_>> {
        let oid = self.resolve_oid(reference)?;
        Ok(self.inner.find_commit(oid)?.tree()?)
    }
}

impl VcsBackend for Repository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.inner.head()?;
        if !head.is_branch() {
            return Err(Error::DetachedHead);
        }

        head.shorthand().map(String::from).ok_or(Error::DetachedHead)
    }

    fn tracking_branch(&self) -> Result<Option<String>> {
        let name = self.current_branch()?;
        let branch = self.inner.find_branch(&name, BranchType::Local)?;
        match branch.upstream() {
            Ok(upstream) => Ok(upstream.name()?.map(String::from)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn is_rebasing(&self) -> bool {
        matches!(
            self.state(),
            RepositoryState::Rebase
                | RepositoryState::RebaseInteractive
                | RepositoryState::RebaseMerge
        )
    }

    fn resolve_revision(&self, reference: &str) -> Result<String> {
        self.resolve_oid(reference).map(|oid| oid.to_string())
    }

    fn common_ancestor(&self, one: &str, two: &str) -> Result<String> {
        let one = self.resolve_oid(one)?;
        let two = self.resolve_oid(two)?;
        Ok(self.inner.merge_base(one, two)?.to_string())
    }

    fn commits_ahead_count(&self, new: &str, old: &str) -> Result<usize> {
        let mut revwalk = self.inner.revwalk()?;
        revwalk.push(self.resolve_oid(new)?)?;
        revwalk.hide(self.resolve_oid(old)?)?;

        Ok(revwalk.count())
    }

    fn commit_log(&self, old: &str, new: &str) -> Result<String> {
        let range = format!("{old}..{new}");
        run_git_checked(
            &self.workdir,
            &["log", "--oneline", "--graph", "--decorate", "--abbrev-commit", &range],
        )
    }

    fn changed_files(&self, from: &str, to: &str) -> Result<BTreeSet<String>> {
        let old_tree = self.commit_tree(from)?;
        let new_tree = self.commit_tree(to)?;
        let diff = self
            .inner
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

        // Both sides of a rename count as touched.
        let mut files = BTreeSet::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path() {
                    files.insert(path.to_string_lossy().into_owned());
                }
            }
        }
        Ok(files)
    }

    fn working_tree_status(&self) -> Result<Vec<StatusEntry>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);
        let statuses = self.inner.statuses(Some(&mut options))?;

        Ok(statuses
            .iter()
            .filter_map(|entry| {
                let tag = StatusTag::from_status(entry.status())?;
                let path = entry.path()?.to_string();
                Some(StatusEntry::new(path, tag))
            })
            .collect())
    }

    fn fetch(&self) -> Result<CommandOutput> {
        run_git(&self.workdir, &["fetch", "--prune"])
    }

    fn pull_rebase(&self) -> Result<CommandOutput> {
        run_git(&self.workdir, &["pull", "--rebase"])
    }

    fn push(
        &self,
        remote: &str,
        local: &str,
        remote_branch: &str,
        force: bool,
    ) -> Result<CommandOutput> {
        let refspec = format!("{local}:{remote_branch}");
        let mut args = vec!["push", remote, refspec.as_str()];
        if force {
            args.push("--force");
        }
        run_git(&self.workdir, &args)
    }

    fn rebase(&self, onto: &str) -> Result<CommandOutput> {
        run_git(&self.workdir, &["rebase", onto])
    }

    fn rebase_abort(&self) -> Result<()> {
        if !self.is_rebasing() {
            return Ok(());
        }
        run_git_checked(&self.workdir, &["rebase", "--abort"])?;
        Ok(())
    }

    fn merge(&self, reference: &str) -> Result<CommandOutput> {
        run_git(&self.workdir, &["merge", "--no-edit", reference])
    }

    fn merge_abort(&self) -> Result<()> {
        if self.state() != RepositoryState::Merge {
            return Ok(());
        }
        run_git_checked(&self.workdir, &["merge", "--abort"])?;
        Ok(())
    }

    fn find_stash(&self, tag: &str) -> Result<Option<String>> {
        let listing = run_git_checked(&self.workdir, &["stash", "list", "--format=%gd%x09%gs"])?;
        Ok(find_tagged_stash(&listing, tag))
    }

    fn stash_push(&self, message: &str) -> Result<CommandOutput> {
        run_git(
            &self.workdir,
            &["stash", "push", "--include-untracked", "-m", message],
        )
    }

    fn stash_pop(&self, name: &str) -> Result<CommandOutput> {
        run_git(&self.workdir, &["stash", "pop", name])
    }
}

/// Pick the first (newest) entry of `git stash list --format=%gd%x09%gs`
/// whose subject, after the `On <branch>: ` prefix, starts with `tag`.
fn find_tagged_stash(listing: &str, tag: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let (name, subject) = line.split_once('\t')?;
        let message = subject.split_once(": ").map_or(subject, |(_, m)| m);
        message.starts_with(tag).then(|| name.to_string())
    })
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::fs;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let out = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("Failed to run git");
        assert!(
            out.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
    }

    fn configure_identity(dir: &Path) {
        git(dir, &["config", "user.email", "test@example.com"]);
        git(dir, &["config", "user.name", "Test User"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
    }

    fn commit_file(dir: &Path, file: &str, content: &str, msg: &str) {
        fs::write(dir.join(file), content).expect("Failed to write file");
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", msg]);
    }

    /// An "origin" repository with one commit on `main`, and a clone of it.
    fn origin_and_clone() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let origin = temp.path().join("origin");
        let clone = temp.path().join("clone");
        fs::create_dir(&origin).unwrap();

        git(&origin, &["init", "-q"]);
        configure_identity(&origin);
        commit_file(&origin, "README.md", "# Test Repo\n", "Initial commit");
        git(&origin, &["branch", "-M", "main"]);
        git(temp.path(), &["clone", "-q", "origin", "clone"]);
        configure_identity(&clone);

        (temp, origin, clone)
    }

    #[test]
    fn test_open_outside_repository() {
        let temp = TempDir::new().unwrap();
        let err = Repository::open(temp.path()).unwrap_err();
        assert!(matches!(err, Error::NotARepository(_)));
    }

    #[test]
    fn test_current_and_tracking_branch() {
        let (_temp, origin, clone) = origin_and_clone();

        let repo = Repository::open(&clone).unwrap();
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert_eq!(
            repo.tracking_branch().unwrap().as_deref(),
            Some("origin/main")
        );

        let upstream_less = Repository::open(&origin).unwrap();
        assert_eq!(upstream_less.tracking_branch().unwrap(), None);
    }

    #[test]
    fn test_ahead_count_and_ancestor() {
        let (_temp, _origin, clone) = origin_and_clone();
        commit_file(&clone, "a.txt", "a\n", "Local one");
        commit_file(&clone, "b.txt", "b\n", "Local two");

        let repo = Repository::open(&clone).unwrap();
        assert_eq!(repo.commits_ahead_count("main", "origin/main").unwrap(), 2);
        assert_eq!(repo.commits_ahead_count("origin/main", "main").unwrap(), 0);
        assert_eq!(
            repo.common_ancestor("main", "origin/main").unwrap(),
            repo.resolve_revision("origin/main").unwrap()
        );

        let log = repo.commit_log("origin/main", "main").unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Local two"));
    }

    #[test]
    fn test_resolve_unknown_revision() {
        let (_temp, _origin, clone) = origin_and_clone();
        let repo = Repository::open(&clone).unwrap();
        let err = repo.resolve_revision("no-such-branch").unwrap_err();
        assert!(matches!(err, Error::RefNotFound(name) if name == "no-such-branch"));
    }

    #[test]
    fn test_changed_files_since_ancestor() {
        let (_temp, _origin, clone) = origin_and_clone();
        commit_file(&clone, "file.go", "package main\n", "Add file");

        let repo = Repository::open(&clone).unwrap();
        let files = repo.changed_files("origin/main", "main").unwrap();
        assert_eq!(files.into_iter().collect::<Vec<_>>(), vec!["file.go"]);
    }

    #[test]
    fn test_working_tree_status() {
        let (_temp, _origin, clone) = origin_and_clone();
        let repo = Repository::open(&clone).unwrap();
        assert!(repo.working_tree_status().unwrap().is_empty());

        fs::write(clone.join("new.txt"), "x").unwrap();
        fs::write(clone.join("README.md"), "changed").unwrap();
        fs::write(clone.join("staged.txt"), "s").unwrap();
        git(&clone, &["add", "staged.txt"]);

        let mut status = repo.working_tree_status().unwrap();
        status.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(
            status,
            vec![
                StatusEntry::new("README.md", StatusTag::Modified),
                StatusEntry::new("new.txt", StatusTag::Untracked),
                StatusEntry::new("staged.txt", StatusTag::Staged),
            ]
        );
    }

    #[test]
    fn test_rebase_abort_without_rebase_is_noop() {
        let (_temp, _origin, clone) = origin_and_clone();
        let repo = Repository::open(&clone).unwrap();
        assert!(!repo.is_rebasing());
        repo.rebase_abort().unwrap();
    }

    #[test]
    fn test_conflicting_rebase_then_abort() {
        let (_temp, origin, clone) = origin_and_clone();
        commit_file(&origin, "README.md", "upstream\n", "Upstream edit");
        commit_file(&clone, "README.md", "local\n", "Local edit");

        let repo = Repository::open(&clone).unwrap();
        assert!(repo.fetch().unwrap().success());

        let result = repo.rebase("origin/main").unwrap();
        assert!(!result.success());
        assert!(repo.is_rebasing());

        repo.rebase_abort().unwrap();
        assert!(!repo.is_rebasing());
        assert_eq!(fs::read_to_string(clone.join("README.md")).unwrap(), "local\n");
    }

    #[test]
    fn test_conflicting_pull_leaves_rebase_in_progress() {
        let (_temp, origin, clone) = origin_and_clone();
        commit_file(&origin, "README.md", "upstream\n", "Upstream edit");
        commit_file(&clone, "README.md", "local\n", "Local edit");

        let repo = Repository::open(&clone).unwrap();
        let result = repo.pull_rebase().unwrap();
        assert!(!result.success());
        assert!(repo.is_rebasing());

        repo.rebase_abort().unwrap();
        assert!(!repo.is_rebasing());
    }

    #[test]
    fn test_conflicting_merge_then_abort() {
        let (_temp, origin, clone) = origin_and_clone();
        commit_file(&origin, "README.md", "upstream\n", "Upstream edit");
        commit_file(&clone, "README.md", "local\n", "Local edit");

        let repo = Repository::open(&clone).unwrap();
        assert!(repo.fetch().unwrap().success());
        assert!(!repo.merge("origin/main").unwrap().success());
        assert_eq!(repo.state(), RepositoryState::Merge);

        repo.merge_abort().unwrap();
        assert_eq!(repo.state(), RepositoryState::Clean);
        assert_eq!(fs::read_to_string(clone.join("README.md")).unwrap(), "local\n");

        // Nothing to abort the second time.
        repo.merge_abort().unwrap();
    }

    #[test]
    fn test_stash_roundtrip() {
        let (_temp, _origin, clone) = origin_and_clone();
        let repo = Repository::open(&clone).unwrap();
        assert_eq!(repo.find_stash("tether-sync").unwrap(), None);

        fs::write(clone.join("README.md"), "dirty").unwrap();
        let pushed = repo.stash_push("tether-sync 20260101T000000").unwrap();
        assert!(pushed.success(), "{}", pushed.output);

        let name = repo.find_stash("tether-sync").unwrap();
        assert_eq!(name.as_deref(), Some("stash@{0}"));

        assert!(repo.stash_pop("stash@{0}").unwrap().success());
        assert_eq!(repo.find_stash("tether-sync").unwrap(), None);
        assert_eq!(fs::read_to_string(clone.join("README.md")).unwrap(), "dirty");
    }

    #[test]
    fn test_find_tagged_stash_parsing() {
        let listing = "stash@{0}\tWIP on main: 1234567 work\n\
                       stash@{1}\tOn main: tether-sync 20260101T000000\n";
        assert_eq!(
            find_tagged_stash(listing, "tether-sync").as_deref(),
            Some("stash@{1}")
        );
        assert_eq!(find_tagged_stash(listing, "other"), None);
    }
}
