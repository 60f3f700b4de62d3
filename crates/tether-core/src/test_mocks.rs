//! Mock implementations for testing the engine.
//!
//! `MockVcs` implements `VcsBackend` over in-memory tables and records every
//! mutation in a call log so tests can assert ordering. `ScriptedInteraction`
//! replays queued answers and records what it was asked.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use tether_git::{CommandOutput, Error as GitError, Result as GitResult, StatusEntry, VcsBackend};

use crate::interaction::{InteractionPort, Tone};

/// Mock implementation of `VcsBackend` for testing.
pub struct MockVcs {
    pub workdir: PathBuf,
    pub current_branch: RefCell<String>,
    pub tracking: RefCell<Option<String>>,
    pub revisions: RefCell<HashMap<String, String>>,
    pub ancestor: RefCell<Option<String>>,
    pub ahead: RefCell<HashMap<(String, String), usize>>,
    pub changes: RefCell<HashMap<(String, String), BTreeSet<String>>>,
    pub status: RefCell<Vec<StatusEntry>>,
    pub stash: RefCell<Option<(String, String)>>,
    pub results: RefCell<HashMap<&'static str, CommandOutput>>,
    pub rebasing: RefCell<bool>,
    pub merging: RefCell<bool>,
    pub pull_conflicts: RefCell<bool>,
    pub rebased_revision: RefCell<Option<String>>,
    pub calls: RefCell<Vec<String>>,
}

impl Default for MockVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVcs {
    pub fn new() -> Self {
        Self {
            workdir: PathBuf::from("/mock/repo"),
            current_branch: RefCell::new("main".to_string()),
            tracking: RefCell::new(None),
            revisions: RefCell::new(HashMap::new()),
            ancestor: RefCell::new(None),
            ahead: RefCell::new(HashMap::new()),
            changes: RefCell::new(HashMap::new()),
            status: RefCell::new(Vec::new()),
            stash: RefCell::new(None),
            results: RefCell::new(HashMap::new()),
            rebasing: RefCell::new(false),
            merging: RefCell::new(false),
            pull_conflicts: RefCell::new(false),
            rebased_revision: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// `main` at `local` tracking `origin/main` at `upstream`.
    pub fn tracking_main(local: &str, upstream: &str) -> Self {
        Self::new()
            .with_revision("main", local)
            .with_tracking("origin/main", upstream)
    }

    pub fn with_revision(self, name: &str, revision: &str) -> Self {
        self.revisions
            .borrow_mut()
            .insert(name.to_string(), revision.to_string());
        self
    }

    pub fn with_tracking(self, name: &str, revision: &str) -> Self {
        *self.tracking.borrow_mut() = Some(name.to_string());
        self.with_revision(name, revision)
    }

    pub fn with_ancestor(self, revision: &str) -> Self {
        *self.ancestor.borrow_mut() = Some(revision.to_string());
        self
    }

    pub fn with_ahead(self, new: &str, old: &str, count: usize) -> Self {
        self.ahead
            .borrow_mut()
            .insert((new.to_string(), old.to_string()), count);
        self
    }

    pub fn with_changes(self, from: &str, to: &str, files: &[&str]) -> Self {
        self.changes.borrow_mut().insert(
            (from.to_string(), to.to_string()),
            files.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn with_status(self, entry: StatusEntry) -> Self {
        self.status.borrow_mut().push(entry);
        self
    }

    pub fn with_stash(self, name: &str, message: &str) -> Self {
        *self.stash.borrow_mut() = Some((name.to_string(), message.to_string()));
        self
    }

    /// Override the result of one operation (`fetch`, `pull`, `push`,
    /// `push --force`, `rebase`, `merge`, `stash push`, `stash pop`).
    pub fn with_result(self, operation: &'static str, code: i32, output: &str) -> Self {
        self.results
            .borrow_mut()
            .insert(operation, CommandOutput::new(output, code));
        self
    }

    /// Make `pull --rebase` stop on a conflict, leaving the rebase open.
    pub fn with_pull_conflict(self, output: &str) -> Self {
        *self.pull_conflicts.borrow_mut() = true;
        self.with_result("pull", 1, output)
    }

    pub fn with_rebased_revision(self, revision: &str) -> Self {
        *self.rebased_revision.borrow_mut() = Some(revision.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether any recorded call starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn result(&self, operation: &str) -> CommandOutput {
        self.results
            .borrow()
            .get(operation)
            .cloned()
            .unwrap_or_else(CommandOutput::ok)
    }
}

impl VcsBackend for MockVcs {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn current_branch(&self) -> GitResult<String> {
        Ok(self.current_branch.borrow().clone())
    }

    fn tracking_branch(&self) -> GitResult<Option<String>> {
        Ok(self.tracking.borrow().clone())
    }

    fn is_rebasing(&self) -> bool {
        *self.rebasing.borrow()
    }

    fn resolve_revision(&self, reference: &str) -> GitResult<String> {
        self.revisions
            .borrow()
            .get(reference)
            .cloned()
            .ok_or_else(|| GitError::RefNotFound(reference.to_string()))
    }

    fn common_ancestor(&self, one: &str, two: &str) -> GitResult<String> {
        if one == two {
            return Ok(one.to_string());
        }
        self.ancestor
            .borrow()
            .clone()
            .ok_or_else(|| GitError::RefNotFound(format!("merge-base {one} {two}")))
    }

    fn commits_ahead_count(&self, new: &str, old: &str) -> GitResult<usize> {
        Ok(self
            .ahead
            .borrow()
            .get(&(new.to_string(), old.to_string()))
            .copied()
            .unwrap_or(0))
    }

    fn commit_log(&self, old: &str, new: &str) -> GitResult<String> {
        Ok(format!("* log {old}..{new}"))
    }

    fn changed_files(&self, from: &str, to: &str) -> GitResult<BTreeSet<String>> {
        Ok(self
            .changes
            .borrow()
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn working_tree_status(&self) -> GitResult<Vec<StatusEntry>> {
        Ok(self.status.borrow().clone())
    }

    fn fetch(&self) -> GitResult<CommandOutput> {
        self.record("fetch".into());
        Ok(self.result("fetch"))
    }

    fn pull_rebase(&self) -> GitResult<CommandOutput> {
        self.record("pull --rebase".into());
        let result = self.result("pull");
        if !result.success() && *self.pull_conflicts.borrow() {
            *self.rebasing.borrow_mut() = true;
        }
        Ok(result)
    }

    fn push(
        &self,
        remote: &str,
        local: &str,
        remote_branch: &str,
        force: bool,
    ) -> GitResult<CommandOutput> {
        let mut call = format!("push {remote} {local}:{remote_branch}");
        if force {
            call.push_str(" --force");
        }
        self.record(call);
        Ok(self.result(if force { "push --force" } else { "push" }))
    }

    fn rebase(&self, onto: &str) -> GitResult<CommandOutput> {
        self.record(format!("rebase {onto}"));
        let result = self.result("rebase");
        if result.success() {
            if let Some(revision) = self.rebased_revision.borrow().clone() {
                let branch = self.current_branch.borrow().clone();
                self.revisions.borrow_mut().insert(branch, revision);
            }
        } else {
            *self.rebasing.borrow_mut() = true;
        }
        Ok(result)
    }

    fn rebase_abort(&self) -> GitResult<()> {
        self.record("rebase --abort".into());
        *self.rebasing.borrow_mut() = false;
        Ok(())
    }

    fn merge(&self, reference: &str) -> GitResult<CommandOutput> {
        self.record(format!("merge {reference}"));
        let result = self.result("merge");
        if !result.success() {
            *self.merging.borrow_mut() = true;
        }
        Ok(result)
    }

    fn merge_abort(&self) -> GitResult<()> {
        self.record("merge --abort".into());
        *self.merging.borrow_mut() = false;
        Ok(())
    }

    fn find_stash(&self, tag: &str) -> GitResult<Option<String>> {
        Ok(self
            .stash
            .borrow()
            .as_ref()
            .filter(|(_, message)| message.starts_with(tag))
            .map(|(name, _)| name.clone()))
    }

    fn stash_push(&self, message: &str) -> GitResult<CommandOutput> {
        self.record(format!("stash push {message}"));
        let result = self.result("stash push");
        if result.success() {
            *self.stash.borrow_mut() = Some(("stash@{0}".to_string(), message.to_string()));
        }
        Ok(result)
    }

    fn stash_pop(&self, name: &str) -> GitResult<CommandOutput> {
        self.record(format!("stash pop {name}"));
        let result = self.result("stash pop");
        if result.success() {
            *self.stash.borrow_mut() = None;
        }
        Ok(result)
    }
}

/// Replays queued answers; unanswered prompts get the safe default.
#[derive(Default)]
pub struct ScriptedInteraction {
    pub confirms: RefCell<VecDeque<bool>>,
    pub choices: RefCell<VecDeque<Option<usize>>>,
    pub texts: RefCell<VecDeque<String>>,
    pub prompts: RefCell<Vec<String>>,
    pub reports: RefCell<Vec<(Tone, String, String)>>,
    pub shown: RefCell<Vec<String>>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirm(self, answer: bool) -> Self {
        self.confirms.borrow_mut().push_back(answer);
        self
    }

    pub fn with_choice(self, answer: Option<usize>) -> Self {
        self.choices.borrow_mut().push_back(answer);
        self
    }

    pub fn with_text(self, answer: &str) -> Self {
        self.texts.borrow_mut().push_back(answer.to_string());
        self
    }

    /// Whether any report with `tone` contains `needle`.
    pub fn reported(&self, tone: Tone, needle: &str) -> bool {
        self.reports
            .borrow()
            .iter()
            .any(|(t, _, message)| *t == tone && message.contains(needle))
    }

    pub fn was_asked(&self, needle: &str) -> bool {
        self.prompts.borrow().iter().any(|p| p.contains(needle))
    }
}

impl InteractionPort for ScriptedInteraction {
    fn confirm(&self, prompt: &str, default: bool) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirms.borrow_mut().pop_front().unwrap_or(default)
    }

    fn choose(&self, prompt: &str, _options: &[&str]) -> Option<usize> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.choices.borrow_mut().pop_front().flatten()
    }

    fn prompt_text(&self, prompt: &str, suggestion: Option<&str>) -> String {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.texts
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| suggestion.unwrap_or_default().to_string())
    }

    fn report(&self, tone: Tone, name: &str, message: &str) {
        self.reports
            .borrow_mut()
            .push((tone, name.to_string(), message.to_string()));
    }

    fn show(&self, text: &str) {
        self.shown.borrow_mut().push(text.to_string());
    }
}
