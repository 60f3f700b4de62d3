//! Per-repository sync actions.
//!
//! Each action inspects the repository (leftover stash, tracking branch,
//! divergence) before touching it, and turns every expected failure into a
//! [`SyncOutcome`]. `Err` is reserved for the backend being unable to answer
//! at all; the runner converts those too.
//!
//! A rebase that exits non-zero is always aborted before returning.

use std::collections::BTreeSet;

use chrono::Local;
use tether_git::{StatusTag, VcsBackend};

use crate::branch::BranchRef;
use crate::context::SyncContext;
use crate::divergence::{Divergence, classify};
use crate::error::Result;
use crate::interaction::{InteractionPort, RebaseChoice, ask_rebase_or_skip};
use crate::outcome::{SyncAction, SyncFailure, SyncOutcome};
use crate::safety::{RebaseSafety, check_rebase_safe};

/// Prefix of stash messages created by the binary merge path.
pub const STASH_TAG: &str = "tether-sync";

/// Whether the engine may ask before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Never prompt; unsafe divergence is reported.
    Batch,
    /// Ask rebase-or-skip on unsafe divergence.
    Interactive,
}

/// Branch state captured once per pass.
struct Snapshot {
    local: BranchRef,
    upstream: BranchRef,
    divergence: Divergence,
}

enum Inspection {
    Ready(Snapshot),
    Blocked(SyncOutcome),
}

/// Run `action` against the repository in `ctx`.
///
/// # Errors
/// Returns error only if the backend fails outright.
pub fn run_action<B, I>(ctx: &SyncContext<'_, B, I>, action: SyncAction) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    tracing::debug!(repo = %ctx.target.name, %action, "running action");
    let outcome = match action {
        SyncAction::Status => status(ctx),
        SyncAction::Fetch => fetch(ctx),
        SyncAction::Merge => merge_safe(ctx),
        SyncAction::Update => update(ctx),
    }?;
    tracing::debug!(repo = %ctx.target.name, %outcome, "action finished");
    Ok(outcome)
}

/// Report how the current branch relates to its upstream. Read-only.
///
/// # Errors
/// Returns error if the backend fails outright.
pub fn status<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    match inspect(ctx)? {
        Inspection::Ready(snapshot) => describe(ctx, &snapshot),
        Inspection::Blocked(outcome) => Ok(outcome),
    }
}

/// Fetch, then report status.
///
/// # Errors
/// Returns error if the backend fails outright.
pub fn fetch<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let fetched = ctx.backend.fetch()?;
    if !fetched.success() {
        ctx.problem("fetch failed");
        ctx.interaction.show(&fetched.output);
        return Ok(SyncOutcome::Failed(SyncFailure::FetchFailed(fetched.output)));
    }
    status(ctx)
}

/// Rebase a diverged branch when no conflict is predicted; never prompts.
///
/// # Errors
/// Returns error if the backend fails outright.
pub fn merge_safe<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    sync(ctx, Mode::Batch)
}

/// Bring the branch up to date with its upstream, then report.
///
/// With `pull_rebase` this is `pull --rebase`; otherwise a fetch followed by
/// the interactive rebase decision. A working tree with uncommitted changes
/// is only fetched and reported. A pull or fetch that fails outright yields
/// [`SyncFailure::PullFailed`]; a pull that stops on a conflict is aborted
/// and yields [`SyncFailure::RebaseConflict`].
///
/// # Errors
/// Returns error if the backend fails outright.
pub fn update<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    // Binary targets stash their changes before merging.
    let dirty = !ctx.target.binary && has_local_changes(ctx)?;
    if ctx.settings.pull_rebase && !ctx.target.binary && !dirty {
        return pull_then_status(ctx);
    }

    if dirty {
        ctx.info("uncommitted changes - fetching without updating");
    }
    let fetched = ctx.backend.fetch()?;
    if !fetched.success() {
        ctx.problem("fetch failed");
        ctx.interaction.show(&fetched.output);
        return Ok(SyncOutcome::Failed(SyncFailure::PullFailed(fetched.output)));
    }
    if dirty {
        return status(ctx);
    }
    sync(ctx, Mode::Interactive)
}

/// Staged or modified tracked files. Untracked files never block a pull.
fn has_local_changes<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<bool>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    Ok(ctx
        .backend
        .working_tree_status()?
        .iter()
        .any(|entry| entry.tag != StatusTag::Untracked))
}

fn inspect<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<Inspection>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    if let Some(stash) = ctx.backend.find_stash(STASH_TAG)? {
        ctx.problem(&format!(
            "unresolved stash {stash} left by an earlier sync - pop or drop it first"
        ));
        return Ok(Inspection::Blocked(SyncOutcome::NeedsManualResolution(
            format!("unresolved stash {stash}"),
        )));
    }

    let branch = ctx.backend.current_branch()?;
    let Some(tracking) = ctx.backend.tracking_branch()? else {
        ctx.problem(&format!("{branch} has no tracking branch"));
        return Ok(Inspection::Blocked(SyncOutcome::NeedsManualResolution(
            "no tracking branch".into(),
        )));
    };

    let local = BranchRef::resolve(ctx.backend, &branch)?;
    let upstream = BranchRef::resolve(ctx.backend, &tracking)?;
    let divergence = classify(&local, &upstream, ctx.backend)?;

    Ok(Inspection::Ready(Snapshot {
        local,
        upstream,
        divergence,
    }))
}

fn describe<B, I>(ctx: &SyncContext<'_, B, I>, snapshot: &Snapshot) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let Snapshot {
        local, upstream, ..
    } = snapshot;

    let outcome = match snapshot.divergence {
        Divergence::Same => {
            ctx.info(&format!("{} is same as {}", local.name, upstream.name));
            SyncOutcome::UpToDate
        }
        Divergence::Ahead(count) => {
            ctx.problem(&format!(
                "{} is ahead of {} by {count} commit(s)",
                local.name, upstream.name
            ));
            ctx.interaction
                .show(&ctx.backend.commit_log(&upstream.revision, &local.revision)?);
            SyncOutcome::UpToDate
        }
        Divergence::Diverged => {
            let safety = check_rebase_safe(local, upstream, ctx.backend)?;
            match &safety {
                RebaseSafety::Safe => ctx.info(&format!(
                    "{} can be rebased onto {}",
                    local.name, upstream.name
                )),
                RebaseSafety::Unsafe(files) => {
                    ctx.problem(&format!(
                        "{} is NOT able to fast-forward onto {}",
                        local.name, upstream.name
                    ));
                    ctx.interaction.show(&file_list(files));
                }
            }
            SyncOutcome::Diverged(safety)
        }
    };

    report_working_tree(ctx)?;
    Ok(outcome)
}

pub(crate) fn report_working_tree<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<()>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let entries = ctx.backend.working_tree_status()?;
    if entries.is_empty() {
        return Ok(());
    }
    ctx.problem(&format!("{} uncommitted change(s)", entries.len()));
    let listing: Vec<String> = entries.iter().map(ToString::to_string).collect();
    ctx.interaction.show(&listing.join("\n"));
    Ok(())
}

fn sync<B, I>(ctx: &SyncContext<'_, B, I>, mode: Mode) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let snapshot = match inspect(ctx)? {
        Inspection::Ready(snapshot) => snapshot,
        Inspection::Blocked(outcome) => return Ok(outcome),
    };
    if snapshot.divergence != Divergence::Diverged {
        return describe(ctx, &snapshot);
    }
    if ctx.target.binary {
        return merge_binary(ctx, &snapshot.upstream);
    }

    let Snapshot {
        local, upstream, ..
    } = &snapshot;

    match check_rebase_safe(local, upstream, ctx.backend)? {
        RebaseSafety::Safe => {
            if mode == Mode::Interactive
                && ctx.settings.confirm_rebase
                && !ctx.interaction.confirm(
                    &format!("Rebase {} onto {}?", local.name, upstream.name),
                    true,
                )
            {
                ctx.info("rebase skipped");
                return Ok(SyncOutcome::Skipped);
            }
            rebase_onto(ctx, &snapshot)
        }
        RebaseSafety::Unsafe(files) => {
            ctx.problem(&format!(
                "{} and {} both changed {} file(s)",
                local.name,
                upstream.name,
                files.len()
            ));
            ctx.interaction.show(&file_list(&files));
            let reason = format!(
                "conflicting files: {}",
                files.iter().cloned().collect::<Vec<_>>().join(", ")
            );

            if mode == Mode::Batch {
                return Ok(SyncOutcome::NeedsManualResolution(reason));
            }
            let prompt = format!(
                "{} may conflict with {}. Rebase or skip?",
                local.name, upstream.name
            );
            match ask_rebase_or_skip(ctx.interaction, &prompt) {
                RebaseChoice::Rebase => rebase_onto(ctx, &snapshot),
                RebaseChoice::Skip => {
                    ctx.info("rebase skipped");
                    Ok(SyncOutcome::Skipped)
                }
                RebaseChoice::Undecided => Ok(SyncOutcome::NeedsManualResolution(reason)),
            }
        }
    }
}

fn rebase_onto<B, I>(ctx: &SyncContext<'_, B, I>, snapshot: &Snapshot) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let Snapshot {
        local, upstream, ..
    } = snapshot;
    let fast_forward =
        ctx.backend.common_ancestor(&local.revision, &upstream.revision)? == local.revision;

    ctx.info(&format!("rebasing {} onto {}", local.name, upstream.name));
    let result = ctx.backend.rebase(&upstream.name)?;
    if !result.success() {
        ctx.backend.rebase_abort()?;
        ctx.problem(&format!(
            "rebase onto {} failed and was aborted",
            upstream.name
        ));
        ctx.interaction.show(&result.output);
        return Ok(SyncOutcome::Failed(SyncFailure::RebaseConflict {
            onto: upstream.name.clone(),
        }));
    }

    let outcome = if fast_forward {
        SyncOutcome::FastForwarded
    } else {
        SyncOutcome::Rebased
    };
    ctx.info(&outcome.to_string());
    Ok(outcome)
}

fn pull_then_status<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let Snapshot {
        local: before,
        upstream,
        ..
    } = match inspect(ctx)? {
        Inspection::Ready(snapshot) => snapshot,
        Inspection::Blocked(outcome) => return Ok(outcome),
    };

    let pulled = ctx.backend.pull_rebase()?;
    if !pulled.success() {
        if ctx.backend.is_rebasing() {
            ctx.backend.rebase_abort()?;
            ctx.problem(&format!(
                "pull --rebase onto {} conflicted and was aborted",
                upstream.name
            ));
            ctx.interaction.show(&pulled.output);
            return Ok(SyncOutcome::Failed(SyncFailure::RebaseConflict {
                onto: upstream.name,
            }));
        }
        ctx.problem("pull failed");
        ctx.interaction.show(&pulled.output);
        return Ok(SyncOutcome::Failed(SyncFailure::PullFailed(pulled.output)));
    }

    let after = BranchRef::resolve(ctx.backend, &before.name)?;
    let moved = if after.same_commit(&before) {
        None
    } else if ctx.backend.common_ancestor(&before.revision, &after.revision)? == before.revision {
        Some(SyncOutcome::FastForwarded)
    } else {
        Some(SyncOutcome::Rebased)
    };
    if moved.is_some() {
        ctx.info(&format!(
            "{} updated {} -> {}",
            before.name,
            before.short(),
            after.short()
        ));
    }

    let report = status(ctx)?;
    Ok(moved.unwrap_or(report))
}

fn merge_binary<B, I>(ctx: &SyncContext<'_, B, I>, upstream: &BranchRef) -> Result<SyncOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let mut stash = None;
    if !ctx.backend.working_tree_status()?.is_empty() {
        let message = format!("{STASH_TAG} {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        let pushed = ctx.backend.stash_push(&message)?;
        if !pushed.success() {
            ctx.problem("could not stash local changes");
            ctx.interaction.show(&pushed.output);
            return Ok(SyncOutcome::NeedsManualResolution("stash failed".into()));
        }
        stash = ctx.backend.find_stash(STASH_TAG)?;
    }

    ctx.info(&format!("merging {}", upstream.name));
    let merged = ctx.backend.merge(&upstream.name)?;
    if !merged.success() {
        ctx.backend.merge_abort()?;
        ctx.interaction.show(&merged.output);
        if let Some(name) = stash {
            ctx.problem(&format!("merge failed, local changes kept in {name}"));
            return Ok(SyncOutcome::NeedsManualResolution(
                "merge failed, stash kept".into(),
            ));
        }
        ctx.problem("merge failed");
        return Ok(SyncOutcome::Failed(SyncFailure::MergeFailed(merged.output)));
    }

    if let Some(name) = stash {
        let popped = ctx.backend.stash_pop(&name)?;
        if !popped.success() {
            ctx.problem(&format!("could not restore local changes from {name}"));
            ctx.interaction.show(&popped.output);
            return Ok(SyncOutcome::NeedsManualResolution("stash pop failed".into()));
        }
    }

    ctx.info(&format!("merged {}", upstream.name));
    Ok(SyncOutcome::Merged)
}

pub(crate) fn file_list(files: &BTreeSet<String>) -> String {
    files
        .iter()
        .map(|f| format!("  {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}
