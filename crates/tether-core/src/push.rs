//! Push the current branch, rebasing first when it has diverged.

use tether_git::VcsBackend;

use crate::branch::BranchRef;
use crate::context::SyncContext;
use crate::divergence::{Divergence, classify};
use crate::engine::{file_list, report_working_tree};
use crate::error::{Error, Result};
use crate::interaction::{InteractionPort, RebaseChoice, ask_rebase_or_skip};
use crate::outcome::PushOutcome;
use crate::safety::{RebaseSafety, check_rebase_safe};

/// Push the checked-out branch to a destination the person confirms.
///
/// Nothing is pushed while the branch is diverged with predicted conflicts
/// unless the person chose to rebase and the rebase succeeded. Declining
/// the rebase of a conflict-free divergence pushes as is.
///
/// # Errors
/// - [`Error::NoTrackingBranch`] when the branch has no upstream.
/// - [`Error::NothingToPush`] when local has no commits upstream lacks.
/// - [`Error::RebaseConflict`] when the pre-push rebase failed; it has been
///   aborted.
pub fn push<B, I>(ctx: &SyncContext<'_, B, I>) -> Result<PushOutcome>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    report_working_tree(ctx)?;

    let branch = ctx.backend.current_branch()?;
    let Some(tracking) = ctx.backend.tracking_branch()? else {
        ctx.problem(&format!("{branch} has no tracking branch - push it manually"));
        return Err(Error::NoTrackingBranch(branch));
    };
    ctx.info(&format!("local {branch}, remote {tracking}"));

    let mut local = BranchRef::resolve(ctx.backend, &branch)?;
    let upstream = BranchRef::resolve(ctx.backend, &tracking)?;
    show_unpushed(ctx, &local, &upstream)?;

    if ctx.settings.push_rebase && classify(&local, &upstream, ctx.backend)? == Divergence::Diverged
    {
        let wants_rebase = match check_rebase_safe(&local, &upstream, ctx.backend)? {
            RebaseSafety::Safe => ctx.interaction.confirm(
                &format!("{} has new commits. Rebase {} onto it?", upstream.name, local.name),
                true,
            ),
            RebaseSafety::Unsafe(files) => {
                ctx.problem(&format!(
                    "{} and {} both changed {} file(s)",
                    local.name,
                    upstream.name,
                    files.len()
                ));
                ctx.interaction.show(&file_list(&files));
                let prompt = format!(
                    "{} may conflict with {}. Rebase or skip?",
                    local.name, upstream.name
                );
                match ask_rebase_or_skip(ctx.interaction, &prompt) {
                    RebaseChoice::Rebase => true,
                    RebaseChoice::Skip | RebaseChoice::Undecided => {
                        ctx.info("push skipped");
                        return Ok(PushOutcome::Skipped);
                    }
                }
            }
        };

        if wants_rebase {
            rebase_or_abort(ctx, &upstream)?;
            local = BranchRef::resolve(ctx.backend, &branch)?;
            show_unpushed(ctx, &local, &upstream)?;
        }
    }

    let (remote, suggestion) = split_tracking(&tracking, &ctx.settings.remote);
    let destination = ctx
        .interaction
        .prompt_text("Remote branch to push to", Some(suggestion))
        .trim()
        .to_string();
    if destination.is_empty() {
        ctx.info("push cancelled");
        return Ok(PushOutcome::Cancelled);
    }

    let pushed = ctx.backend.push(remote, &branch, &destination, false)?;
    ctx.interaction.show(&pushed.output);
    if pushed.success() {
        return Ok(PushOutcome::Pushed {
            remote: remote.to_string(),
            destination,
            forced: false,
        });
    }

    ctx.problem(&format!("push to {remote}/{destination} was rejected"));
    if !ctx.interaction.confirm("Push failed. Push with force?", false) {
        return Ok(PushOutcome::Rejected);
    }

    let forced = ctx.backend.push(remote, &branch, &destination, true)?;
    ctx.interaction.show(&forced.output);
    if forced.success() {
        Ok(PushOutcome::Pushed {
            remote: remote.to_string(),
            destination,
            forced: true,
        })
    } else {
        ctx.problem("force push failed");
        Ok(PushOutcome::Rejected)
    }
}

fn show_unpushed<B, I>(
    ctx: &SyncContext<'_, B, I>,
    local: &BranchRef,
    upstream: &BranchRef,
) -> Result<()>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let gap = ctx
        .backend
        .commits_ahead_count(&local.revision, &upstream.revision)?;
    if gap == 0 {
        ctx.problem("there is no commit to push");
        return Err(Error::NothingToPush);
    }
    ctx.info(&format!("{gap} commit(s) to push"));
    ctx.interaction
        .show(&ctx.backend.commit_log(&upstream.revision, &local.revision)?);
    Ok(())
}

fn rebase_or_abort<B, I>(ctx: &SyncContext<'_, B, I>, upstream: &BranchRef) -> Result<()>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
{
    let result = ctx.backend.rebase(&upstream.name)?;
    if result.success() {
        ctx.info(&format!("rebased onto {}", upstream.name));
        return Ok(());
    }

    ctx.backend.rebase_abort()?;
    ctx.problem(&format!("rebase onto {} failed and was aborted", upstream.name));
    Err(Error::RebaseConflict {
        onto: upstream.name.clone(),
        output: result.output,
    })
}

/// `origin/feature/x` -> (`origin`, `feature/x`).
fn split_tracking<'a>(tracking: &'a str, default_remote: &'a str) -> (&'a str, &'a str) {
    tracking
        .split_once('/')
        .unwrap_or((default_remote, tracking))
}
