//! Run one action over a set of registered repositories.

use std::path::{Path, PathBuf};

use tether_git::VcsBackend;

use crate::config::{RepoRegistration, expand_tilde, find_by_name, find_by_path, repos};
use crate::context::{RepoTarget, SyncContext, SyncSettings};
use crate::engine::run_action;
use crate::error::{Error, Result};
use crate::interaction::{InteractionPort, Tone};
use crate::outcome::{RepoReport, RunReport, SyncAction, SyncFailure, SyncOutcome};

/// Work out which repositories `target` refers to.
///
/// - `None`: every `repo`-tagged registration, in file order.
/// - `.` or anything path-like: that directory, registered or not.
/// - otherwise: the first `repo`-tagged registration with that alias.
///
/// # Errors
/// Returns [`Error::UnknownTarget`] for an alias nobody carries.
pub fn resolve_targets(
    target: Option<&str>,
    registrations: &[RepoRegistration],
) -> Result<Vec<RepoTarget>> {
    let Some(target) = target else {
        return Ok(repos(registrations).map(RepoTarget::from).collect());
    };

    if let Some(path) = as_path(target)? {
        let resolved = find_by_path(registrations, &path)
            .map_or_else(|| RepoTarget::from_path(&path), RepoTarget::from);
        return Ok(vec![resolved]);
    }

    find_by_name(repos(registrations), target)
        .map(|r| vec![RepoTarget::from(r)])
        .ok_or_else(|| Error::UnknownTarget(target.to_string()))
}

fn as_path(target: &str) -> Result<Option<PathBuf>> {
    if target == "." {
        return Ok(Some(std::env::current_dir()?));
    }
    let path_like = target.starts_with('.')
        || target.starts_with('~')
        || target.contains(std::path::MAIN_SEPARATOR);
    if !path_like {
        return Ok(None);
    }

    let path = expand_tilde(Path::new(target));
    if path.is_absolute() {
        Ok(Some(path))
    } else {
        Ok(Some(std::env::current_dir()?.join(path)))
    }
}

/// Run `action` on every repository `target` selects, one after another.
///
/// Failures are recorded per repository and never stop the loop, except a
/// pull that fails outright during [`SyncAction::Update`], which halts the
/// batch. A pull that stops on a conflict is aborted and the batch goes on.
/// `open` builds the backend for each existing directory.
///
/// # Errors
/// Returns error only if `target` cannot be resolved.
pub fn run_over_set<B, I, F>(
    action: SyncAction,
    target: Option<&str>,
    registrations: &[RepoRegistration],
    settings: &SyncSettings,
    interaction: &I,
    mut open: F,
) -> Result<RunReport>
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
    F: FnMut(&Path) -> tether_git::Result<B>,
{
    let targets = resolve_targets(target, registrations)?;
    tracing::debug!(%action, count = targets.len(), "running over set");

    let mut report = RunReport::default();
    for repo in &targets {
        let outcome = run_one(action, repo, settings, interaction, &mut open);
        let halt = action == SyncAction::Update
            && matches!(outcome, SyncOutcome::Failed(SyncFailure::PullFailed(_)));

        report.entries.push(RepoReport {
            name: repo.name.clone(),
            path: repo.path.clone(),
            outcome,
        });

        if halt {
            interaction.report(Tone::Problem, &repo.name, "pull failed - stopping update");
            report.halted = true;
            break;
        }
    }
    Ok(report)
}

fn run_one<B, I, F>(
    action: SyncAction,
    repo: &RepoTarget,
    settings: &SyncSettings,
    interaction: &I,
    open: &mut F,
) -> SyncOutcome
where
    B: VcsBackend,
    I: InteractionPort + ?Sized,
    F: FnMut(&Path) -> tether_git::Result<B>,
{
    if !repo.path.is_dir() {
        interaction.report(
            Tone::Problem,
            &repo.name,
            &format!("{} doesn't exist", repo.path.display()),
        );
        return SyncOutcome::Failed(SyncFailure::NotFound(repo.path.clone()));
    }

    let backend = match open(&repo.path) {
        Ok(backend) => backend,
        Err(e) => {
            interaction.report(Tone::Problem, &repo.name, &e.to_string());
            return SyncOutcome::Failed(SyncFailure::Backend(e.to_string()));
        }
    };

    let ctx = SyncContext::new(&backend, interaction, settings, repo);
    run_action(&ctx, action).unwrap_or_else(|e| {
        tracing::debug!(repo = %repo.name, error = %e, "action failed");
        interaction.report(Tone::Problem, &repo.name, &e.to_string());
        SyncOutcome::Failed(SyncFailure::Backend(e.to_string()))
    })
}
