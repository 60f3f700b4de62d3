//! `tether push` command - Push the current branch after syncing with upstream.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tether_core::{PushOutcome, RepoTarget, SyncContext, SyncSettings};
use tether_git::{Repository, VcsBackend};

use super::utils;
use crate::output;
use crate::prompt::ConsolePrompt;

/// Run the push command.
pub fn run(explicit: Option<&Path>) -> Result<()> {
    let (config, _) = utils::load_config(explicit)?;
    let repo = Repository::open_current().context("Not inside a git repository")?;

    let target = config
        .find_by_path(repo.workdir())
        .map_or_else(|| RepoTarget::from_path(repo.workdir()), RepoTarget::from);
    let settings = SyncSettings::from(&config);
    let prompt = ConsolePrompt::new();

    let spinner = output::spinner("Fetching...");
    let fetched = repo.fetch()?;
    spinner.finish_and_clear();
    if !fetched.success() {
        output::warn("Fetch failed - comparing against the last fetched state");
        output::detail(&fetched.output);
    }

    let ctx = SyncContext::new(&repo, &prompt, &settings, &target);
    match tether_core::push(&ctx)? {
        PushOutcome::Pushed {
            remote,
            destination,
            forced,
        } => {
            let how = if forced { " (forced)" } else { "" };
            output::success(&format!("Pushed to {remote}/{destination}{how}"));
            Ok(())
        }
        PushOutcome::Cancelled => bail!("Push is canceled"),
        PushOutcome::Skipped => bail!("Push skipped - branch left unrebased"),
        PushOutcome::Rejected => bail!("Push was rejected by the remote"),
    }
}
