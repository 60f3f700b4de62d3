//! Everything one sync operation needs, passed explicitly.

use std::path::PathBuf;

use tether_git::VcsBackend;

use crate::config::{Config, RepoRegistration};
use crate::interaction::{InteractionPort, Tone};

/// Global toggles that shape engine behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// `update` runs `pull --rebase` instead of fetch and classify.
    pub pull_rebase: bool,
    /// `push` offers a rebase when the branch has diverged.
    pub push_rebase: bool,
    /// Ask before a rebase predicted to be safe.
    pub confirm_rebase: bool,
    /// Remote used when the tracking branch names none.
    pub remote: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SyncSettings {
    fn from(config: &Config) -> Self {
        Self {
            pull_rebase: config.is_pull_rebase,
            push_rebase: config.is_push_rebase,
            confirm_rebase: config.confirm_rebase,
            remote: config.default_remote.clone(),
        }
    }
}

/// A working copy selected for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    /// Name used in reports.
    pub name: String,
    /// Working copy directory.
    pub path: PathBuf,
    /// Use the stash-merge path instead of rebasing.
    pub binary: bool,
}

impl RepoTarget {
    /// Ad hoc target for a directory that may not be registered.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            name,
            path,
            binary: false,
        }
    }
}

impl From<&RepoRegistration> for RepoTarget {
    fn from(registration: &RepoRegistration) -> Self {
        Self {
            name: registration.display_name(),
            path: registration.path.clone(),
            binary: registration.is_binary(),
        }
    }
}

/// Backend, interaction port and settings for one repository.
pub struct SyncContext<'a, B: VcsBackend, I: InteractionPort + ?Sized> {
    pub backend: &'a B,
    pub interaction: &'a I,
    pub settings: &'a SyncSettings,
    pub target: &'a RepoTarget,
}

impl<'a, B: VcsBackend, I: InteractionPort + ?Sized> SyncContext<'a, B, I> {
    /// Bundle the collaborators for one repository.
    pub const fn new(
        backend: &'a B,
        interaction: &'a I,
        settings: &'a SyncSettings,
        target: &'a RepoTarget,
    ) -> Self {
        Self {
            backend,
            interaction,
            settings,
            target,
        }
    }

    pub(crate) fn info(&self, message: &str) {
        self.interaction.report(Tone::Info, &self.target.name, message);
    }

    pub(crate) fn problem(&self, message: &str) {
        self.interaction
            .report(Tone::Problem, &self.target.name, message);
    }
}
