//! Repository registry and global settings, loaded from `cfg.json`.
//!
//! ```json
//! {
//!   "path": [
//!     { "names": ["api", "backend"], "path": "~/work/api", "groups": ["work"], "repo": true },
//!     { "names": "assets", "path": "~/work/assets", "repo": true, "type": "binary" }
//!   ],
//!   "isPullRebase": true,
//!   "isPushRebase": true
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Config file name inside the tether config directory.
pub const CONFIG_FILE: &str = "cfg.json";

/// Tether configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Registered directories, in declaration order.
    #[serde(default, rename = "path")]
    pub registrations: Vec<RepoRegistration>,

    /// Use `pull --rebase` for update instead of fetch and classify.
    #[serde(default = "default_true")]
    pub is_pull_rebase: bool,

    /// Offer to rebase a diverged branch before pushing.
    #[serde(default = "default_true")]
    pub is_push_rebase: bool,

    /// Ask before rebasing even when no conflict is predicted.
    #[serde(default)]
    pub confirm_rebase: bool,

    /// Remote used when the tracking branch does not name one.
    #[serde(default = "default_remote")]
    pub default_remote: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
            is_pull_rebase: true,
            is_push_rebase: true,
            confirm_rebase: false,
            default_remote: default_remote(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_remote() -> String {
    "origin".into()
}

impl Config {
    /// Default location: `$XDG_CONFIG_HOME/tether/cfg.json`.
    ///
    /// # Errors
    /// Returns [`Error::NoConfigDir`] if no home directory can be found.
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("tether")
            .get_config_file(CONFIG_FILE)
            .ok_or(Error::NoConfigDir)
    }

    /// Load config from a JSON file.
    ///
    /// A missing file yields the default (empty) configuration. Paths have
    /// `~` expanded and registrations without names get their directory name.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed, or registers one
    /// path twice.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?;

        for registration in &mut config.registrations {
            registration.normalize();
        }
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            count = config.registrations.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Reject registrations that share a path.
    ///
    /// # Errors
    /// Returns [`Error::DuplicatePath`] naming the first repeated path.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for registration in &self.registrations {
            if !seen.insert(registration.path.as_path()) {
                return Err(Error::DuplicatePath(registration.path.clone()));
            }
        }
        Ok(())
    }

    /// Registration for `path`, if any.
    #[must_use]
    pub fn find_by_path(&self, path: &Path) -> Option<&RepoRegistration> {
        find_by_path(&self.registrations, path)
    }
}

/// Registrations flagged as repositories, in declaration order.
pub fn repos(registrations: &[RepoRegistration]) -> impl Iterator<Item = &RepoRegistration> {
    registrations.iter().filter(|r| r.repo)
}

/// First registration carrying `alias` (case-insensitive).
#[must_use]
pub fn find_by_name<'a>(
    registrations: impl IntoIterator<Item = &'a RepoRegistration>,
    alias: &str,
) -> Option<&'a RepoRegistration> {
    registrations.into_iter().find(|r| r.matches(alias))
}

/// Registration whose path equals `path`.
#[must_use]
pub fn find_by_path<'a>(
    registrations: &'a [RepoRegistration],
    path: &Path,
) -> Option<&'a RepoRegistration> {
    registrations.iter().find(|r| r.path == path)
}

/// One registered directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoRegistration {
    /// Aliases, first one used for display.
    #[serde(default, deserialize_with = "one_or_many")]
    pub names: Vec<String>,

    /// Directory of the working copy.
    pub path: PathBuf,

    /// Free-form group labels.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Whether batch operations include this entry.
    #[serde(default)]
    pub repo: bool,

    /// Content kind; binary repositories are merged instead of rebased.
    #[serde(default, rename = "type")]
    pub kind: RepoKind,
}

impl RepoRegistration {
    /// Create a repository registration with a single alias.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            names: vec![name.into()],
            path: path.into(),
            groups: Vec::new(),
            repo: true,
            kind: RepoKind::Source,
        }
    }

    /// Mark the registration as holding binary content.
    #[must_use]
    pub fn binary(mut self) -> Self {
        self.kind = RepoKind::Binary;
        self
    }

    /// Name shown in reports.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.names.first().cloned().unwrap_or_else(|| dir_name(&self.path))
    }

    /// Whether `alias` is one of this entry's names (case-insensitive).
    #[must_use]
    pub fn matches(&self, alias: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(alias))
    }

    /// Whether the sync engine should use the stash-merge path.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self.kind, RepoKind::Binary)
    }

    fn normalize(&mut self) {
        self.path = expand_tilde(&self.path);
        if self.names.is_empty() {
            self.names.push(dir_name(&self.path));
        }
    }
}

/// Kind of content a registered repository holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RepoKind {
    /// Source code; rebased on divergence.
    #[default]
    Source,
    /// Binary assets; stashed and merged on divergence.
    Binary,
    /// Any other declared type, kept verbatim.
    Other(String),
}

impl From<String> for RepoKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "" | "source" => Self::Source,
            "binary" => Self::Binary,
            _ => Self::Other(value),
        }
    }
}

/// Accept `"name"` as well as `["a", "b"]`.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

/// Replace a leading `~` with the user's home directory.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
