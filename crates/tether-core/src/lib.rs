//! Core library for Tether.
//!
//! Given a registry of local working copies, decides for each one whether
//! it is up to date, ahead, safely rebaseable or in need of a human, and
//! carries out fetch, pull, rebase, merge and push accordingly.
//!
//! All git access goes through [`tether_git::VcsBackend`] and all prompts
//! and messages through [`InteractionPort`], both passed in a
//! [`SyncContext`].

pub mod branch;
pub mod config;
pub mod context;
pub mod divergence;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod outcome;
pub mod push;
pub mod runner;
pub mod safety;

#[cfg(test)]
mod test_mocks;

pub use branch::BranchRef;
pub use config::{Config, RepoKind, RepoRegistration};
pub use context::{RepoTarget, SyncContext, SyncSettings};
pub use divergence::{Divergence, classify};
pub use engine::{STASH_TAG, run_action};
pub use error::{Error, Result};
pub use interaction::{InteractionPort, REBASE, SKIP, Tone};
pub use outcome::{PushOutcome, RepoReport, RunReport, SyncAction, SyncFailure, SyncOutcome};
pub use push::push;
pub use runner::{resolve_targets, run_over_set};
pub use safety::{RebaseSafety, check_rebase_safe};
