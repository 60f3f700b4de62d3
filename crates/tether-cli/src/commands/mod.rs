//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod completions;
pub mod config;
pub mod list;
pub mod push;
pub mod sync;
pub mod utils;

/// Tether - keep many git working copies in step with their upstreams.
#[derive(Parser)]
#[command(name = "tether")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/tether/cfg.json)
    #[arg(long, global = true, env = "TETHER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print problems and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how each repository relates to its upstream.
    ///
    /// TARGET is a registered name, a path, or `.` for the current
    /// directory. Without it every registered repository is checked.
    #[command(alias = "status")]
    St {
        /// Registered name or path
        target: Option<String>,
    },

    /// Fetch from remotes, then show status.
    Fetch {
        /// Registered name or path
        target: Option<String>,
    },

    /// Rebase diverged branches that are predicted conflict-free.
    ///
    /// Never prompts; branches with files changed on both sides are
    /// reported for manual attention.
    Merge {
        /// Registered name or path
        target: Option<String>,
    },

    /// Pull each repository, then show status.
    ///
    /// Stops at the first repository whose pull fails.
    #[command(alias = "up")]
    Update {
        /// Registered name or path
        target: Option<String>,
    },

    /// Fetch, optionally rebase, and push the current branch.
    Push,

    /// List registered directories.
    #[command(alias = "ls")]
    List,

    /// Print the config file location.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
