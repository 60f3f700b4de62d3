//! Tether CLI - keep many git working copies in step with their upstreams.

use clap::Parser;
use tether_core::SyncAction;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod prompt;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    output::set_quiet(cli.quiet);
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::St { target } => {
            commands::sync::run(SyncAction::Status, target.as_deref(), config)
        }
        Commands::Fetch { target } => {
            commands::sync::run(SyncAction::Fetch, target.as_deref(), config)
        }
        Commands::Merge { target } => {
            commands::sync::run(SyncAction::Merge, target.as_deref(), config)
        }
        Commands::Update { target } => {
            commands::sync::run(SyncAction::Update, target.as_deref(), config)
        }
        Commands::Push => commands::push::run(config),
        Commands::List => commands::list::run(config),
        Commands::Config => commands::config::run(config),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
