//! `tether list` command - Show registered directories.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use tether_core::{RepoKind, RepoRegistration};

use super::utils;
use crate::output;

/// Print every registration in file order.
pub fn run(explicit: Option<&Path>) -> Result<()> {
    let (config, path) = utils::load_config(explicit)?;

    if config.registrations.is_empty() {
        output::info(&format!("No directories registered in {}", path.display()));
        return Ok(());
    }

    for registration in &config.registrations {
        output::essential(&format_registration(registration));
    }
    Ok(())
}

fn format_registration(registration: &RepoRegistration) -> String {
    let names = registration.names.join(", ");
    let mut line = if registration.repo {
        format!("{} {}", names.bold(), registration.path.display())
    } else {
        format!("{} {}", names, registration.path.display().to_string().dimmed())
    };

    match &registration.kind {
        RepoKind::Source => {}
        RepoKind::Binary => line.push_str(" [binary]"),
        RepoKind::Other(kind) => line.push_str(&format!(" [{kind}]")),
    }
    if !registration.groups.is_empty() {
        line.push_str(&format!(" ({})", registration.groups.join(", ")));
    }
    line
}
