//! `tether st|fetch|merge|update` - Run one action over registered repositories.

use std::path::Path;

use anyhow::Result;
use tether_core::{RunReport, SyncAction, SyncSettings, run_over_set};
use tether_git::Repository;

use super::utils;
use crate::output;
use crate::prompt::ConsolePrompt;

/// Run `action` over `target`, or over every registered repository.
///
/// Per-repository failures are reported, not returned.
pub fn run(action: SyncAction, target: Option<&str>, explicit: Option<&Path>) -> Result<()> {
    let (config, path) = utils::load_config(explicit)?;
    let settings = SyncSettings::from(&config);
    let prompt = ConsolePrompt::new();

    let report = run_over_set(
        action,
        target,
        &config.registrations,
        &settings,
        &prompt,
        |dir| Repository::open(dir),
    )?;

    if report.entries.is_empty() {
        output::info(&format!(
            "No repositories registered - add entries with \"repo\": true to {}",
            path.display()
        ));
        return Ok(());
    }

    print_summary(action, &report);
    Ok(())
}

fn print_summary(action: SyncAction, report: &RunReport) {
    if report.entries.len() > 1 {
        output::hr();
        for entry in &report.entries {
            output::detail(&format!(
                "{} {} {}",
                output::outcome_indicator(&entry.outcome),
                entry.name,
                entry.outcome
            ));
        }
    }

    let attention = report.attention_count();
    if report.halted {
        output::warn(&format!(
            "{action} stopped after {} of the repositories - fix the failed pull and rerun",
            report.entries.len()
        ));
    } else if attention == 0 {
        output::success(&format!(
            "{action}: {} repositor{} checked",
            report.entries.len(),
            if report.entries.len() == 1 { "y" } else { "ies" }
        ));
    } else {
        output::warn(&format!(
            "{action}: {attention} of {} repositories need attention",
            report.entries.len()
        ));
    }
}
