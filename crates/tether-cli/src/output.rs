//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tether_core::{RebaseSafety, SyncOutcome, Tone};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
///
/// Use for git output and file listings that accompany a tagged message.
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Print a message about one repository.
///
/// Problems always print; information is suppressed in quiet mode.
pub fn repo_tag(tone: Tone, name: &str, msg: &str) {
    if tone == Tone::Info && is_quiet() {
        return;
    }
    println!("{}", format_repo_tag(tone, name, msg));
}

/// `name -> message`, blue for information and red for problems.
#[must_use]
pub fn format_repo_tag(tone: Tone, name: &str, msg: &str) -> String {
    match tone {
        Tone::Info => format!("{} -> {}", name.blue().bold(), msg.blue()),
        Tone::Problem => format!("{} -> {}", name.red().bold(), msg.red()),
    }
}

/// Get the status indicator for a sync outcome.
#[must_use]
pub fn outcome_indicator(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::UpToDate
        | SyncOutcome::FastForwarded
        | SyncOutcome::Rebased
        | SyncOutcome::Merged => "●".green().to_string(),
        SyncOutcome::Diverged(RebaseSafety::Safe) | SyncOutcome::Skipped => {
            "●".yellow().to_string()
        }
        SyncOutcome::Diverged(RebaseSafety::Unsafe(_))
        | SyncOutcome::NeedsManualResolution(_)
        | SyncOutcome::Failed(_) => "●".red().to_string(),
    }
}

/// Spinner shown while waiting on the network; hidden in quiet mode.
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}
