//! Subprocess plumbing for git operations that libgit2 does not cover well
//! (network, rebase, stash), invoked with discrete arguments.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Output of a git subprocess whose exit status is reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined stdout and stderr, trailing whitespace removed.
    pub output: String,
    /// Process exit code (`-1` when terminated by a signal).
    pub code: i32,
}

impl CommandOutput {
    /// Build an output record directly (used by alternative backends).
    #[must_use]
    pub fn new(output: impl Into<String>, code: i32) -> Self {
        Self {
            output: output.into(),
            code,
        }
    }

    /// A successful, silent result.
    #[must_use]
    pub fn ok() -> Self {
        Self::new("", 0)
    }

    /// Whether the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Run `git <args>` inside `workdir`, reporting the exit code as data.
///
/// # Errors
/// Returns error only if the git executable cannot be spawned.
pub fn run_git(workdir: &Path, args: &[&str]) -> Result<CommandOutput> {
    tracing::debug!(dir = %workdir.display(), "running `git {}`", args.join(" "));

    let out = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()?;

    let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&out.stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }

    let result = CommandOutput {
        output: text.trim_end().to_string(),
        code: out.status.code().unwrap_or(-1),
    };
    if !result.success() {
        tracing::debug!(code = result.code, "git exited non-zero: {}", result.output);
    }
    Ok(result)
}

/// Run `git <args>` inside `workdir` and require a zero exit status.
///
/// # Errors
/// Returns [`Error::CommandFailed`] on non-zero exit.
pub fn run_git_checked(workdir: &Path, args: &[&str]) -> Result<String> {
    let result = run_git(workdir, args)?;
    if result.success() {
        Ok(result.output)
    } else {
        Err(Error::CommandFailed {
            command: args.join(" "),
            code: result.code,
            output: result.output,
        })
    }
}
