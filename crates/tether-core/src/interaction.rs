//! The boundary between the sync engine and the person running it.
//!
//! The engine never prints or reads the terminal itself. Every message and
//! every decision goes through an [`InteractionPort`], so the console
//! front-end and the test doubles see exactly the same calls.

/// Option label for "rebase anyway".
pub const REBASE: &str = "rebase";
/// Option label for "leave this repository alone".
pub const SKIP: &str = "skip";

/// How a per-repository message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Informational (blue).
    Info,
    /// Needs attention (red).
    Problem,
}

/// Prompts and reports the engine relies on.
///
/// Implementations decide how to render; the engine only cares about the
/// answers. A port that cannot ask (no terminal) returns the safe default:
/// `confirm` yields `default`, `choose` yields `None`, `prompt_text` yields
/// an empty string.
pub trait InteractionPort {
    /// Yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> bool;

    /// Pick one of `options`; `None` when the person declines to answer.
    fn choose(&self, prompt: &str, options: &[&str]) -> Option<usize>;

    /// Free-text answer, pre-filled with `suggestion` when given.
    fn prompt_text(&self, prompt: &str, suggestion: Option<&str>) -> String;

    /// Tagged one-line message about the repository `name`.
    fn report(&self, tone: Tone, name: &str, message: &str);

    /// Untagged block of text (commit logs, status listings, git output).
    fn show(&self, text: &str);
}

/// Answer to the "rebase or skip" question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseChoice {
    /// Rebase despite predicted conflicts.
    Rebase,
    /// Explicitly leave the branch alone.
    Skip,
    /// No answer given.
    Undecided,
}

/// Ask `interaction` whether to rebase or skip.
pub fn ask_rebase_or_skip<I: InteractionPort + ?Sized>(
    interaction: &I,
    prompt: &str,
) -> RebaseChoice {
    match interaction.choose(prompt, &[REBASE, SKIP]) {
        Some(0) => RebaseChoice::Rebase,
        Some(_) => RebaseChoice::Skip,
        None => RebaseChoice::Undecided,
    }
}
