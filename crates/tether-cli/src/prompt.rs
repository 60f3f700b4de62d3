//! Console implementation of the engine's interaction port.

use inquire::{Confirm, Select, Text};
use tether_core::{InteractionPort, Tone};

use crate::output;

/// Prompts on the terminal with `inquire`; answers with safe defaults when
/// nobody is attached to it.
pub struct ConsolePrompt {
    attended: bool,
}

impl ConsolePrompt {
    /// Detect whether stdout is a terminal a person is watching.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attended: console::user_attended(),
        }
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionPort for ConsolePrompt {
    fn confirm(&self, prompt: &str, default: bool) -> bool {
        if !self.attended {
            return default;
        }
        // An interrupted prompt is a "no".
        Confirm::new(prompt)
            .with_default(default)
            .prompt()
            .unwrap_or(false)
    }

    fn choose(&self, prompt: &str, options: &[&str]) -> Option<usize> {
        if !self.attended {
            return None;
        }
        let picked = Select::new(prompt, options.to_vec()).prompt().ok()?;
        options.iter().position(|o| *o == picked)
    }

    fn prompt_text(&self, prompt: &str, suggestion: Option<&str>) -> String {
        if !self.attended {
            return String::new();
        }
        let mut text = Text::new(prompt);
        if let Some(suggestion) = suggestion {
            text = text.with_initial_value(suggestion);
        }
        text.prompt().unwrap_or_default()
    }

    fn report(&self, tone: Tone, name: &str, message: &str) {
        output::repo_tag(tone, name, message);
    }

    fn show(&self, text: &str) {
        if !text.is_empty() {
            output::detail(text);
        }
    }
}
