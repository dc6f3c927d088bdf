//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::Result;

use super::{
    parse_answer, OutputMode, ProgressSpinner, Prompt, SpinnerHandle, TransferBar,
    TransferProgress, UserInterface,
};

const PROMPT_ENV_PREFIX: &str = "V2RAY_HELPER_CONFIRM_";

/// UI implementation for non-interactive mode.
///
/// Spinners and transfer bars are never drawn. Confirmations are answered
/// from `V2RAY_HELPER_CONFIRM_<KEY>` when set, otherwise with the prompt
/// default.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        let answer = self
            .env_overrides
            .get(&env_key)
            .and_then(|value| parse_answer(value))
            .unwrap_or(prompt.default);
        tracing::debug!("answered '{}' with {} (non-interactive)", prompt.key, answer);
        Ok(answer)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_status() {
            println!("{}", message);
        }
        Box::new(ProgressSpinner::hidden())
    }

    fn start_transfer(&mut self, _name: &str) -> Box<dyn TransferProgress> {
        Box::new(TransferBar::hidden())
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n=== {} ===\n", title);
        }
    }

    fn show_field(&mut self, key: &str, value: &str) {
        if self.mode.shows_status() {
            println!("  {}: {}", key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_uses_default_without_override() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, HashMap::new());
        assert!(!ui.confirm(&Prompt::new("purge", "Sure?", false)).unwrap());
        assert!(ui.confirm(&Prompt::new("purge", "Sure?", true)).unwrap());
    }

    #[test]
    fn confirm_reads_override() {
        let mut overrides = HashMap::new();
        overrides.insert("V2RAY_HELPER_CONFIRM_PURGE".to_string(), "yes".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, overrides);
        assert!(ui.confirm(&Prompt::new("purge", "Sure?", false)).unwrap());
    }

    #[test]
    fn unparseable_override_falls_back_to_default() {
        let mut overrides = HashMap::new();
        overrides.insert("V2RAY_HELPER_CONFIRM_PURGE".to_string(), "perhaps".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, overrides);
        assert!(!ui.confirm(&Prompt::new("purge", "Sure?", false)).unwrap());
    }

    #[test]
    fn new_collects_confirm_overrides_only() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(ui
            .env_overrides
            .keys()
            .all(|key| key.starts_with(PROMPT_ENV_PREFIX)));
    }
}
