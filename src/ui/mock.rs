//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined confirmation answers.
//!
//! # Example
//!
//! ```
//! use v2ray_helper::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_answer("purge", true);
//!
//! ui.message("Removing v2ray");
//! assert!(ui.confirm(&Prompt::new("purge", "Delete everything?", false)).unwrap());
//!
//! assert!(ui.messages().contains(&"Removing v2ray".to_string()));
//! assert_eq!(ui.prompts_shown(), ["purge"]);
//! ```

use std::collections::HashMap;

use crate::error::Result;

use super::{Prompt, SpinnerHandle, TransferProgress, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    fields: Vec<(String, String)>,
    spinners: Vec<String>,
    transfers: Vec<String>,
    answers: HashMap<String, bool>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with no answers configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the confirmation with this key.
    pub fn set_answer(&mut self, key: &str, answer: bool) {
        self.answers.insert(key.to_string(), answer);
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warnings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured errors.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get all captured `key: value` lines.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Value of the first field with `key`.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get all spinner messages started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Get the names of all transfers started.
    pub fn transfers(&self) -> &[String] {
        &self.transfers
    }

    /// Get keys of all prompts shown.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Check if a message containing `needle` was shown at any level.
    pub fn has_output(&self, needle: &str) -> bool {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .any(|m| m.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        self.prompts_shown.push(prompt.key.clone());
        Ok(self
            .answers
            .get(&prompt.key)
            .copied()
            .unwrap_or(prompt.default))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::new())
    }

    fn start_transfer(&mut self, name: &str) -> Box<dyn TransferProgress> {
        self.transfers.push(name.to_string());
        Box::new(MockTransfer::default())
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_field(&mut self, key: &str, value: &str) {
        self.fields.push((key.to_string(), value.to_string()));
    }
}

/// Mock spinner that captures finish messages.
#[derive(Debug, Default)]
pub struct MockSpinner {
    finish_message: Option<String>,
    status: Option<SpinnerStatus>,
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinnerStatus {
    /// Finished successfully.
    Success,
    /// Finished with error.
    Error,
}

impl MockSpinner {
    /// Create a new mock spinner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the final finish message.
    pub fn finish_message(&self) -> Option<&str> {
        self.finish_message.as_deref()
    }

    /// Get the final status.
    pub fn status(&self) -> Option<SpinnerStatus> {
        self.status
    }
}

impl SpinnerHandle for MockSpinner {
    fn finish_success(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(SpinnerStatus::Success);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(SpinnerStatus::Error);
    }
}

/// Transfer progress that only counts bytes.
#[derive(Debug, Default)]
pub struct MockTransfer {
    /// Reported total size.
    pub length: Option<u64>,
    /// Bytes received so far.
    pub received: u64,
    /// Whether `finish` was called.
    pub finished: bool,
}

impl TransferProgress for MockTransfer {
    fn set_length(&mut self, length: Option<u64>) {
        self.length = length;
    }

    fn advance(&mut self, bytes: u64) {
        self.received += bytes;
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
