//! Command runner for installs into a staging root.
//!
//! With `--root` pointing anywhere but `/`, files land under that directory
//! while accounts and services belong to the host. `StagingRunner` keeps
//! those host commands from running: each one is logged, remembered and
//! reported as successful. No program counts as present on `PATH`.

use std::cell::RefCell;
use std::time::Duration;

use crate::error::Result;

use super::command::{display_command, CommandResult, CommandRunner};

/// Skips every command, recording what would have run on the host.
#[derive(Debug, Default)]
pub struct StagingRunner {
    skipped: RefCell<Vec<String>>,
}

impl StagingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command lines skipped so far, in order.
    pub fn skipped(&self) -> Vec<String> {
        self.skipped.borrow().clone()
    }
}

impl CommandRunner for StagingRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult> {
        let line = display_command(program, args);
        tracing::warn!("staging root, skipping `{}`", line);
        self.skipped.borrow_mut().push(line);
        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Duration::ZERO,
        ))
    }

    fn exists(&self, _program: &str) -> bool {
        false
    }
}
