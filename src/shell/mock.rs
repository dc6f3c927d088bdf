//! Recording command runner for tests.
//!
//! `MockRunner` implements [`CommandRunner`] without spawning anything. It
//! records every invocation and answers with pre-configured results.
//!
//! # Example
//!
//! ```
//! use v2ray_helper::shell::{CommandRunner, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.fail("systemctl stop v2ray", 5);
//!
//! assert!(runner.run("systemctl", &["start", "v2ray"]).unwrap().success);
//! assert!(!runner.run("systemctl", &["stop", "v2ray"]).unwrap().success);
//! assert_eq!(runner.calls(), vec!["systemctl start v2ray", "systemctl stop v2ray"]);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::error::Result;

use super::command::{display_command, CommandResult, CommandRunner};

/// Command runner that records calls instead of executing them.
#[derive(Debug, Default)]
pub struct MockRunner {
    calls: RefCell<Vec<String>>,
    responses: RefCell<HashMap<String, CommandResult>>,
    programs: RefCell<HashSet<String>>,
    all_programs_exist: bool,
}

impl MockRunner {
    /// Create a runner where every program exists and every command succeeds.
    pub fn new() -> Self {
        Self {
            all_programs_exist: true,
            ..Default::default()
        }
    }

    /// Create a runner where only programs registered with
    /// [`with_program`](Self::with_program) exist.
    pub fn with_programs<I, S>(programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let runner = Self::default();
        for program in programs {
            runner.programs.borrow_mut().insert(program.into());
        }
        runner
    }

    /// Register a program as present on `PATH`.
    pub fn with_program(self, program: &str) -> Self {
        self.programs.borrow_mut().insert(program.to_string());
        self
    }

    /// Make a command line succeed with the given stdout.
    pub fn respond(&self, command: &str, stdout: &str) {
        self.responses.borrow_mut().insert(
            command.to_string(),
            CommandResult::success(stdout.to_string(), String::new(), Duration::ZERO),
        );
    }

    /// Make a command line exit with the given code.
    pub fn fail(&self, command: &str, code: i32) {
        self.responses.borrow_mut().insert(
            command.to_string(),
            CommandResult::failure(Some(code), String::new(), String::new(), Duration::ZERO),
        );
    }

    /// All command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Check whether a command line was run.
    pub fn ran(&self, command: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == command)
    }

    /// Check whether any command line starting with `prefix` was run.
    pub fn ran_prefix(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult> {
        let line = display_command(program, args);
        self.calls.borrow_mut().push(line.clone());

        Ok(self.responses.borrow().get(&line).cloned().unwrap_or_else(|| {
            CommandResult::success(String::new(), String::new(), Duration::ZERO)
        }))
    }

    fn exists(&self, program: &str) -> bool {
        self.all_programs_exist || self.programs.borrow().contains(program)
    }
}
