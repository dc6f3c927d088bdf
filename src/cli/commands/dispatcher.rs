//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, HelperConfig};
use crate::error::Result;
use crate::platform::Platform;
use crate::runner::{Action, RunOptions};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }
}

/// Dispatches CLI commands to their implementations.
#[derive(Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Effective configuration: files, environment, then `--root`.
    pub fn load_config(cli: &Cli) -> Result<HelperConfig> {
        let mut config = load_config(cli.config.as_deref())?;
        if let Some(root) = &cli.root {
            config.root = root.clone();
        }
        tracing::debug!("effective config: {:?}", config);
        Ok(config)
    }

    /// Dispatch and execute a command.
    ///
    /// A legacy action flag and no subcommand at all both run a lifecycle action.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if let Some(Commands::Completions(args)) = &cli.command {
            let cmd = super::completions::CompletionsCommand::new(args.clone());
            return cmd.execute(ui);
        }

        let config = Self::load_config(cli)?;
        let platform = Platform::detect()?;

        if let Some(Commands::Status) = &cli.command {
            let cmd = super::status::StatusCommand::new(config, platform, cli.release.clone());
            return cmd.execute(ui);
        }

        let action = cli
            .command
            .as_ref()
            .and_then(Commands::action)
            .or_else(|| cli.legacy_action())
            .unwrap_or(Action::Auto);
        let options = RunOptions {
            action,
            force: cli.force,
            sure: cli.sure,
            release: cli.release.clone(),
        };
        let cmd = super::lifecycle::LifecycleCommand::new(config, platform, options)
            .with_elevation(!cli.no_elevate);
        cmd.execute(ui)
    }
}
