//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::runner::Action;

/// v2ray-helper - Install, upgrade and remove v2ray.
#[derive(Debug, Parser)]
#[command(name = "v2ray-helper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Install or upgrade v2ray as needed (default)
    #[arg(short = 'A', long, group = "legacy")]
    pub auto: bool,

    /// Install v2ray
    #[arg(short = 'I', long, group = "legacy")]
    pub install: bool,

    /// Upgrade v2ray
    #[arg(short = 'U', long, group = "legacy")]
    pub upgrade: bool,

    /// Remove v2ray, keeping its configuration
    #[arg(short = 'R', long, group = "legacy")]
    pub remove: bool,

    /// Remove v2ray together with configuration, service files and user
    #[arg(short = 'P', long, group = "legacy")]
    pub purge: bool,

    /// Reinstall, upgrade to the same version or remove a missing install
    #[arg(long, global = true)]
    pub force: bool,

    /// Confirm purge without asking
    #[arg(long, global = true)]
    pub sure: bool,

    /// Path to config file (merged over the system and user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Install under this directory instead of /
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Use this release tag instead of the latest one
    #[arg(long, global = true, value_name = "TAG")]
    pub release: Option<String>,

    /// Fail instead of re-running through sudo/su when not root
    #[arg(long, global = true)]
    pub no_elevate: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install or upgrade v2ray as needed (default if no command specified)
    Auto,

    /// Install v2ray
    Install,

    /// Upgrade v2ray to the latest release
    Upgrade,

    /// Remove v2ray, keeping its configuration
    Remove,

    /// Remove v2ray together with configuration, service files and user
    Purge,

    /// Show the installed and latest version
    Status,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl Cli {
    /// The action selected by a legacy flag, if any.
    pub fn legacy_action(&self) -> Option<Action> {
        [
            (self.auto, Action::Auto),
            (self.install, Action::Install),
            (self.upgrade, Action::Upgrade),
            (self.remove, Action::Remove),
            (self.purge, Action::Purge),
        ]
        .into_iter()
        .find_map(|(set, action)| set.then_some(action))
    }

    /// Reject a legacy action flag combined with a subcommand.
    pub fn validate(&self) -> Result<(), clap::Error> {
        if let (Some(action), Some(command)) = (self.legacy_action(), &self.command) {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                format!(
                    "the flag '--{}' cannot be used with the '{}' subcommand",
                    action,
                    command.name()
                ),
            ));
        }
        Ok(())
    }
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Auto => "auto",
            Commands::Install => "install",
            Commands::Upgrade => "upgrade",
            Commands::Remove => "remove",
            Commands::Purge => "purge",
            Commands::Status => "status",
            Commands::Completions(_) => "completions",
        }
    }

    /// The lifecycle action this subcommand runs, if it is one.
    pub fn action(&self) -> Option<Action> {
        match self {
            Commands::Auto => Some(Action::Auto),
            Commands::Install => Some(Action::Install),
            Commands::Upgrade => Some(Action::Upgrade),
            Commands::Remove => Some(Action::Remove),
            Commands::Purge => Some(Action::Purge),
            Commands::Status | Commands::Completions(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_auto() {
        let cli = Cli::try_parse_from(["v2ray-helper"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.legacy_action(), None);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn subcommand_with_global_flags() {
        let cli =
            Cli::try_parse_from(["v2ray-helper", "install", "--force", "--root", "/tmp/x"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Install)));
        assert!(cli.force);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn legacy_flags_select_action() {
        let cli = Cli::try_parse_from(["v2ray-helper", "-P", "--sure"]).unwrap();
        assert_eq!(cli.legacy_action(), Some(Action::Purge));
        assert!(cli.sure);
    }

    #[test]
    fn legacy_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["v2ray-helper", "-I", "-U"]).is_err());
    }

    #[test]
    fn legacy_flag_conflicts_with_subcommand() {
        let cli = Cli::try_parse_from(["v2ray-helper", "-R", "install"]).unwrap();
        let err = cli.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn release_pin() {
        let cli = Cli::try_parse_from(["v2ray-helper", "upgrade", "--release", "v4.22.1"]).unwrap();
        assert_eq!(cli.release.as_deref(), Some("v4.22.1"));
        assert_eq!(cli.command.unwrap().action(), Some(Action::Upgrade));
    }
}
