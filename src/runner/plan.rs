//! Deciding which lifecycle step an action turns into.

use std::fmt;

use crate::error::{HelperError, Result};
use crate::release::version::same_version;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Install when absent, upgrade when outdated.
    #[default]
    Auto,
    Install,
    Upgrade,
    Remove,
    Purge,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Auto => "auto",
            Action::Install => "install",
            Action::Upgrade => "upgrade",
            Action::Remove => "remove",
            Action::Purge => "purge",
        }
    }

    /// Whether the action needs to know the latest release.
    pub fn needs_release(&self) -> bool {
        matches!(self, Action::Auto | Action::Install | Action::Upgrade)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The step the installer will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Install,
    Upgrade,
    Remove,
    Purge,
}

/// Map `action` onto a step given what is installed.
///
/// `installed` is the detected version, `None` when v2ray is absent.
/// `latest` is only consulted by actions that compare versions.
///
/// ```
/// use v2ray_helper::runner::{plan, Action, Step};
///
/// assert_eq!(plan(Action::Auto, None, "4.22.1", false).unwrap(), Step::Install);
/// assert_eq!(plan(Action::Auto, Some("4.21.0"), "4.22.1", false).unwrap(), Step::Upgrade);
/// assert!(plan(Action::Auto, Some("4.22.1"), "v4.22.1", false).is_err());
/// ```
pub fn plan(action: Action, installed: Option<&str>, latest: &str, force: bool) -> Result<Step> {
    match action {
        Action::Install => match installed {
            Some(_) if !force => Err(HelperError::AlreadyInstalled),
            _ => Ok(Step::Install),
        },
        Action::Upgrade => match installed {
            None => Err(HelperError::not_installed_for_upgrade()),
            Some(current) => upgrade_or_latest(current, latest, force),
        },
        Action::Remove => match installed {
            None if !force => Err(HelperError::not_installed_for_remove()),
            _ => Ok(Step::Remove),
        },
        Action::Purge => Ok(Step::Purge),
        Action::Auto => match installed {
            None => Ok(Step::Install),
            Some(current) => upgrade_or_latest(current, latest, force),
        },
    }
}

fn upgrade_or_latest(current: &str, latest: &str, force: bool) -> Result<Step> {
    if !same_version(current, latest) {
        return Ok(Step::Upgrade);
    }
    if force {
        tracing::info!("Force upgrade to v2ray-{}", latest);
        return Ok(Step::Upgrade);
    }
    Err(HelperError::AlreadyLatest)
}
