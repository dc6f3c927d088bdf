//! Installing, upgrading and removing v2ray.
//!
//! [`Installer`] is the seam between the lifecycle decisions in
//! [`crate::runner`] and the host. [`UnixInstaller`] places release archives
//! itself; [`HomebrewInstaller`] delegates everything to `brew`.

pub mod accounts;
pub mod config_file;
pub mod files;
pub mod homebrew;
pub mod layout;
pub mod receipt;
pub mod unix;

pub use accounts::{AccountLookup, AccountManager, StaticAccounts, SystemAccounts};
pub use config_file::{write_default_config, ServerIdentity};
pub use homebrew::HomebrewInstaller;
pub use layout::{Layout, EXECUTABLES, RECEIPT_FILE};
pub use receipt::InstallReceipt;
pub use unix::UnixInstaller;

use std::path::Path;

use crate::config::HelperConfig;
use crate::download::Downloader;
use crate::error::Result;
use crate::platform::{InitSystem, Platform};
use crate::release::{Release, ReleaseClient};
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

/// Lifecycle operations on one host.
pub trait Installer {
    /// Put `release` on a host that has no v2ray (or on top of one with --force).
    fn install(&self, release: &Release, ui: &mut dyn UserInterface) -> Result<()>;

    /// Replace the payload with `release`, keeping config and service setup.
    fn upgrade(&self, release: &Release, ui: &mut dyn UserInterface) -> Result<()>;

    /// Stop the service and delete the payload and links. Config is kept.
    fn remove(&self, ui: &mut dyn UserInterface) -> Result<()>;

    /// Remove, then delete config, accounts and service files.
    fn purge(&self, confirmed: bool, ui: &mut dyn UserInterface) -> Result<()>;
}

/// Everything an installer needs from the outside world.
#[derive(Clone, Copy)]
pub struct InstallContext<'a> {
    pub config: &'a HelperConfig,
    pub platform: &'a Platform,
    pub layout: &'a Layout,
    pub runner: &'a dyn CommandRunner,
    pub accounts: &'a dyn AccountLookup,
    pub releases: &'a ReleaseClient,
    pub downloader: &'a Downloader,
    /// Per-run scratch directory for downloads and extraction.
    pub scratch: &'a Path,
}

/// The installer for the context's platform.
pub fn installer_for<'a>(ctx: InstallContext<'a>) -> Result<Box<dyn Installer + 'a>> {
    match ctx.platform.init {
        InitSystem::Homebrew => Ok(Box::new(HomebrewInstaller::new(ctx.runner)?)),
        _ => Ok(Box::new(UnixInstaller::new(ctx))),
    }
}
