//! Init-system integration.
//!
//! Each supported init system implements [`ServiceManager`]; the installer
//! only ever talks to the trait.

pub mod bsd;
pub mod homebrew;
pub mod systemd;
pub mod sysv;

pub use bsd::{FreeBsdRc, OpenBsdRc};
pub use homebrew::BrewServices;
pub use systemd::Systemd;
pub use sysv::SysV;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::install::Layout;
use crate::platform::InitSystem;
use crate::shell::CommandRunner;

/// Name of the service every init system registers.
pub const SERVICE_NAME: &str = "v2ray";

/// Lifecycle actions on the running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    /// Verb passed to the service tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controls the v2ray service through one init system.
pub trait ServiceManager {
    /// Init system name for messages.
    fn name(&self) -> &'static str;

    /// Start, stop or restart the service.
    fn control(&self, action: ServiceAction) -> Result<()>;

    /// Enable or disable start at boot.
    fn set_autostart(&self, layout: &Layout, enabled: bool) -> Result<()>;

    /// Write the unit or rc script for this init system.
    fn install_unit(&self, layout: &Layout, user: &str) -> Result<()>;

    /// Host paths owned by the service integration, removed on purge.
    fn unit_files(&self, layout: &Layout) -> Vec<PathBuf>;
}

/// The service manager for `init`.
pub fn service_manager<'a>(
    init: InitSystem,
    runner: &'a dyn CommandRunner,
    layout: &Layout,
) -> Box<dyn ServiceManager + 'a> {
    match init {
        InitSystem::Systemd => Box::new(Systemd::new(runner)),
        InitSystem::SysV => Box::new(SysV::new(runner, layout)),
        InitSystem::FreeBsdRc => Box::new(FreeBsdRc::new(runner)),
        InitSystem::OpenBsdRc => Box::new(OpenBsdRc::new(runner)),
        InitSystem::Homebrew => Box::new(BrewServices::new(runner)),
    }
}

/// Placeholder values for the service templates.
pub(crate) fn template_vars(layout: &Layout, user: &str) -> HashMap<&'static str, String> {
    HashMap::from([
        ("user", user.to_string()),
        ("install_dir", layout.install_dir.display().to_string()),
        ("config_dir", layout.config_dir.display().to_string()),
        ("pid_dir", layout.pid_dir.display().to_string()),
    ])
}

/// Host path of the service file, for init systems that have one.
pub(crate) fn service_file(layout: &Layout) -> Option<PathBuf> {
    layout.service_file.as_ref().map(|path| layout.host(path))
}
