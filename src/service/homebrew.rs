//! `brew services` on macOS.

use std::path::PathBuf;

use crate::error::Result;
use crate::install::Layout;
use crate::shell::CommandRunner;

use super::{ServiceAction, ServiceManager};

/// Homebrew formula that ships v2ray.
pub const FORMULA: &str = "v2ray-core";

/// Manages v2ray through launchd via `brew services`.
pub struct BrewServices<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> BrewServices<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn services(&self, verb: &str) -> Result<()> {
        self.runner
            .run_checked("brew", &["services", verb, FORMULA])?;
        Ok(())
    }
}

impl ServiceManager for BrewServices<'_> {
    fn name(&self) -> &'static str {
        "brew services"
    }

    fn control(&self, action: ServiceAction) -> Result<()> {
        self.services(action.as_str())
    }

    /// `brew services start` also registers the agent to launch at login.
    fn set_autostart(&self, _layout: &Layout, enabled: bool) -> Result<()> {
        self.services(if enabled { "start" } else { "stop" })
    }

    fn install_unit(&self, _layout: &Layout, _user: &str) -> Result<()> {
        Ok(())
    }

    fn unit_files(&self, _layout: &Layout) -> Vec<PathBuf> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;

    #[test]
    fn control_runs_brew_services() {
        let runner = MockRunner::new();
        BrewServices::new(&runner)
            .control(ServiceAction::Restart)
            .unwrap();
        assert_eq!(runner.calls(), vec!["brew services restart v2ray-core"]);
    }
}
