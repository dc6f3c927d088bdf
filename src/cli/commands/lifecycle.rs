//! Install, upgrade, remove, purge and auto.

use crate::config::HelperConfig;
use crate::error::{HelperError, Result};
use crate::install::{StaticAccounts, SystemAccounts};
use crate::platform::{InitSystem, Platform};
use crate::runner::{ensure_privileges, is_staging, Lifecycle, RunOptions};
use crate::shell::{StagingRunner, SystemRunner};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Runs one lifecycle action against the host.
pub struct LifecycleCommand {
    config: HelperConfig,
    platform: Platform,
    options: RunOptions,
    elevate: bool,
}

impl LifecycleCommand {
    pub fn new(config: HelperConfig, platform: Platform, options: RunOptions) -> Self {
        Self {
            config,
            platform,
            options,
            elevate: true,
        }
    }

    /// Whether to re-run through sudo/su when not root.
    pub fn with_elevation(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    /// Files only: accounts and services of the host are not touched.
    fn execute_staged(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.platform.init == InitSystem::Homebrew {
            return Err(HelperError::Config {
                path: self.config.root.clone(),
                message: "Homebrew installs cannot be staged under --root".to_string(),
            });
        }

        let runner = StagingRunner::new();
        let accounts = StaticAccounts::new();
        let lifecycle = Lifecycle::new(&self.config, &self.platform, &runner, &accounts)?;
        lifecycle.run(&self.options, ui)?;

        let skipped = runner.skipped();
        if !skipped.is_empty() {
            ui.warning(&format!(
                "Staged under {}, skipped {} host command(s): {}",
                self.config.root.display(),
                skipped.len(),
                skipped.join("; ")
            ));
        }
        Ok(CommandResult::success())
    }
}

impl Command for LifecycleCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.platform.is_legacy() {
            tracing::warn!("systemd not found, falling back to SysV init scripts");
        }

        if is_staging(&self.config) {
            return self.execute_staged(ui);
        }

        let runner = SystemRunner::new();
        ensure_privileges(&self.config, &self.platform, &runner, self.elevate)?;

        let accounts = SystemAccounts;
        let lifecycle = Lifecycle::new(&self.config, &self.platform, &runner, &accounts)?;
        lifecycle.run(&self.options, ui)?;
        Ok(CommandResult::success())
    }
}
