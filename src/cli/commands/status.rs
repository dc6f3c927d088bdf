//! Status command implementation.
//!
//! The `v2ray-helper status` command reports what is installed and what the
//! latest release is, without changing anything.

use crate::config::HelperConfig;
use crate::error::Result;
use crate::install::SystemAccounts;
use crate::platform::Platform;
use crate::runner::Lifecycle;
use crate::shell::SystemRunner;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    config: HelperConfig,
    platform: Platform,
    release: Option<String>,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(config: HelperConfig, platform: Platform, release: Option<String>) -> Self {
        Self {
            config,
            platform,
            release,
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let runner = SystemRunner::new();
        let accounts = SystemAccounts;
        let lifecycle = Lifecycle::new(&self.config, &self.platform, &runner, &accounts)?;
        lifecycle.status(self.release.as_deref(), ui)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::OsKind;
    use crate::ui::MockUI;

    #[test]
    fn reports_empty_staging_root() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = HelperConfig {
            root: temp.path().to_path_buf(),
            api_base: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        let platform = Platform::from_parts(OsKind::Linux, "aarch64", false).unwrap();
        let mut ui = MockUI::new();

        let result = StatusCommand::new(config, platform, None)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.field("Installed"), Some("not installed"));
        assert_eq!(ui.field("Service"), Some("sysvinit"));
        assert!(ui.field("Platform").unwrap().starts_with("linux-arm64"));
        assert_eq!(ui.warnings().len(), 1);
    }
}
