//! Installer for macOS, backed by the official Homebrew tap.

use crate::error::{HelperError, Result};
use crate::release::Release;
use crate::service::homebrew::FORMULA;
use crate::service::{BrewServices, ServiceAction, ServiceManager};
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

use super::Installer;

/// Tap that publishes the v2ray formula.
pub const TAP: &str = "v2ray/v2ray";

/// Delegates every lifecycle step to `brew`.
pub struct HomebrewInstaller<'a> {
    runner: &'a dyn CommandRunner,
    services: BrewServices<'a>,
}

impl<'a> HomebrewInstaller<'a> {
    /// Fails with [`HelperError::HomebrewMissing`] when `brew` is not on `PATH`.
    pub fn new(runner: &'a dyn CommandRunner) -> Result<Self> {
        if !runner.exists("brew") {
            return Err(HelperError::HomebrewMissing);
        }
        Ok(Self {
            runner,
            services: BrewServices::new(runner),
        })
    }

    fn brew(&self, args: &[&str]) -> Result<()> {
        self.runner.run_checked("brew", args)?;
        Ok(())
    }
}

impl Installer for HomebrewInstaller<'_> {
    fn install(&self, _release: &Release, ui: &mut dyn UserInterface) -> Result<()> {
        tracing::info!("Install the official tap...");
        self.brew(&["tap", TAP])?;

        tracing::info!("Install v2ray...");
        let mut spinner = ui.start_spinner(&format!("brew install {}", FORMULA));
        if let Err(e) = self.brew(&["install", FORMULA]) {
            spinner.finish_error("brew install failed");
            return Err(e);
        }
        spinner.finish_success("v2ray-core installed");

        tracing::info!("register v2ray to launch at login...");
        self.services.control(ServiceAction::Start)?;

        ui.success("Successfully installed v2ray");
        Ok(())
    }

    fn upgrade(&self, _release: &Release, ui: &mut dyn UserInterface) -> Result<()> {
        tracing::info!("Upgrade v2ray...");
        let mut spinner = ui.start_spinner(&format!("brew upgrade {}", FORMULA));
        if let Err(e) = self.brew(&["upgrade", FORMULA]) {
            spinner.finish_error("brew upgrade failed");
            return Err(e);
        }
        spinner.finish_success("v2ray-core upgraded");
        tracing::info!("Restart v2ray...");
        self.services.control(ServiceAction::Restart)?;

        ui.success("V2ray Upgraded");
        Ok(())
    }

    fn remove(&self, ui: &mut dyn UserInterface) -> Result<()> {
        tracing::info!("Uninstalling v2ray...");
        if let Err(e) = self.brew(&["remove", FORMULA]) {
            tracing::error!("Cannot remove v2ray: {}", e);
            ui.error("Cannot remove v2ray, subprocess returned an error");
            return Ok(());
        }
        ui.success("v2ray has been removed");
        Ok(())
    }

    fn purge(&self, confirmed: bool, ui: &mut dyn UserInterface) -> Result<()> {
        if !confirmed {
            return Err(HelperError::ConfirmationRequired);
        }
        self.remove(ui)?;

        tracing::info!("Untapping {}", TAP);
        self.brew(&["untap", TAP])?;
        ui.success("v2ray has been purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;

    fn release() -> Release {
        Release {
            tag_name: "v4.22.1".to_string(),
            prerelease: false,
            html_url: None,
            assets: Vec::new(),
        }
    }

    #[test]
    fn requires_brew() {
        let runner = MockRunner::with_programs(Vec::<String>::new());
        assert!(matches!(
            HomebrewInstaller::new(&runner),
            Err(HelperError::HomebrewMissing)
        ));
    }

    #[test]
    fn install_taps_installs_and_starts() {
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        HomebrewInstaller::new(&runner)
            .unwrap()
            .install(&release(), &mut ui)
            .unwrap();

        assert_eq!(ui.spinners(), ["brew install v2ray-core"]);
        assert_eq!(
            runner.calls(),
            vec![
                "brew tap v2ray/v2ray",
                "brew install v2ray-core",
                "brew services start v2ray-core",
            ]
        );
    }

    #[test]
    fn upgrade_then_restart() {
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        HomebrewInstaller::new(&runner)
            .unwrap()
            .upgrade(&release(), &mut ui)
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec!["brew upgrade v2ray-core", "brew services restart v2ray-core"]
        );
    }

    #[test]
    fn failed_remove_is_only_reported() {
        let runner = MockRunner::new();
        runner.fail("brew remove v2ray-core", 1);
        let mut ui = MockUI::new();
        HomebrewInstaller::new(&runner)
            .unwrap()
            .remove(&mut ui)
            .unwrap();
        assert_eq!(ui.errors().len(), 1);
    }

    #[test]
    fn purge_needs_confirmation() {
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let installer = HomebrewInstaller::new(&runner).unwrap();
        assert!(matches!(
            installer.purge(false, &mut ui),
            Err(HelperError::ConfirmationRequired)
        ));
        assert!(runner.calls().is_empty());

        installer.purge(true, &mut ui).unwrap();
        assert_eq!(
            runner.calls(),
            vec!["brew remove v2ray-core", "brew untap v2ray/v2ray"]
        );
    }
}
