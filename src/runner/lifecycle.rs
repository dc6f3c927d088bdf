//! Driving one lifecycle action end to end.

use crate::config::HelperConfig;
use crate::download::{build_client, Downloader};
use crate::error::{HelperError, Result};
use crate::install::{installer_for, AccountLookup, InstallContext, InstallReceipt, Layout};
use crate::platform::{InitSystem, Platform};
use crate::release::{installed_version, normalize, Release, ReleaseClient};
use crate::shell::{is_elevated, relaunch_with_root, CommandRunner};
use crate::ui::{Prompt, UserInterface};

use super::plan::{plan, Action, Step};
use super::scratch::ScratchDir;

/// Reported when a payload is present but its version cannot be read.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Options for a lifecycle run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub action: Action,
    /// Reinstall, upgrade to the same version, or remove a missing install.
    pub force: bool,
    /// Purge without asking.
    pub sure: bool,
    /// Release tag to use instead of the latest one.
    pub release: Option<String>,
}

/// Everything needed to detect, decide and act on one host.
pub struct Lifecycle<'a> {
    config: &'a HelperConfig,
    platform: &'a Platform,
    runner: &'a dyn CommandRunner,
    accounts: &'a dyn AccountLookup,
    releases: ReleaseClient,
    downloader: Downloader,
    layout: Layout,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        config: &'a HelperConfig,
        platform: &'a Platform,
        runner: &'a dyn CommandRunner,
        accounts: &'a dyn AccountLookup,
    ) -> Result<Self> {
        let client = build_client(config.timeout())?;
        let layout = Layout::for_platform(platform, &config.root, &config.service_user);
        Ok(Self {
            config,
            platform,
            runner,
            accounts,
            releases: ReleaseClient::with_client(client.clone(), config),
            downloader: Downloader::new(client),
            layout,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Version of the v2ray currently installed, `None` when absent.
    ///
    /// A payload whose binary cannot report a version falls back to the
    /// receipt, then to [`UNKNOWN_VERSION`].
    pub fn installed_version(&self) -> Option<String> {
        if self.platform.init == InitSystem::Homebrew {
            return installed_version(self.runner, "v2ray");
        }

        let layout = &self.layout;
        if !layout.has_payload() {
            if layout.root() == std::path::Path::new("/") {
                return installed_version(self.runner, "v2ray");
            }
            return None;
        }

        let candidates = [
            layout.host(&layout.executable("v2ray")),
            layout.host(&layout.legacy_dir.join("v2ray")),
        ];
        candidates
            .iter()
            .filter(|path| path.exists())
            .find_map(|path| installed_version(self.runner, &path.to_string_lossy()))
            .or_else(|| InstallReceipt::load(&layout.receipt_path()).map(|r| r.version))
            .or_else(|| Some(UNKNOWN_VERSION.to_string()))
    }

    /// The pinned release, or the latest one.
    pub fn fetch_release(&self, tag: Option<&str>) -> Result<Release> {
        match tag {
            Some(tag) => self.releases.tagged(&release_tag(tag)),
            None => self.releases.latest(),
        }
    }

    /// Detect, decide and run one action.
    pub fn run(&self, options: &RunOptions, ui: &mut dyn UserInterface) -> Result<()> {
        let release = if options.action.needs_release() {
            let release = self.fetch_release(options.release.as_deref())?;
            tracing::info!(
                "The latest version of v2ray is {} {}",
                release.version(),
                release.pre_release_label()
            );
            Some(release)
        } else {
            None
        };

        tracing::info!("Operating system: {}", self.platform.describe());
        let installed = self.installed_version();
        tracing::info!(
            "Current version: {}",
            installed.as_deref().unwrap_or("not installed")
        );

        let latest = release.as_ref().map(Release::version).unwrap_or_default();
        let step = plan(options.action, installed.as_deref(), latest, options.force)?;
        tracing::debug!("{} resolved to {:?}", options.action, step);

        let scratch = ScratchDir::create()?;
        scratch.remove_on_interrupt();

        let ctx = InstallContext {
            config: self.config,
            platform: self.platform,
            layout: &self.layout,
            runner: self.runner,
            accounts: self.accounts,
            releases: &self.releases,
            downloader: &self.downloader,
            scratch: scratch.path(),
        };
        let installer = installer_for(ctx)?;

        match step {
            Step::Install => installer.install(required(release.as_ref())?, ui),
            Step::Upgrade => installer.upgrade(required(release.as_ref())?, ui),
            Step::Remove => installer.remove(ui),
            Step::Purge => {
                let confirmed = options.sure || confirm_purge(ui)?;
                installer.purge(confirmed, ui)
            }
        }
    }

    /// Report platform, installed version and latest release.
    pub fn status(&self, tag: Option<&str>, ui: &mut dyn UserInterface) -> Result<()> {
        ui.show_header("v2ray status");
        ui.show_field("Platform", &self.platform.describe());
        ui.show_field("Service", self.platform.init.name());

        let installed = self.installed_version();
        ui.show_field(
            "Installed",
            installed.as_deref().unwrap_or("not installed"),
        );

        if let Some(receipt) = InstallReceipt::load(&self.layout.receipt_path()) {
            ui.show_field(
                "Receipt",
                &format!(
                    "{} from {} ({})",
                    receipt.version,
                    receipt.asset,
                    receipt.installed_at.format("%Y-%m-%d %H:%M")
                ),
            );
        }

        match self.fetch_release(tag) {
            Ok(release) => {
                let label = format!("{} {}", release.version(), release.pre_release_label());
                ui.show_field("Latest", label.trim_end());
                if let Some(current) = installed.as_deref() {
                    if current != UNKNOWN_VERSION
                        && crate::release::is_newer(release.version(), current)
                    {
                        ui.message("An upgrade is available, run `v2ray-helper upgrade`.");
                    }
                }
            }
            Err(e) => ui.warning(&format!("Cannot query the latest release: {}", e)),
        }
        Ok(())
    }
}

/// Release tags are published as `v<version>`.
fn release_tag(pinned: &str) -> String {
    format!("v{}", normalize(pinned))
}

fn required(release: Option<&Release>) -> Result<&Release> {
    release.ok_or_else(|| HelperError::ReleaseLookup {
        message: "no release selected".to_string(),
    })
}

fn confirm_purge(ui: &mut dyn UserInterface) -> Result<bool> {
    let prompt = Prompt::new(
        "purge",
        "Remove v2ray together with its configuration, service files and user?",
        false,
    );
    ui.confirm(&prompt)
}

/// Whether files go under a staging directory instead of the live system.
///
/// Host accounts and services are left alone when staging.
pub fn is_staging(config: &HelperConfig) -> bool {
    config.root != std::path::Path::new("/")
}

/// Re-run as root unless already root, told not to, or on Homebrew.
///
/// Staging roots other than `/` never need elevation.
pub fn ensure_privileges(
    config: &HelperConfig,
    platform: &Platform,
    runner: &dyn CommandRunner,
    allow_elevate: bool,
) -> Result<()> {
    if is_elevated() || platform.init == InitSystem::Homebrew || is_staging(config) {
        return Ok(());
    }
    if !allow_elevate {
        return Err(HelperError::RootRequired {
            message: "run as root or drop --no-elevate".to_string(),
        });
    }
    relaunch_with_root(runner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::StaticAccounts;
    use crate::platform::OsKind;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn staged(temp: &TempDir) -> (HelperConfig, Platform) {
        let config = HelperConfig {
            root: temp.path().to_path_buf(),
            api_base: "http://127.0.0.1:9".to_string(),
            download_base: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        let platform = Platform::from_parts(OsKind::Linux, "x86_64", true).unwrap();
        (config, platform)
    }

    #[test]
    fn nothing_installed_in_empty_root() {
        let temp = TempDir::new().unwrap();
        let (config, platform) = staged(&temp);
        let runner = MockRunner::new();
        let accounts = StaticAccounts::new();
        let lifecycle = Lifecycle::new(&config, &platform, &runner, &accounts).unwrap();

        assert_eq!(lifecycle.installed_version(), None);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn installed_version_asks_the_binary() {
        let temp = TempDir::new().unwrap();
        let (config, platform) = staged(&temp);
        let binary = temp.path().join("opt/v2ray/v2ray");
        fs::create_dir_all(binary.parent().unwrap()).unwrap();
        fs::write(&binary, "").unwrap();

        let runner = MockRunner::new();
        runner.respond(
            &format!("{} --version", binary.display()),
            "V2Ray 4.21.3 (V2Fly, a community-driven edition of V2Ray.)",
        );
        let accounts = StaticAccounts::new();
        let lifecycle = Lifecycle::new(&config, &platform, &runner, &accounts).unwrap();

        assert_eq!(lifecycle.installed_version().as_deref(), Some("4.21.3"));
    }

    #[test]
    fn silent_binary_falls_back_to_receipt_then_unknown() {
        let temp = TempDir::new().unwrap();
        let (config, platform) = staged(&temp);
        let binary = temp.path().join("opt/v2ray/v2ray");
        fs::create_dir_all(binary.parent().unwrap()).unwrap();
        fs::write(&binary, "").unwrap();

        let runner = MockRunner::new();
        let accounts = StaticAccounts::new();
        let lifecycle = Lifecycle::new(&config, &platform, &runner, &accounts).unwrap();
        assert_eq!(lifecycle.installed_version().as_deref(), Some(UNKNOWN_VERSION));

        InstallReceipt::new("4.20.0", "v2ray-linux-64.zip")
            .save(&lifecycle.layout().receipt_path())
            .unwrap();
        assert_eq!(lifecycle.installed_version().as_deref(), Some("4.20.0"));
    }

    #[test]
    fn remove_without_install_fails_before_touching_anything() {
        let temp = TempDir::new().unwrap();
        let (config, platform) = staged(&temp);
        let runner = MockRunner::new();
        let accounts = StaticAccounts::new();
        let lifecycle = Lifecycle::new(&config, &platform, &runner, &accounts).unwrap();
        let mut ui = MockUI::new();

        let options = RunOptions {
            action: Action::Remove,
            ..Default::default()
        };
        let err = lifecycle.run(&options, &mut ui).unwrap_err();
        assert!(matches!(err, HelperError::NotInstalled { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn purge_declined_interactively() {
        let temp = TempDir::new().unwrap();
        let (config, platform) = staged(&temp);
        let runner = MockRunner::new();
        let accounts = StaticAccounts::new();
        let lifecycle = Lifecycle::new(&config, &platform, &runner, &accounts).unwrap();
        let mut ui = MockUI::new();
        ui.set_answer("purge", false);

        let options = RunOptions {
            action: Action::Purge,
            ..Default::default()
        };
        let err = lifecycle.run(&options, &mut ui).unwrap_err();
        assert!(matches!(err, HelperError::ConfirmationRequired));
        assert_eq!(ui.prompts_shown(), ["purge"]);
    }

    #[test]
    fn purge_with_sure_skips_the_prompt() {
        let temp = TempDir::new().unwrap();
        let (config, platform) = staged(&temp);
        let runner = MockRunner::new();
        let accounts = StaticAccounts::new();
        let lifecycle = Lifecycle::new(&config, &platform, &runner, &accounts).unwrap();
        let mut ui = MockUI::new();

        let options = RunOptions {
            action: Action::Purge,
            sure: true,
            ..Default::default()
        };
        lifecycle.run(&options, &mut ui).unwrap();
        assert!(ui.prompts_shown().is_empty());
        assert!(runner.ran("systemctl stop v2ray"));
    }

    #[test]
    fn pinned_tags_get_one_v_prefix() {
        assert_eq!(release_tag("4.22.1"), "v4.22.1");
        assert_eq!(release_tag("v4.22.1"), "v4.22.1");
        assert_eq!(release_tag("V4.22.1"), "v4.22.1");
    }

    #[test]
    fn staging_root_needs_no_privileges() {
        let temp = TempDir::new().unwrap();
        let (config, platform) = staged(&temp);
        let runner = MockRunner::new();
        assert!(ensure_privileges(&config, &platform, &runner, false).is_ok());
        assert!(runner.calls().is_empty());
    }
}
