//! Installer for Linux, FreeBSD and OpenBSD.

use std::path::{Path, PathBuf};

use crate::download::{extract_zip, verify};
use crate::error::{HelperError, Result};
use crate::platform::local_ip;
use crate::release::Release;
use crate::service::{service_manager, ServiceAction, ServiceManager};
use crate::shell::which;
use crate::ui::UserInterface;

use super::accounts::AccountManager;
use super::config_file::{write_default_config, ServerIdentity};
use super::files::{
    ensure_dir, normalize_permissions, remove_if_exists, replace_dir, replace_symlink, DIR_MODE,
};
use super::layout::EXECUTABLES;
use super::receipt::InstallReceipt;
use super::{InstallContext, Installer};

/// Places release archives under [`super::Layout`] and wires up the service.
pub struct UnixInstaller<'a> {
    ctx: InstallContext<'a>,
    service: Box<dyn ServiceManager + 'a>,
}

impl<'a> UnixInstaller<'a> {
    /// Create an installer using the service manager for the platform's init system.
    pub fn new(ctx: InstallContext<'a>) -> Self {
        let service = service_manager(ctx.platform.init, ctx.runner, ctx.layout);
        Self { ctx, service }
    }

    fn accounts(&self) -> AccountManager<'a> {
        AccountManager::new(self.ctx.runner, self.ctx.accounts, self.ctx.platform.os.clone())
    }

    fn user(&self) -> &str {
        &self.ctx.config.service_user
    }

    /// Download, verify and unpack the release archive for this platform.
    ///
    /// Returns the asset name and the unpacked payload root.
    fn fetch_payload(
        &self,
        release: &Release,
        ui: &mut dyn UserInterface,
    ) -> Result<(String, PathBuf)> {
        let platform = self.ctx.platform;
        let asset = release
            .find_asset(platform)?
            .ok_or_else(|| HelperError::UnsupportedPlatform {
                os: platform.os.to_string(),
                machine: platform.machine.clone(),
            })?;

        let archive = self.ctx.scratch.join(&asset.name);
        let url = self.ctx.releases.download_url(&release.tag_name, &asset.name);
        let mut transfer = ui.start_transfer(&asset.name);
        self.ctx.downloader.fetch(&url, &archive, transfer.as_mut())?;

        if self.ctx.config.verify {
            match self.ctx.releases.metadata(&release.tag_name, &asset.name) {
                Ok(metadata) => verify(&archive, &metadata)?,
                Err(e @ HelperError::MetadataUnavailable { .. }) => {
                    tracing::error!("{}, validation process is skipped", e);
                    ui.warning(&format!("{}, validation process is skipped", e));
                }
                Err(e) => return Err(e),
            }
        } else {
            tracing::warn!("verification disabled, {} is not checked", asset.name);
        }

        let extracted = extract_zip(&archive, &self.ctx.scratch.join("payload"))?;
        remove_if_exists(&archive)?;
        Ok((asset.name.clone(), extracted))
    }

    /// Move the payload into the install directory and fix permissions.
    fn place_payload(&self, payload: &Path) -> Result<()> {
        let layout = self.ctx.layout;
        let install_dir = layout.host(&layout.install_dir);
        replace_dir(payload, &install_dir)?;
        normalize_permissions(&install_dir, &EXECUTABLES)
    }

    /// Link every shipped executable into the link directory.
    fn link_executables(&self) -> Result<()> {
        let layout = self.ctx.layout;
        for name in EXECUTABLES {
            let target = layout.executable(name);
            if !layout.host(&target).exists() {
                tracing::debug!("{} is not part of this release, no link created", name);
                continue;
            }
            replace_symlink(&target, &layout.host(&layout.link(name)))?;
        }
        Ok(())
    }

    fn write_receipt(&self, release: &Release, asset: &str) -> Result<()> {
        InstallReceipt::new(release.version(), asset).save(&self.ctx.layout.receipt_path())
    }

    /// BSD rc scripts expect a pid directory owned by the service user.
    fn prepare_pid_dir(&self) -> Result<()> {
        if !self.ctx.platform.os.is_bsd() {
            return Ok(());
        }
        let layout = self.ctx.layout;
        let pid_dir = layout.host(&layout.pid_dir);
        ensure_dir(&pid_dir, DIR_MODE)?;
        self.accounts().chown(&pid_dir, self.user())
    }

    /// Write the unit, prepare the pid directory and enable start at boot.
    fn install_service(&self) -> Result<()> {
        let layout = self.ctx.layout;
        self.service.install_unit(layout, self.user())?;
        self.prepare_pid_dir()?;
        self.service.set_autostart(layout, true)
    }

    fn report_identity(&self, identity: &ServerIdentity, ui: &mut dyn UserInterface) {
        let address = format!("{}:{}", local_ip(), identity.port);
        tracing::info!("v2ray is now bind on {}", address);
        ui.show_field("Address", &address);
        ui.show_field("UUID", &identity.uuid.to_string());
        ui.show_field("alterId", &identity.alter_id.to_string());
    }

    fn remove_links(&self) -> Result<()> {
        let layout = self.ctx.layout;
        for name in EXECUTABLES {
            remove_if_exists(&layout.host(&layout.link(name)))?;

            // Links from other installers only matter on the live system.
            if layout.root() == Path::new("/") {
                if let Some(found) = which(name) {
                    remove_if_exists(&found)?;
                }
            }
        }
        Ok(())
    }
}

impl Installer for UnixInstaller<'_> {
    fn install(&self, release: &Release, ui: &mut dyn UserInterface) -> Result<()> {
        let layout = self.ctx.layout;

        let (asset, payload) = self.fetch_payload(release, ui)?;
        self.place_payload(&payload)?;
        self.link_executables()?;

        self.accounts().ensure(self.user(), &layout.home_dir)?;

        tracing::info!("Installing {} service", self.service.name());
        let mut spinner = ui.start_spinner(&format!("Installing {} service", self.service.name()));
        match self.install_service() {
            Ok(()) => spinner.finish_success("Service installed"),
            Err(e) => {
                spinner.finish_error("Service installation failed");
                return Err(e);
            }
        }

        ensure_dir(&layout.host(&layout.config_dir), DIR_MODE)?;
        let identity = write_default_config(&layout.host(&layout.config_file()), self.ctx.config)?;

        self.write_receipt(release, &asset)?;
        self.service.control(ServiceAction::Start)?;

        tracing::info!("Successfully installed v2ray-{}", release.version());
        ui.success(&format!("Successfully installed v2ray-{}", release.version()));
        if let Some(identity) = identity {
            self.report_identity(&identity, ui);
        }
        Ok(())
    }

    fn upgrade(&self, release: &Release, ui: &mut dyn UserInterface) -> Result<()> {
        let (asset, payload) = self.fetch_payload(release, ui)?;
        self.place_payload(&payload)?;
        self.link_executables()?;
        self.write_receipt(release, &asset)?;

        self.service.control(ServiceAction::Restart)?;
        tracing::info!("Successfully upgraded to v2ray-{}", release.version());
        ui.success(&format!("Successfully upgraded to v2ray-{}", release.version()));
        Ok(())
    }

    fn remove(&self, ui: &mut dyn UserInterface) -> Result<()> {
        let layout = self.ctx.layout;
        tracing::info!("Uninstalling...");

        tracing::info!("Stop v2ray process");
        let stopped = self
            .service
            .control(ServiceAction::Stop)
            .and_then(|()| {
                tracing::info!("Disable auto start");
                self.service.set_autostart(layout, false)
            });
        if let Err(e) = stopped {
            tracing::debug!("service shutdown failed: {}", e);
            ui.warning("v2ray service file is not found!!!");
        }

        tracing::info!("Deleting symbol links");
        self.remove_links()?;

        tracing::info!("Deleting v2ray directory");
        remove_if_exists(&layout.host(&layout.install_dir))?;
        remove_if_exists(&layout.host(&layout.legacy_dir))?;

        ui.success("v2ray has been removed");
        Ok(())
    }

    fn purge(&self, confirmed: bool, ui: &mut dyn UserInterface) -> Result<()> {
        if !confirmed {
            return Err(HelperError::ConfirmationRequired);
        }
        let layout = self.ctx.layout;

        self.remove(ui)?;

        tracing::info!("Deleting configuration file");
        remove_if_exists(&layout.host(&layout.config_dir))?;

        tracing::info!("Deleting User/Group {}", self.user());
        self.accounts()
            .delete(self.user(), &layout.host(&layout.home_dir))?;

        tracing::info!("Deleting all other files");
        for path in self.service.unit_files(layout) {
            remove_if_exists(&path)?;
        }

        ui.success("v2ray has been purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HelperConfig;
    use crate::download::{build_client, Downloader};
    use crate::install::{Layout, StaticAccounts};
    use crate::platform::{OsKind, Platform};
    use crate::release::ReleaseClient;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        config: HelperConfig,
        platform: Platform,
        layout: Layout,
        runner: MockRunner,
        accounts: StaticAccounts,
        releases: ReleaseClient,
        downloader: Downloader,
    }

    impl Fixture {
        fn new(os: OsKind) -> Self {
            let temp = TempDir::new().unwrap();
            let config = HelperConfig::default();
            let platform = Platform::from_parts(os, "x86_64", true).unwrap();
            let layout = Layout::for_platform(&platform, temp.path(), "v2ray");
            let client = build_client(Duration::from_secs(1)).unwrap();
            Self {
                releases: ReleaseClient::with_client(client.clone(), &config),
                downloader: Downloader::new(client),
                temp,
                config,
                platform,
                layout,
                runner: MockRunner::new(),
                accounts: StaticAccounts::new().with_user("v2ray", 998, 998),
            }
        }

        fn installer(&self) -> UnixInstaller<'_> {
            UnixInstaller::new(InstallContext {
                config: &self.config,
                platform: &self.platform,
                layout: &self.layout,
                runner: &self.runner,
                accounts: &self.accounts,
                releases: &self.releases,
                downloader: &self.downloader,
                scratch: self.temp.path(),
            })
        }

        fn touch(&self, logical: &str) -> PathBuf {
            let path = self.layout.host(Path::new(logical));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "x").unwrap();
            path
        }
    }

    #[test]
    fn remove_stops_service_and_deletes_payload() {
        let fx = Fixture::new(OsKind::Linux);
        let binary = fx.touch("/opt/v2ray/v2ray");
        let legacy = fx.touch("/usr/local/v2ray/v2ray");
        let link = fx.touch("/usr/bin/v2ray");
        let config = fx.touch("/etc/v2ray/config.json");
        let mut ui = MockUI::new();

        fx.installer().remove(&mut ui).unwrap();

        assert_eq!(
            fx.runner.calls(),
            vec!["systemctl stop v2ray", "systemctl disable v2ray"]
        );
        assert!(!binary.exists());
        assert!(!legacy.exists());
        assert!(!link.exists());
        assert!(config.exists(), "remove keeps the configuration");
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn remove_warns_when_service_is_missing() {
        let fx = Fixture::new(OsKind::Linux);
        fx.runner.fail("systemctl stop v2ray", 5);
        let mut ui = MockUI::new();

        fx.installer().remove(&mut ui).unwrap();

        assert_eq!(ui.warnings(), ["v2ray service file is not found!!!"]);
        assert!(!fx.runner.ran("systemctl disable v2ray"));
    }

    #[test]
    fn purge_requires_confirmation() {
        let fx = Fixture::new(OsKind::Linux);
        let mut ui = MockUI::new();
        let err = fx.installer().purge(false, &mut ui).unwrap_err();
        assert!(matches!(err, HelperError::ConfirmationRequired));
        assert!(fx.runner.calls().is_empty());
    }

    #[test]
    fn purge_deletes_everything() {
        let fx = Fixture::new(OsKind::Linux);
        fx.touch("/opt/v2ray/v2ray");
        let config = fx.touch("/etc/v2ray/config.json");
        let unit = fx.touch("/etc/systemd/system/v2ray.service");
        let home = fx.touch("/var/lib/v2ray/.profile");
        let mut ui = MockUI::new();

        fx.installer().purge(true, &mut ui).unwrap();

        assert!(!config.exists());
        assert!(!unit.exists());
        assert!(!home.exists());
        assert!(fx.runner.ran("userdel v2ray"));
        assert!(fx.runner.ran("groupdel v2ray"));
        assert_eq!(ui.successes().last().map(String::as_str), Some("v2ray has been purged"));
    }

    #[test]
    fn freebsd_purge_clears_rc_conf_and_pid_dir() {
        let fx = Fixture::new(OsKind::FreeBsd);
        let rc_conf = fx.layout.host(Path::new("/etc/rc.conf"));
        fs::create_dir_all(rc_conf.parent().unwrap()).unwrap();
        fs::write(&rc_conf, "v2ray_enable=\"YES\"\n").unwrap();
        let script = fx.touch("/usr/local/etc/rc.d/v2ray");
        let pid = fx.touch("/var/run/v2ray/v2ray.pid");
        let mut ui = MockUI::new();

        fx.installer().purge(true, &mut ui).unwrap();

        assert_eq!(fs::read_to_string(&rc_conf).unwrap(), "");
        assert!(!script.exists());
        assert!(!pid.exists());
        assert!(fx.runner.ran("pw userdel v2ray"));
        assert!(fx.runner.ran("service v2ray stop"));
    }
}
