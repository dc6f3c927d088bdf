//! SysV init scripts for Linux hosts without systemd.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::install::files::{write_file, DIR_MODE};
use crate::install::Layout;
use crate::shell::CommandRunner;
use crate::templates;

use super::{service_file, template_vars, ServiceAction, ServiceManager, SERVICE_NAME};

/// Manages v2ray through `/etc/init.d`.
pub struct SysV<'a> {
    runner: &'a dyn CommandRunner,
    /// Host path of the init script, run directly when `service` is missing.
    script: PathBuf,
}

impl<'a> SysV<'a> {
    pub fn new(runner: &'a dyn CommandRunner, layout: &Layout) -> Self {
        let script = service_file(layout)
            .unwrap_or_else(|| layout.host(&Path::new("/etc/init.d").join(SERVICE_NAME)));
        Self { runner, script }
    }
}

impl ServiceManager for SysV<'_> {
    fn name(&self) -> &'static str {
        "sysvinit"
    }

    fn control(&self, action: ServiceAction) -> Result<()> {
        if self.runner.exists("service") {
            self.runner
                .run_checked("service", &[SERVICE_NAME, action.as_str()])?;
        } else {
            let script = self.script.to_string_lossy();
            self.runner.run_checked(&script, &[action.as_str()])?;
        }
        Ok(())
    }

    fn set_autostart(&self, _layout: &Layout, enabled: bool) -> Result<()> {
        if self.runner.exists("update-rc.d") {
            if enabled {
                self.runner
                    .run_checked("update-rc.d", &[SERVICE_NAME, "defaults"])?;
            } else {
                self.runner
                    .run_checked("update-rc.d", &["-f", SERVICE_NAME, "remove"])?;
            }
        } else if self.runner.exists("chkconfig") {
            if enabled {
                self.runner.run_checked("chkconfig", &["--add", SERVICE_NAME])?;
                self.runner.run_checked("chkconfig", &[SERVICE_NAME, "on"])?;
            } else {
                self.runner.run_checked("chkconfig", &["--del", SERVICE_NAME])?;
            }
        } else {
            tracing::warn!(
                "Neither update-rc.d nor chkconfig found, v2ray will not {} at boot",
                if enabled { "start" } else { "stop starting" }
            );
        }
        Ok(())
    }

    fn install_unit(&self, layout: &Layout, user: &str) -> Result<()> {
        let Some(path) = service_file(layout) else {
            return Ok(());
        };
        let script = templates::render_named(templates::SYSV_SCRIPT, &template_vars(layout, user))?;
        write_file(&path, &script, DIR_MODE)
    }

    fn unit_files(&self, layout: &Layout) -> Vec<PathBuf> {
        service_file(layout)
            .into_iter()
            .chain(std::iter::once(layout.host(&layout.pid_dir)))
            .collect()
    }
}
