//! systemd units.

use std::path::PathBuf;

use crate::error::Result;
use crate::install::files::{write_file, FILE_MODE};
use crate::install::Layout;
use crate::shell::CommandRunner;
use crate::templates;

use super::{service_file, template_vars, ServiceAction, ServiceManager, SERVICE_NAME};

/// Manages v2ray through `systemctl`.
pub struct Systemd<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Systemd<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn systemctl(&self, verb: &str) -> Result<()> {
        self.runner.run_checked("systemctl", &[verb, SERVICE_NAME])?;
        Ok(())
    }
}

impl ServiceManager for Systemd<'_> {
    fn name(&self) -> &'static str {
        "systemd"
    }

    fn control(&self, action: ServiceAction) -> Result<()> {
        self.systemctl(action.as_str())
    }

    fn set_autostart(&self, _layout: &Layout, enabled: bool) -> Result<()> {
        self.systemctl(if enabled { "enable" } else { "disable" })
    }

    fn install_unit(&self, layout: &Layout, user: &str) -> Result<()> {
        let Some(path) = service_file(layout) else {
            return Ok(());
        };
        let unit = templates::render_named(templates::SYSTEMD_UNIT, &template_vars(layout, user))?;
        write_file(&path, &unit, FILE_MODE)?;

        let reload = self.runner.run("systemctl", &["daemon-reload"])?;
        if !reload.success {
            tracing::warn!("systemctl daemon-reload failed: {}", reload.stderr.trim());
        }
        Ok(())
    }

    fn unit_files(&self, layout: &Layout) -> Vec<PathBuf> {
        service_file(layout).into_iter().collect()
    }
}
