//! rc.d integration for FreeBSD and OpenBSD.

use std::path::PathBuf;

use crate::error::Result;
use crate::install::files::{ensure_line, remove_lines, write_file, RC_SCRIPT_MODE};
use crate::install::Layout;
use crate::shell::CommandRunner;
use crate::templates;

use super::{service_file, template_vars, ServiceAction, ServiceManager, SERVICE_NAME};

const RC_KNOB: &str = "v2ray_enable";

fn rc_files(layout: &Layout) -> Vec<PathBuf> {
    service_file(layout)
        .into_iter()
        .chain(std::iter::once(layout.host(&layout.pid_dir)))
        .collect()
}

fn install_rc_script(layout: &Layout, template: &str, user: &str) -> Result<()> {
    let Some(path) = service_file(layout) else {
        return Ok(());
    };
    let script = templates::render_named(template, &template_vars(layout, user))?;
    write_file(&path, &script, RC_SCRIPT_MODE)
}

/// FreeBSD: `service(8)` plus `v2ray_enable` in `/etc/rc.conf`.
pub struct FreeBsdRc<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> FreeBsdRc<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl ServiceManager for FreeBsdRc<'_> {
    fn name(&self) -> &'static str {
        "rc.d"
    }

    fn control(&self, action: ServiceAction) -> Result<()> {
        self.runner
            .run_checked("service", &[SERVICE_NAME, action.as_str()])?;
        Ok(())
    }

    fn set_autostart(&self, layout: &Layout, enabled: bool) -> Result<()> {
        let Some(rc_conf) = layout.rc_conf.as_ref().map(|p| layout.host(p)) else {
            return Ok(());
        };

        if enabled {
            ensure_line(&rc_conf, RC_KNOB, &format!("{}=\"YES\"", RC_KNOB))?;
        } else {
            remove_lines(&rc_conf, RC_KNOB)?;
        }
        Ok(())
    }

    fn install_unit(&self, layout: &Layout, user: &str) -> Result<()> {
        install_rc_script(layout, templates::FREEBSD_SCRIPT, user)
    }

    fn unit_files(&self, layout: &Layout) -> Vec<PathBuf> {
        rc_files(layout)
    }
}

/// OpenBSD: everything goes through `rcctl(8)`.
pub struct OpenBsdRc<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> OpenBsdRc<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn rcctl(&self, verb: &str) -> Result<()> {
        self.runner.run_checked("rcctl", &[verb, SERVICE_NAME])?;
        Ok(())
    }
}

impl ServiceManager for OpenBsdRc<'_> {
    fn name(&self) -> &'static str {
        "rcctl"
    }

    fn control(&self, action: ServiceAction) -> Result<()> {
        self.rcctl(action.as_str())
    }

    fn set_autostart(&self, _layout: &Layout, enabled: bool) -> Result<()> {
        self.rcctl(if enabled { "enable" } else { "disable" })
    }

    fn install_unit(&self, layout: &Layout, user: &str) -> Result<()> {
        install_rc_script(layout, templates::OPENBSD_SCRIPT, user)
    }

    fn unit_files(&self, layout: &Layout) -> Vec<PathBuf> {
        rc_files(layout)
    }
}
