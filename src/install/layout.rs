//! Filesystem layout of an installation.
//!
//! Paths are kept in their logical form (what v2ray and the service files
//! see, e.g. `/opt/v2ray`) and mapped under the root prefix with
//! [`Layout::host`] when the helper touches them.

use std::path::{Component, Path, PathBuf};

use crate::platform::{InitSystem, OsKind, Platform};

/// Executables shipped in the release archive.
pub const EXECUTABLES: [&str; 2] = ["v2ray", "v2ctl"];

/// File name of the install receipt inside the install directory.
pub const RECEIPT_FILE: &str = ".v2ray-helper.json";

/// Every path the installer reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    /// Where the release payload lives.
    pub install_dir: PathBuf,
    /// Install directory used by older helper versions.
    pub legacy_dir: PathBuf,
    /// Directory holding the executable links.
    pub link_dir: PathBuf,
    /// Directory holding `config.json`.
    pub config_dir: PathBuf,
    /// Directory for the pid file.
    pub pid_dir: PathBuf,
    /// Home directory of the service user.
    pub home_dir: PathBuf,
    /// Service script or unit, if the init system uses one.
    pub service_file: Option<PathBuf>,
    /// `rc.conf` holding the enable knob (FreeBSD).
    pub rc_conf: Option<PathBuf>,
}

impl Layout {
    /// Compute the layout for `platform` under `root`.
    pub fn for_platform(platform: &Platform, root: &Path, user: &str) -> Self {
        let link_dir = if platform.os.is_bsd() {
            "/usr/local/bin"
        } else {
            "/usr/bin"
        };
        let config_dir = match platform.os {
            OsKind::FreeBsd | OsKind::MacOs => "/usr/local/etc/v2ray",
            _ => "/etc/v2ray",
        };
        let service_file = match platform.init {
            InitSystem::Systemd => Some("/etc/systemd/system/v2ray.service"),
            InitSystem::SysV => Some("/etc/init.d/v2ray"),
            InitSystem::FreeBsdRc => Some("/usr/local/etc/rc.d/v2ray"),
            InitSystem::OpenBsdRc => Some("/etc/rc.d/v2ray"),
            InitSystem::Homebrew => None,
        };
        let rc_conf = (platform.init == InitSystem::FreeBsdRc).then(|| PathBuf::from("/etc/rc.conf"));

        Self {
            root: root.to_path_buf(),
            install_dir: PathBuf::from("/opt/v2ray"),
            legacy_dir: PathBuf::from("/usr/local/v2ray"),
            link_dir: PathBuf::from(link_dir),
            config_dir: PathBuf::from(config_dir),
            pid_dir: PathBuf::from("/var/run/v2ray"),
            home_dir: PathBuf::from("/var/lib").join(user),
            service_file: service_file.map(PathBuf::from),
            rc_conf,
        }
    }

    /// The root prefix.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a logical absolute path under the root prefix.
    pub fn host(&self, logical: &Path) -> PathBuf {
        let relative: PathBuf = logical
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        self.root.join(relative)
    }

    /// Logical path of `config.json`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Logical path of an executable inside the install directory.
    pub fn executable(&self, name: &str) -> PathBuf {
        self.install_dir.join(name)
    }

    /// Logical path of an executable link.
    pub fn link(&self, name: &str) -> PathBuf {
        self.link_dir.join(name)
    }

    /// Host path of the install receipt.
    pub fn receipt_path(&self) -> PathBuf {
        self.host(&self.install_dir.join(RECEIPT_FILE))
    }

    /// Whether a payload is present in the install or legacy directory.
    pub fn has_payload(&self) -> bool {
        self.host(&self.executable("v2ray")).exists()
            || self.host(&self.legacy_dir.join("v2ray")).exists()
    }
}
