//! Operating system, architecture and init system detection.

use std::fmt;
use std::path::Path;

use crate::error::{HelperError, Result};

/// Operating system family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsKind {
    Linux,
    MacOs,
    FreeBsd,
    OpenBsd,
    Windows,
    Other(String),
}

impl OsKind {
    /// The OS this binary was built for.
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Parse an OS name (`std::env::consts::OS` or `uname -s`, any case).
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "linux" => OsKind::Linux,
            "macos" | "darwin" => OsKind::MacOs,
            "freebsd" => OsKind::FreeBsd,
            "openbsd" => OsKind::OpenBsd,
            "windows" => OsKind::Windows,
            other => OsKind::Other(other.to_string()),
        }
    }

    /// Name used in release asset file names.
    pub fn name(&self) -> &str {
        match self {
            OsKind::Linux => "linux",
            OsKind::MacOs => "darwin",
            OsKind::FreeBsd => "freebsd",
            OsKind::OpenBsd => "openbsd",
            OsKind::Windows => "windows",
            OsKind::Other(name) => name,
        }
    }

    /// Whether this is one of the BSDs.
    pub fn is_bsd(&self) -> bool {
        matches!(self, OsKind::FreeBsd | OsKind::OpenBsd)
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CPU architecture, as named by v2ray release assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X64,
    Arm,
    Arm64,
}

impl Arch {
    /// Map a machine name (`uname -m`) to a release architecture.
    pub fn from_machine(machine: &str) -> Option<Self> {
        match machine.to_lowercase().as_str() {
            "i386" | "i686" => Some(Arch::X86),
            "x86_64" | "amd64" => Some(Arch::X64),
            "armv7l" | "armv7" | "armv7hf" | "armv7hl" => Some(Arch::Arm),
            "aarch64" | "arm64" => Some(Arch::Arm64),
            _ => None,
        }
    }

    /// Suffix used in release asset names (`v2ray-linux-64.zip`).
    pub fn release_suffix(&self) -> &'static str {
        match self {
            Arch::X86 => "32",
            Arch::X64 => "64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
        }
    }
}

/// Init system used to manage the v2ray service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitSystem {
    Systemd,
    SysV,
    FreeBsdRc,
    OpenBsdRc,
    Homebrew,
}

impl InitSystem {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            InitSystem::Systemd => "systemd",
            InitSystem::SysV => "sysvinit",
            InitSystem::FreeBsdRc => "rc.d (FreeBSD)",
            InitSystem::OpenBsdRc => "rc.d (OpenBSD)",
            InitSystem::Homebrew => "brew services",
        }
    }
}

/// The host the helper is running on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system family.
    pub os: OsKind,
    /// Release architecture. `None` only on macOS, where Homebrew picks the build.
    pub arch: Option<Arch>,
    /// Raw machine name as reported by the kernel.
    pub machine: String,
    /// Service manager.
    pub init: InitSystem,
}

impl Platform {
    /// Detect the current host.
    pub fn detect() -> Result<Self> {
        let os = OsKind::current();
        let machine = machine_name();
        let has_systemd = Path::new("/run/systemd/system").is_dir();
        tracing::debug!("detected os={} machine={} systemd={}", os, machine, has_systemd);
        Self::from_parts(os, &machine, has_systemd)
    }

    /// Build a platform description from raw facts.
    pub fn from_parts(os: OsKind, machine: &str, has_systemd: bool) -> Result<Self> {
        let unsupported = || HelperError::UnsupportedPlatform {
            os: os.name().to_string(),
            machine: machine.to_string(),
        };

        let init = match &os {
            OsKind::Linux if has_systemd => InitSystem::Systemd,
            OsKind::Linux => InitSystem::SysV,
            OsKind::FreeBsd => InitSystem::FreeBsdRc,
            OsKind::OpenBsd => InitSystem::OpenBsdRc,
            OsKind::MacOs => InitSystem::Homebrew,
            OsKind::Windows | OsKind::Other(_) => return Err(unsupported()),
        };

        let arch = Arch::from_machine(machine);
        if arch.is_none() && os != OsKind::MacOs {
            return Err(unsupported());
        }

        Ok(Self {
            os,
            arch,
            machine: machine.to_string(),
            init,
        })
    }

    /// Release asset name fragment, e.g. `linux-64.zip`.
    ///
    /// `None` on macOS, which installs through Homebrew.
    pub fn asset_fragment(&self) -> Option<String> {
        if self.os == OsKind::MacOs {
            return None;
        }
        self.arch
            .map(|arch| format!("{}-{}.zip", self.os.name(), arch.release_suffix()))
    }

    /// A Linux host without systemd.
    pub fn is_legacy(&self) -> bool {
        self.init == InitSystem::SysV
    }

    /// One-line description for logs, e.g. `linux-64 (x86_64)`.
    pub fn describe(&self) -> String {
        match self.arch {
            Some(arch) => format!("{}-{} ({})", self.os, arch.release_suffix(), self.machine),
            None => format!("{} ({})", self.os, self.machine),
        }
    }
}

/// Machine hardware name from `uname(2)`.
#[cfg(unix)]
pub fn machine_name() -> String {
    // SAFETY: utsname is plain old data; zeroed is a valid initial value.
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: uts is a valid, writable utsname.
    if unsafe { libc::uname(&mut uts) } != 0 {
        return std::env::consts::ARCH.to_string();
    }
    // SAFETY: uname NUL-terminates every field on success.
    let machine = unsafe { std::ffi::CStr::from_ptr(uts.machine.as_ptr()) };
    machine.to_string_lossy().into_owned()
}

/// Machine hardware name; falls back to the compile-time architecture.
#[cfg(not(unix))]
pub fn machine_name() -> String {
    std::env::consts::ARCH.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_kind_from_name() {
        assert_eq!(OsKind::from_name("Linux"), OsKind::Linux);
        assert_eq!(OsKind::from_name("macos"), OsKind::MacOs);
        assert_eq!(OsKind::from_name("Darwin"), OsKind::MacOs);
        assert_eq!(OsKind::from_name("FreeBSD"), OsKind::FreeBsd);
        assert_eq!(OsKind::from_name("openbsd"), OsKind::OpenBsd);
        assert_eq!(OsKind::from_name("windows"), OsKind::Windows);
        assert_eq!(OsKind::from_name("haiku"), OsKind::Other("haiku".into()));
    }

    #[test]
    fn os_kind_release_names() {
        assert_eq!(OsKind::MacOs.name(), "darwin");
        assert_eq!(OsKind::Linux.to_string(), "linux");
        assert!(OsKind::FreeBsd.is_bsd());
        assert!(!OsKind::Linux.is_bsd());
    }

    #[test]
    fn arch_from_machine_is_case_insensitive() {
        assert_eq!(Arch::from_machine("x86_64"), Some(Arch::X64));
        assert_eq!(Arch::from_machine("AMD64"), Some(Arch::X64));
        assert_eq!(Arch::from_machine("i386"), Some(Arch::X86));
        assert_eq!(Arch::from_machine("armv7l"), Some(Arch::Arm));
        assert_eq!(Arch::from_machine("armv7hl"), Some(Arch::Arm));
        assert_eq!(Arch::from_machine("aarch64"), Some(Arch::Arm64));
        assert_eq!(Arch::from_machine("mips"), None);
    }

    #[test]
    fn arch_release_suffixes() {
        assert_eq!(Arch::X86.release_suffix(), "32");
        assert_eq!(Arch::X64.release_suffix(), "64");
        assert_eq!(Arch::Arm.release_suffix(), "arm");
        assert_eq!(Arch::Arm64.release_suffix(), "arm64");
    }

    #[test]
    fn linux_init_depends_on_systemd() {
        let modern = Platform::from_parts(OsKind::Linux, "x86_64", true).unwrap();
        assert_eq!(modern.init, InitSystem::Systemd);
        assert!(!modern.is_legacy());

        let legacy = Platform::from_parts(OsKind::Linux, "x86_64", false).unwrap();
        assert_eq!(legacy.init, InitSystem::SysV);
        assert!(legacy.is_legacy());
    }

    #[test]
    fn bsd_init_systems() {
        let free = Platform::from_parts(OsKind::FreeBsd, "amd64", false).unwrap();
        assert_eq!(free.init, InitSystem::FreeBsdRc);
        let open = Platform::from_parts(OsKind::OpenBsd, "amd64", false).unwrap();
        assert_eq!(open.init, InitSystem::OpenBsdRc);
    }

    #[test]
    fn unknown_machine_is_unsupported() {
        let err = Platform::from_parts(OsKind::Linux, "mips64", true).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported platform: linux/mips64");
    }

    #[test]
    fn windows_is_unsupported() {
        assert!(Platform::from_parts(OsKind::Windows, "x86_64", false).is_err());
        assert!(Platform::from_parts(OsKind::Other("haiku".into()), "x86_64", false).is_err());
    }

    #[test]
    fn macos_tolerates_unknown_machine() {
        let mac = Platform::from_parts(OsKind::MacOs, "Power Macintosh", false).unwrap();
        assert_eq!(mac.init, InitSystem::Homebrew);
        assert_eq!(mac.arch, None);
        assert_eq!(mac.asset_fragment(), None);
    }

    #[test]
    fn asset_fragment_combines_os_and_arch() {
        let p = Platform::from_parts(OsKind::Linux, "aarch64", true).unwrap();
        assert_eq!(p.asset_fragment().as_deref(), Some("linux-arm64.zip"));
        assert_eq!(p.describe(), "linux-arm64 (aarch64)");
    }

    #[test]
    fn machine_name_is_not_empty() {
        assert!(!machine_name().is_empty());
    }
}
