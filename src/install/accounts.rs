//! Service user and group management.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::Result;
use crate::platform::OsKind;
use crate::shell::CommandRunner;

/// Looks up users and groups in the system account database.
pub trait AccountLookup {
    /// `(uid, gid)` of a user, if it exists.
    fn user(&self, name: &str) -> Option<(u32, u32)>;

    /// Whether a group exists.
    fn group_exists(&self, name: &str) -> bool;
}

/// Account lookup through `getpwnam(3)` / `getgrnam(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

impl AccountLookup for SystemAccounts {
    #[cfg(unix)]
    fn user(&self, name: &str) -> Option<(u32, u32)> {
        let name = std::ffi::CString::new(name).ok()?;
        // SAFETY: name is a valid NUL-terminated string; the returned entry is
        // read immediately, before any other passwd call can overwrite it.
        unsafe {
            let entry = libc::getpwnam(name.as_ptr());
            if entry.is_null() {
                None
            } else {
                Some(((*entry).pw_uid, (*entry).pw_gid))
            }
        }
    }

    #[cfg(not(unix))]
    fn user(&self, _name: &str) -> Option<(u32, u32)> {
        None
    }

    #[cfg(unix)]
    fn group_exists(&self, name: &str) -> bool {
        let Ok(name) = std::ffi::CString::new(name) else {
            return false;
        };
        // SAFETY: name is a valid NUL-terminated string; only the pointer is inspected.
        unsafe { !libc::getgrnam(name.as_ptr()).is_null() }
    }

    #[cfg(not(unix))]
    fn group_exists(&self, _name: &str) -> bool {
        false
    }
}

/// Fixed account database for tests and staging roots.
#[derive(Debug, Clone, Default)]
pub struct StaticAccounts {
    users: HashMap<String, (u32, u32)>,
    groups: HashSet<String>,
}

impl StaticAccounts {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user and its primary group.
    pub fn with_user(mut self, name: &str, uid: u32, gid: u32) -> Self {
        self.users.insert(name.to_string(), (uid, gid));
        self.groups.insert(name.to_string());
        self
    }
}

impl AccountLookup for StaticAccounts {
    fn user(&self, name: &str) -> Option<(u32, u32)> {
        self.users.get(name).copied()
    }

    fn group_exists(&self, name: &str) -> bool {
        self.groups.contains(name)
    }
}

/// Creates and deletes the account v2ray runs as.
pub struct AccountManager<'a> {
    runner: &'a dyn CommandRunner,
    lookup: &'a dyn AccountLookup,
    os: OsKind,
}

impl<'a> AccountManager<'a> {
    /// Create a manager for `os`.
    pub fn new(runner: &'a dyn CommandRunner, lookup: &'a dyn AccountLookup, os: OsKind) -> Self {
        Self { runner, lookup, os }
    }

    /// FreeBSD manages accounts through `pw <verb>`.
    fn run(&self, verb: &str, args: &[&str]) -> Result<()> {
        if self.os == OsKind::FreeBsd {
            let mut full = vec![verb];
            full.extend_from_slice(args);
            self.runner.run_checked("pw", &full)?;
        } else {
            self.runner.run_checked(verb, args)?;
        }
        Ok(())
    }

    /// Arguments for creating `user` with `home`.
    pub fn useradd_args<'b>(&self, user: &'b str, home: &'b str) -> Vec<&'b str> {
        if self.os == OsKind::OpenBsd {
            vec!["-md", home, "-s", "/sbin/nologin", "-g", user, user]
        } else {
            vec![user, "-md", home, "-s", "/sbin/nologin", "-g", user]
        }
    }

    /// Create the group and the user when missing.
    ///
    /// An existing `home` is kept as it is; `useradd -m` adopts it.
    pub fn ensure(&self, user: &str, home: &Path) -> Result<()> {
        if self.lookup.group_exists(user) {
            tracing::debug!("group {} already exists", user);
        } else {
            tracing::info!("Creating group {}", user);
            self.run("groupadd", &[user])?;
        }

        if self.lookup.user(user).is_some() {
            tracing::debug!("user {} already exists", user);
            return Ok(());
        }

        tracing::info!("Creating user {}", user);
        let home = home.to_string_lossy();
        let args = self.useradd_args(user, &home);
        self.run("useradd", &args)
    }

    /// Delete the user (and its home) and the group, if present.
    pub fn delete(&self, user: &str, home_on_disk: &Path) -> Result<()> {
        if self.lookup.user(user).is_some() {
            tracing::info!("Deleting user {}", user);
            self.run("userdel", &[user])?;
            super::files::remove_if_exists(home_on_disk)?;
        }

        if self.lookup.group_exists(user) {
            tracing::info!("Deleting group {}", user);
            self.run("groupdel", &[user])?;
        }
        Ok(())
    }

    /// Hand `path` to `user`.
    ///
    /// Skipped with a warning when the user is unknown, so installs into a
    /// staging root still succeed.
    pub fn chown(&self, path: &Path, user: &str) -> Result<()> {
        let Some((uid, gid)) = self.lookup.user(user) else {
            tracing::warn!("user {} not found, leaving owner of {}", user, path.display());
            return Ok(());
        };

        #[cfg(unix)]
        std::os::unix::fs::chown(path, Some(uid), Some(gid))?;
        #[cfg(not(unix))]
        let _ = (uid, gid);

        tracing::debug!("chown {}:{} {}", uid, gid, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;

    #[test]
    fn linux_creates_group_then_user() {
        let runner = MockRunner::new();
        let lookup = StaticAccounts::new();
        let manager = AccountManager::new(&runner, &lookup, OsKind::Linux);

        manager.ensure("v2ray", Path::new("/var/lib/v2ray")).unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "groupadd v2ray",
                "useradd v2ray -md /var/lib/v2ray -s /sbin/nologin -g v2ray",
            ]
        );
    }

    #[test]
    fn freebsd_uses_pw() {
        let runner = MockRunner::new();
        let lookup = StaticAccounts::new();
        let manager = AccountManager::new(&runner, &lookup, OsKind::FreeBsd);

        manager.ensure("v2ray", Path::new("/var/lib/v2ray")).unwrap();

        assert!(runner.ran("pw groupadd v2ray"));
        assert!(runner.ran("pw useradd v2ray -md /var/lib/v2ray -s /sbin/nologin -g v2ray"));
    }

    #[test]
    fn openbsd_puts_name_last() {
        let runner = MockRunner::new();
        let lookup = StaticAccounts::new();
        let manager = AccountManager::new(&runner, &lookup, OsKind::OpenBsd);

        manager.ensure("v2ray", Path::new("/var/lib/v2ray")).unwrap();

        assert!(runner.ran("useradd -md /var/lib/v2ray -s /sbin/nologin -g v2ray v2ray"));
    }

    #[test]
    fn existing_accounts_are_left_alone() {
        let runner = MockRunner::new();
        let lookup = StaticAccounts::new().with_user("v2ray", 998, 998);
        let manager = AccountManager::new(&runner, &lookup, OsKind::Linux);

        manager.ensure("v2ray", Path::new("/var/lib/v2ray")).unwrap();
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn delete_removes_user_home_and_group() {
        let runner = MockRunner::new();
        let lookup = StaticAccounts::new().with_user("v2ray", 998, 998);
        let manager = AccountManager::new(&runner, &lookup, OsKind::Linux);
        let temp = tempfile::TempDir::new().unwrap();
        let home = temp.path().join("var/lib/v2ray");
        std::fs::create_dir_all(&home).unwrap();

        manager.delete("v2ray", &home).unwrap();

        assert_eq!(runner.calls(), vec!["userdel v2ray", "groupdel v2ray"]);
        assert!(!home.exists());
    }

    #[test]
    fn failed_useradd_is_an_error() {
        let runner = MockRunner::new();
        runner.fail("groupadd v2ray", 9);
        let lookup = StaticAccounts::new();
        let manager = AccountManager::new(&runner, &lookup, OsKind::Linux);

        let err = manager
            .ensure("v2ray", Path::new("/var/lib/v2ray"))
            .unwrap_err();
        assert!(err.to_string().contains("groupadd v2ray"));
    }

    #[test]
    fn chown_skips_unknown_user() {
        let runner = MockRunner::new();
        let lookup = StaticAccounts::new();
        let manager = AccountManager::new(&runner, &lookup, OsKind::Linux);
        let temp = tempfile::TempDir::new().unwrap();
        assert!(manager.chown(temp.path(), "v2ray").is_ok());
    }

    #[test]
    fn system_lookup_knows_root() {
        #[cfg(unix)]
        assert_eq!(SystemAccounts.user("root").map(|(uid, _)| uid), Some(0));
    }
}
