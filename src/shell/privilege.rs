//! Privilege detection and escalation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::{user_config_path, ENV_PREFIX, USER_CONFIG_ENV};
use crate::error::{HelperError, Result};

use super::command::CommandRunner;

/// Check if running in a CI environment.
///
/// Used to force non-interactive output in `main()`. Checks common CI
/// environment variables: `CI`, `GITHUB_ACTIONS`, `GITLAB_CI`, `CIRCLECI`,
/// `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// The command line used to re-run the helper as root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevation {
    /// Program to exec (`sudo` or `su`).
    pub program: String,
    /// Arguments passed to it.
    pub args: Vec<String>,
}

/// `V2RAY_HELPER_*` variables the elevated copy must see.
///
/// `user_config` is the invoking user's config file; it is passed on as
/// `V2RAY_HELPER_USER_CONFIG` unless that is already set.
pub fn forwarded_env<I>(vars: I, user_config: Option<PathBuf>) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();
    if !env.iter().any(|(key, _)| key == USER_CONFIG_ENV) {
        if let Some(path) = user_config {
            env.push((USER_CONFIG_ENV.to_string(), path.to_string_lossy().to_string()));
        }
    }
    env.sort();
    env
}

/// Work out how to re-run `exe args...` with root privileges, keeping `env`.
///
/// Prefers `sudo --preserve-env`; falls back to `su -c` with a shell-quoted
/// command line that sets `env` inline.
pub fn elevation_command(
    runner: &dyn CommandRunner,
    exe: &Path,
    args: &[String],
    env: &[(String, String)],
) -> Result<Elevation> {
    let exe = exe.to_string_lossy().to_string();

    if runner.exists("sudo") {
        tracing::debug!("found sudo, re-launching through it");
        let mut sudo_args = Vec::new();
        if !env.is_empty() {
            let names: Vec<&str> = env.iter().map(|(key, _)| key.as_str()).collect();
            sudo_args.push(format!("--preserve-env={}", names.join(",")));
        }
        sudo_args.push(exe);
        sudo_args.extend(args.iter().cloned());
        return Ok(Elevation {
            program: "sudo".to_string(),
            args: sudo_args,
        });
    }

    if runner.exists("su") {
        tracing::debug!("found su, re-launching through it");
        let assignments = env
            .iter()
            .map(|(key, value)| format!("{}={}", key, shell_quote(value)));
        let command = std::iter::once(exe.as_str())
            .chain(args.iter().map(String::as_str))
            .map(shell_quote);
        let line = assignments.chain(command).collect::<Vec<_>>().join(" ");
        return Ok(Elevation {
            program: "su".to_string(),
            args: vec!["-c".to_string(), line],
        });
    }

    Err(HelperError::RootRequired {
        message: "neither sudo nor su is available".to_string(),
    })
}

/// Replace the current process with an elevated copy of itself.
///
/// Only returns on failure.
pub fn relaunch_with_root(runner: &dyn CommandRunner) -> Result<()> {
    let exe = std::env::current_exe()?;
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a: OsString| a.to_string_lossy().to_string())
        .collect();

    let env = forwarded_env(std::env::vars(), user_config_path());
    let elevation = elevation_command(runner, &exe, &args, &env)?;
    tracing::info!("Re-launching with root privileges...");

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = std::process::Command::new(&elevation.program)
            .args(&elevation.args)
            .exec();
        Err(HelperError::RootRequired {
            message: format!("failed to exec {}: {}", elevation.program, err),
        })
    }

    #[cfg(not(unix))]
    {
        Err(HelperError::RootRequired {
            message: format!("cannot exec {} on this platform", elevation.program),
        })
    }
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use std::path::PathBuf;

    #[test]
    fn prefers_sudo() {
        let runner = MockRunner::with_programs(["sudo", "su"]);
        let elevation = elevation_command(
            &runner,
            &PathBuf::from("/usr/local/bin/v2ray-helper"),
            &["install".to_string(), "--force".to_string()],
            &[],
        )
        .unwrap();

        assert_eq!(elevation.program, "sudo");
        assert_eq!(
            elevation.args,
            vec!["/usr/local/bin/v2ray-helper", "install", "--force"]
        );
    }

    #[test]
    fn falls_back_to_su_with_quoted_line() {
        let runner = MockRunner::with_programs(["su"]);
        let elevation = elevation_command(
            &runner,
            &PathBuf::from("/opt/my tools/v2ray-helper"),
            &["--config".to_string(), "it's.yml".to_string()],
            &[],
        )
        .unwrap();

        assert_eq!(elevation.program, "su");
        assert_eq!(elevation.args[0], "-c");
        assert_eq!(
            elevation.args[1],
            r"'/opt/my tools/v2ray-helper' --config 'it'\''s.yml'"
        );
    }

    #[test]
    fn no_escalation_tool_is_an_error() {
        let runner = MockRunner::with_programs(Vec::<String>::new());
        let err = elevation_command(&runner, &PathBuf::from("/bin/x"), &[], &[]).unwrap_err();
        assert!(matches!(err, HelperError::RootRequired { .. }));
    }

    fn helper_env() -> Vec<(String, String)> {
        forwarded_env(
            vec![
                ("V2RAY_HELPER_REPO".to_string(), "v2fly/v2ray-core".to_string()),
                ("HOME".to_string(), "/home/alice".to_string()),
                ("V2RAY_HELPER_API_BASE".to_string(), "http://mirror.local".to_string()),
            ],
            Some(PathBuf::from("/home/alice/.config/v2ray-helper/config.yml")),
        )
    }

    #[test]
    fn forwarded_env_keeps_helper_variables_and_user_config() {
        assert_eq!(
            helper_env(),
            vec![
                ("V2RAY_HELPER_API_BASE".to_string(), "http://mirror.local".to_string()),
                ("V2RAY_HELPER_REPO".to_string(), "v2fly/v2ray-core".to_string()),
                (
                    "V2RAY_HELPER_USER_CONFIG".to_string(),
                    "/home/alice/.config/v2ray-helper/config.yml".to_string()
                ),
            ]
        );
    }

    #[test]
    fn forwarded_env_respects_explicit_user_config() {
        let env = forwarded_env(
            vec![("V2RAY_HELPER_USER_CONFIG".to_string(), "/srv/helper.yml".to_string())],
            Some(PathBuf::from("/home/alice/.config/v2ray-helper/config.yml")),
        );
        assert_eq!(
            env,
            vec![("V2RAY_HELPER_USER_CONFIG".to_string(), "/srv/helper.yml".to_string())]
        );
    }

    #[test]
    fn sudo_preserves_helper_env() {
        let runner = MockRunner::with_programs(["sudo"]);
        let elevation = elevation_command(
            &runner,
            &PathBuf::from("/usr/local/bin/v2ray-helper"),
            &["install".to_string()],
            &helper_env(),
        )
        .unwrap();

        assert_eq!(
            elevation.args,
            vec![
                "--preserve-env=V2RAY_HELPER_API_BASE,V2RAY_HELPER_REPO,V2RAY_HELPER_USER_CONFIG",
                "/usr/local/bin/v2ray-helper",
                "install",
            ]
        );
    }

    #[test]
    fn su_sets_helper_env_inline() {
        let runner = MockRunner::with_programs(["su"]);
        let env = vec![
            ("V2RAY_HELPER_REPO".to_string(), "v2fly/v2ray-core".to_string()),
            ("V2RAY_HELPER_USER_CONFIG".to_string(), "/home/a b/config.yml".to_string()),
        ];
        let elevation = elevation_command(
            &runner,
            &PathBuf::from("/usr/local/bin/v2ray-helper"),
            &["upgrade".to_string()],
            &env,
        )
        .unwrap();

        assert_eq!(
            elevation.args[1],
            "V2RAY_HELPER_REPO=v2fly/v2ray-core V2RAY_HELPER_USER_CONFIG='/home/a b/config.yml' \
             /usr/local/bin/v2ray-helper upgrade"
        );
    }

    #[test]
    fn shell_quote_leaves_plain_words() {
        assert_eq!(shell_quote("--debug"), "--debug");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
    }

    #[test]
    fn is_ci_does_not_panic() {
        let _ = is_ci();
        let _ = is_elevated();
    }
}
