//! External command execution.
//!
//! Every process the helper starts (`systemctl`, `useradd`, `brew`, ...) goes
//! through a [`CommandRunner`], so installers can be exercised in tests with
//! [`MockRunner`](super::MockRunner) instead of touching the host.

use crate::error::{HelperError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// Runs external programs.
pub trait CommandRunner {
    /// Run `program` with `args`, capturing its output.
    ///
    /// A non-zero exit is reported through [`CommandResult::success`], not as
    /// an error. Errors mean the program could not be started at all.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult>;

    /// Check whether `program` can be found on `PATH`.
    fn exists(&self, program: &str) -> bool;

    /// Run a command and turn a non-zero exit into [`HelperError::CommandFailed`].
    fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandResult> {
        let result = self.run(program, args)?;
        if result.success {
            Ok(result)
        } else {
            Err(HelperError::CommandFailed {
                command: display_command(program, args),
                code: result.exit_code,
            })
        }
    }
}

/// Runs commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult> {
        let start = Instant::now();
        tracing::debug!("exec: {}", display_command(program, args));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                tracing::debug!("failed to spawn {}: {}", program, e);
                HelperError::CommandFailed {
                    command: display_command(program, args),
                    code: None,
                }
            })?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(CommandResult::success(stdout, stderr, duration))
        } else {
            tracing::debug!(
                "{} exited with {:?}: {}",
                program,
                output.status.code(),
                stderr.trim()
            );
            Ok(CommandResult::failure(
                output.status.code(),
                stdout,
                stderr,
                duration,
            ))
        }
    }

    fn exists(&self, program: &str) -> bool {
        which(program).is_some()
    }
}

/// Find an executable on `PATH`.
pub fn which(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    which_in(program, std::env::split_paths(&path))
}

/// Find an executable in the given directories.
pub fn which_in<I>(program: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    if program.contains('/') {
        let candidate = PathBuf::from(program);
        return is_executable(&candidate).then_some(candidate);
    }

    dirs.into_iter()
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        metadata.is_file()
    }
}

/// Render a command line for logs and error messages.
pub fn display_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
