//! Error types for v2ray-helper operations.
//!
//! This module defines [`HelperError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `HelperError` for conditions the user must act on
//! - Use `anyhow::Error` (via `HelperError::Other`) for unexpected errors
//! - Every message is printed verbatim by the CLI, so keep it actionable

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for v2ray-helper operations.
#[derive(Debug, Error)]
pub enum HelperError {
    /// The operating system or CPU architecture has no v2ray build.
    #[error("Unsupported platform: {os}/{machine}")]
    UnsupportedPlatform { os: String, machine: String },

    /// The release API could not be queried.
    #[error("Unable to fetch data from API: {message}")]
    ReleaseLookup { message: String },

    /// Release metadata (sizes and digests) is missing or unreachable.
    #[error("Unable to fetch the metadata for {file}: {message}")]
    MetadataUnavailable { file: String, message: String },

    /// A download failed.
    #[error("Unable to fetch url: {url} ({message})")]
    Download { url: String, message: String },

    /// A downloaded file did not match its published metadata.
    #[error("Assertion failed, {message}")]
    Verification { message: String },

    /// The release archive could not be unpacked.
    #[error("Unable to extract {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// `install` was requested while v2ray is present.
    #[error("v2ray is already installed, use --force to reinstall.")]
    AlreadyInstalled,

    /// `upgrade` or `remove` was requested while v2ray is absent.
    #[error("{message}")]
    NotInstalled { message: String },

    /// The installed version is already the newest release.
    #[error("You already installed the latest version, use --force to upgrade.")]
    AlreadyLatest,

    /// A destructive action was not confirmed.
    #[error("The following arguments are required: --sure")]
    ConfirmationRequired,

    /// Root privileges are needed and cannot be obtained.
    #[error("Sorry, cannot gain root privilege: {message}")]
    RootRequired { message: String },

    /// Homebrew is required on macOS.
    #[error("This tool requires Homebrew, please install Homebrew first")]
    HomebrewMissing,

    /// External command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Failed to read or parse a configuration file.
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HelperError {
    /// Build the error used when an upgrade finds nothing installed.
    pub fn not_installed_for_upgrade() -> Self {
        Self::NotInstalled {
            message: "v2ray must be installed before you can upgrade it.".to_string(),
        }
    }

    /// Build the error used when a removal finds nothing installed.
    pub fn not_installed_for_remove() -> Self {
        Self::NotInstalled {
            message: "v2ray is not installed, you cannot uninstall it.".to_string(),
        }
    }
}

/// Result type alias for v2ray-helper operations.
pub type Result<T> = std::result::Result<T, HelperError>;
