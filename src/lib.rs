//! v2ray-helper - Install, upgrade and remove v2ray on Unix-like systems.
//!
//! The helper looks up the latest v2ray release, downloads and verifies the
//! archive for the host platform, places it on disk and wires the service up
//! with the host's init system (systemd, SysV, FreeBSD rc.d, OpenBSD rcctl or
//! Homebrew services on macOS).
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Layered YAML configuration and environment overrides
//! - [`download`] - Streaming downloads, checksum verification, zip extraction
//! - [`error`] - Error types and result aliases
//! - [`install`] - File placement, service user, default config, receipt
//! - [`platform`] - OS, architecture and init system detection
//! - [`release`] - Release lookup, metadata and version handling
//! - [`runner`] - Lifecycle decisions and orchestration
//! - [`service`] - Init-system integration
//! - [`shell`] - External command execution and privilege escalation
//! - [`templates`] - Embedded service files and default `config.json`
//! - [`ui`] - Prompts, spinners, progress bars and terminal output
//!
//! # Example
//!
//! ```
//! use v2ray_helper::runner::{plan, Action, Step};
//!
//! // Nothing installed yet: auto mode installs.
//! let step = plan(Action::Auto, None, "v4.22.1", false).unwrap();
//! assert_eq!(step, Step::Install);
//! ```
//!
//! For end-to-end flows against a mock release server, see the integration tests.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod install;
pub mod platform;
pub mod release;
pub mod runner;
pub mod service;
pub mod shell;
pub mod templates;
pub mod ui;

pub use error::{HelperError, Result};
