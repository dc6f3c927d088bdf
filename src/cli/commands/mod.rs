//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`]. The lifecycle actions
//! share one implementation, [`LifecycleCommand`], whether they arrive as a
//! subcommand (`v2ray-helper install`) or as a legacy flag (`-I`).

pub mod completions;
pub mod dispatcher;
pub mod lifecycle;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use lifecycle::LifecycleCommand;
