//! External command execution and privilege handling.

pub mod command;
pub mod mock;
pub mod privilege;
pub mod staging;

pub use command::{display_command, which, CommandResult, CommandRunner, SystemRunner};
pub use mock::MockRunner;
pub use privilege::{
    elevation_command, forwarded_env, is_ci, is_elevated, relaunch_with_root, Elevation,
};
pub use staging::StagingRunner;
