//! Lifecycle orchestration.
//!
//! - [`plan`] maps an [`Action`] and the detected installation onto a [`Step`]
//! - [`Lifecycle`] detects the installation, fetches the release and runs the step
//! - [`ScratchDir`] holds downloads for the duration of one run

pub mod lifecycle;
pub mod plan;
pub mod scratch;

pub use lifecycle::{ensure_privileges, is_staging, Lifecycle, RunOptions, UNKNOWN_VERSION};
pub use plan::{plan, Action, Step};
pub use scratch::{ScratchDir, INTERRUPTED_EXIT_CODE};
