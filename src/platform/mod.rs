//! Host platform detection.
//!
//! This module provides:
//! - [`Platform`] detection (OS family, release architecture, init system)
//! - [`local_ip`] for reporting the address v2ray is reachable on

pub mod detection;
pub mod network;

pub use detection::{machine_name, Arch, InitSystem, OsKind, Platform};
pub use network::local_ip;
