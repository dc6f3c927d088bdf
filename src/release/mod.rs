//! Release discovery.
//!
//! This module provides:
//! - [`ReleaseClient`] for the GitHub releases API and release downloads
//! - [`metadata`] parsing of published sizes and digests
//! - [`version`] normalization, comparison and installed-version probing

pub mod api;
pub mod metadata;
pub mod version;

pub use api::{Asset, Release, ReleaseClient};
pub use metadata::{DigestKind, Metadata};
pub use version::{installed_version, is_newer, normalize, same_version};
