//! Fetching and unpacking release archives.
//!
//! - [`http`] - streaming downloads with progress reporting
//! - [`checksum`] - size and digest verification
//! - [`archive`] - zip extraction

pub mod archive;
pub mod checksum;
pub mod http;

pub use archive::extract_zip;
pub use checksum::{sha1_file, sha256_file, verify};
pub use http::{build_client, Downloader};
