//! Published sizes and digests of release assets.
//!
//! Two formats exist. Older releases ship one `metadata.txt` for every asset:
//!
//! ```text
//! File: v2ray-linux-64.zip
//! Size: 10935862
//! SHA1: 4d3d1bf3b0d8b5e5ed6b1b1b62a4a9b7bc3e9c5e
//! SHA256: ...
//!
//! File: v2ray-linux-32.zip
//! ...
//! ```
//!
//! Newer ones publish `<asset>.dgst` next to each archive with `ALGO= hex`
//! lines and no size.

use std::collections::BTreeMap;
use std::fmt;

/// Digest algorithms the helper can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DigestKind {
    Sha1,
    Sha256,
}

impl DigestKind {
    /// Parse an algorithm label (`SHA1`, `SHA256`, `SHA2-256`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "SHA1" | "SHA-1" => Some(DigestKind::Sha1),
            "SHA256" | "SHA-256" | "SHA2-256" => Some(DigestKind::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestKind::Sha1 => f.write_str("SHA1"),
            DigestKind::Sha256 => f.write_str("SHA256"),
        }
    }
}

/// Expected properties of one release asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Asset file name.
    pub file: String,
    /// Size in bytes, when published.
    pub size: Option<u64>,
    /// Lower-case hex digests by algorithm.
    pub digests: BTreeMap<DigestKind, String>,
}

impl Metadata {
    /// Whether there is anything to verify against.
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.digests.is_empty()
    }
}

/// Extract the block for `file` from a `metadata.txt` body.
pub fn parse_metadata_txt(text: &str, file: &str) -> Option<Metadata> {
    let mut current: Option<Metadata> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if current.is_some() {
                break;
            }
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        if key.eq_ignore_ascii_case("File") {
            if current.is_some() {
                break;
            }
            if value == file {
                tracing::debug!("metadata for {} has been found", file);
                current = Some(Metadata {
                    file: file.to_string(),
                    ..Default::default()
                });
            }
            continue;
        }

        let Some(meta) = current.as_mut() else {
            continue;
        };
        if key.eq_ignore_ascii_case("Size") {
            meta.size = value.parse().ok();
        } else if let Some(kind) = DigestKind::from_label(key) {
            meta.digests.insert(kind, value.to_lowercase());
        }
    }

    current.filter(|m| !m.is_empty())
}

/// Parse a `<asset>.dgst` body.
pub fn parse_dgst(text: &str, file: &str) -> Option<Metadata> {
    let mut meta = Metadata {
        file: file.to_string(),
        ..Default::default()
    };

    for line in text.lines() {
        let Some((label, value)) = line.split_once('=') else {
            continue;
        };
        if let Some(kind) = DigestKind::from_label(label) {
            let value = value.trim();
            if !value.is_empty() {
                meta.digests.insert(kind, value.to_lowercase());
            }
        }
    }

    Some(meta).filter(|m| !m.is_empty())
}
