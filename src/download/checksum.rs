//! Download verification against published metadata.

use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{HelperError, Result};
use crate::release::{DigestKind, Metadata};

const BLOCK_SIZE: usize = 64 * 1024;

fn hash_file<D: Digest>(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = D::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// SHA-1 of a file as lower-case hex.
pub fn sha1_file(path: &Path) -> Result<String> {
    hash_file::<Sha1>(path)
}

/// SHA-256 of a file as lower-case hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    hash_file::<Sha256>(path)
}

/// Digest of a file with the given algorithm.
pub fn digest_file(kind: DigestKind, path: &Path) -> Result<String> {
    match kind {
        DigestKind::Sha1 => sha1_file(path),
        DigestKind::Sha256 => sha256_file(path),
    }
}

/// Check a downloaded file against its metadata.
///
/// The size (when published) and every published digest must match.
pub fn verify(path: &Path, metadata: &Metadata) -> Result<()> {
    if metadata.is_empty() {
        return Err(HelperError::Verification {
            message: "failed to perform validation, invalid metadata".to_string(),
        });
    }

    if let Some(expected) = metadata.size {
        let actual = std::fs::metadata(path)?.len();
        tracing::debug!("actual size {}, expected size {}", actual, expected);
        if actual != expected {
            return Err(HelperError::Verification {
                message: format!("expected Size {}, got {}.", expected, actual),
            });
        }
    }

    for (kind, expected) in &metadata.digests {
        let actual = digest_file(*kind, path)?;
        tracing::debug!("actual {} {}, expected {} {}", kind, actual, kind, expected);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(HelperError::Verification {
                message: format!("expected {} {}, got {}.", kind, expected, actual),
            });
        }
    }

    tracing::info!(
        "File {} has passed the validation.",
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const HELLO_SHA1: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn hello(temp: &TempDir) -> std::path::PathBuf {
        let path = temp.path().join("v2ray-linux-64.zip");
        std::fs::write(&path, "hello").unwrap();
        path
    }

    fn metadata(size: Option<u64>, digests: &[(DigestKind, &str)]) -> Metadata {
        Metadata {
            file: "v2ray-linux-64.zip".to_string(),
            size,
            digests: digests
                .iter()
                .map(|(k, v)| (*k, v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn known_digests() {
        let temp = TempDir::new().unwrap();
        let path = hello(&temp);
        assert_eq!(sha1_file(&path).unwrap(), HELLO_SHA1);
        assert_eq!(sha256_file(&path).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn verify_accepts_matching_file() {
        let temp = TempDir::new().unwrap();
        let path = hello(&temp);
        let meta = metadata(
            Some(5),
            &[(DigestKind::Sha1, HELLO_SHA1), (DigestKind::Sha256, HELLO_SHA256)],
        );
        assert!(verify(&path, &meta).is_ok());
    }

    #[test]
    fn verify_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let path = hello(&temp);
        let upper = HELLO_SHA1.to_uppercase();
        let meta = metadata(None, &[(DigestKind::Sha1, upper.as_str())]);
        assert!(verify(&path, &meta).is_ok());
    }

    #[test]
    fn verify_rejects_size_mismatch() {
        let temp = TempDir::new().unwrap();
        let path = hello(&temp);
        let meta = metadata(Some(6), &[(DigestKind::Sha1, HELLO_SHA1)]);
        let err = verify(&path, &meta).unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed, expected Size 6, got 5.");
    }

    #[test]
    fn verify_rejects_digest_mismatch() {
        let temp = TempDir::new().unwrap();
        let path = hello(&temp);
        let meta = metadata(Some(5), &[(DigestKind::Sha1, "deadbeef")]);
        let err = verify(&path, &meta).unwrap_err();
        assert!(err.to_string().contains("expected SHA1 deadbeef"));
    }

    #[test]
    fn verify_rejects_empty_metadata() {
        let temp = TempDir::new().unwrap();
        let path = hello(&temp);
        let err = verify(&path, &metadata(None, &[])).unwrap_err();
        assert!(err.to_string().contains("invalid metadata"));
    }
}
