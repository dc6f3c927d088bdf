//! Record of what the helper installed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

/// Written next to the payload after every install and upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReceipt {
    /// Installed release, without the leading `v`.
    pub version: String,
    /// Archive the payload came from.
    pub asset: String,
    /// When the payload was placed.
    pub installed_at: DateTime<Utc>,
}

impl InstallReceipt {
    /// A receipt stamped with the current time.
    pub fn new(version: &str, asset: &str) -> Self {
        Self {
            version: version.to_string(),
            asset: asset.to_string(),
            installed_at: Utc::now(),
        }
    }

    /// Read a receipt. Missing or unreadable receipts yield `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::debug!("cannot read receipt {}: {}", path.display(), e);
                return None;
            }
        };

        serde_json::from_str(&text)
            .map_err(|e| tracing::warn!("ignoring malformed receipt {}: {}", path.display(), e))
            .ok()
    }

    /// Write the receipt as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;
        fs::write(path, json)?;
        tracing::debug!("wrote receipt {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("opt/v2ray/.v2ray-helper.json");
        let receipt = InstallReceipt::new("4.22.1", "v2ray-linux-64.zip");

        receipt.save(&path).unwrap();
        assert_eq!(InstallReceipt::load(&path), Some(receipt));
    }

    #[test]
    fn missing_receipt_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(InstallReceipt::load(&temp.path().join("nope.json")).is_none());
    }

    #[test]
    fn malformed_receipt_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("r.json");
        fs::write(&path, "{not json").unwrap();
        assert!(InstallReceipt::load(&path).is_none());
    }
}
