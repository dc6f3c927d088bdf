//! Configuration schema for v2ray-helper.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration that targets the official v2ray releases.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// GitHub repository that publishes v2ray releases (`owner/name`).
    pub repo: String,

    /// Base URL of the GitHub REST API.
    pub api_base: String,

    /// Base URL release downloads are served from.
    pub download_base: String,

    /// Prefix every installed path is resolved under.
    pub root: PathBuf,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// System account the service runs as.
    pub service_user: String,

    /// Verify downloads against the release metadata.
    pub verify: bool,

    /// alterId reported for the generated VMess client.
    pub alter_id: u32,

    /// Inclusive range the generated inbound port is drawn from.
    pub port_range: [u16; 2],
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            repo: "v2ray/v2ray-core".to_string(),
            api_base: "https://api.github.com".to_string(),
            download_base: "https://github.com".to_string(),
            root: PathBuf::from("/"),
            timeout_secs: 30,
            service_user: "v2ray".to_string(),
            verify: true,
            alter_id: 64,
            port_range: [50000, 65535],
        }
    }
}

impl HelperConfig {
    /// HTTP timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Lower and upper bound of the generated port, ordered.
    pub fn port_bounds(&self) -> (u16, u16) {
        let [a, b] = self.port_range;
        (a.min(b), a.max(b))
    }
}
