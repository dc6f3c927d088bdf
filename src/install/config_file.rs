//! The default server configuration written on first install.

use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use crate::config::HelperConfig;
use crate::error::Result;
use crate::templates;

use super::files::{write_file, FILE_MODE};

/// Credentials generated for a fresh `config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    /// VMess client id.
    pub uuid: Uuid,
    /// Inbound port.
    pub port: u16,
    /// VMess alterId.
    pub alter_id: u32,
}

impl ServerIdentity {
    /// Random uuid and a random port from the configured range.
    pub fn generate(config: &HelperConfig) -> Self {
        let (low, high) = config.port_bounds();
        Self {
            uuid: Uuid::new_v4(),
            port: rand::rng().random_range(low..=high),
            alter_id: config.alter_id,
        }
    }

    /// Render the default `config.json` for this identity.
    pub fn render(&self) -> Result<String> {
        let vars = HashMap::from([
            ("uuid", self.uuid.to_string()),
            ("port", self.port.to_string()),
            ("alter_id", self.alter_id.to_string()),
        ]);
        templates::render_named(templates::DEFAULT_CONFIG, &vars)
    }
}

/// Write a fresh `config.json` to `path` unless one exists.
///
/// Returns the generated identity, or `None` when an existing file was kept.
pub fn write_default_config(path: &Path, config: &HelperConfig) -> Result<Option<ServerIdentity>> {
    if path.exists() {
        tracing::info!("{} already exists, skip installing config.json", path.display());
        return Ok(None);
    }

    let identity = ServerIdentity::generate(config);
    write_file(path, &identity.render()?, FILE_MODE)?;
    tracing::debug!("generated config.json with port {}", identity.port);
    Ok(Some(identity))
}
