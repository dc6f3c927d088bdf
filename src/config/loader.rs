//! Configuration file discovery and loading.
//!
//! Sources are applied in priority order (later overrides earlier):
//! 1. System config (`/etc/v2ray-helper/config.yml`)
//! 2. User config (`~/.config/v2ray-helper/config.yml`, or `$V2RAY_HELPER_USER_CONFIG`)
//! 3. Explicit `--config <path>`
//! 4. `V2RAY_HELPER_*` environment variables

use crate::config::schema::HelperConfig;
use crate::error::{HelperError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// System-wide config location.
pub const SYSTEM_CONFIG: &str = "/etc/v2ray-helper/config.yml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "V2RAY_HELPER_";

/// Points at the user config explicitly. Set when relaunching as root, whose
/// config directory differs from the invoking user's.
pub const USER_CONFIG_ENV: &str = "V2RAY_HELPER_USER_CONFIG";

/// The user config file, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    std::env::var_os(USER_CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("v2ray-helper").join("config.yml")))
        .filter(|p| p.exists())
}

/// Config files that exist on this machine, in merge order.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// `/etc/v2ray-helper/config.yml`
    pub system: Option<PathBuf>,

    /// `~/.config/v2ray-helper/config.yml`
    pub user: Option<PathBuf>,

    /// Path given on the command line.
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files, adding `explicit` last.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            system: Some(PathBuf::from(SYSTEM_CONFIG)).filter(|p| p.exists()),
            user: user_config_path(),
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// All paths in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        [&self.system, &self.user, &self.explicit]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Load the effective configuration.
///
/// A missing `explicit` file is an error; missing discovered files are not.
pub fn load_config(explicit: Option<&Path>) -> Result<HelperConfig> {
    let paths = ConfigPaths::discover(explicit);
    let mut config = load_paths(&paths)?;
    apply_env_overrides(&mut config, std::env::vars())?;
    Ok(config)
}

/// Load and merge the given config files.
pub fn load_paths(paths: &ConfigPaths) -> Result<HelperConfig> {
    let mut merged = Value::Mapping(Default::default());

    for path in paths.all() {
        tracing::debug!("loading config {}", path.display());
        let value = load_config_value(path)?;
        merged = overlay(merged, value);
    }

    serde_yaml::from_value(merged).map_err(|e| HelperError::Config {
        path: paths
            .explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG)),
        message: e.to_string(),
    })
}

/// Load one config file as raw YAML.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| HelperError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if content.trim().is_empty() {
        return Ok(Value::Mapping(Default::default()));
    }

    serde_yaml::from_str(&content).map_err(|e| HelperError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge `top` over `base`. Mappings merge key by key; anything else is replaced.
fn overlay(base: Value, top: Value) -> Value {
    match (base, top) {
        (Value::Mapping(mut base), Value::Mapping(top)) => {
            for (key, value) in top {
                let merged = match base.remove(&key) {
                    Some(existing) => overlay(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (_, top) => top,
    }
}

/// Apply `V2RAY_HELPER_*` variables from `vars` onto `config`.
pub fn apply_env_overrides<I>(config: &mut HelperConfig, vars: I) -> Result<()>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        match name {
            "REPO" => config.repo = value,
            "API_BASE" => config.api_base = value,
            "DOWNLOAD_BASE" => config.download_base = value,
            "ROOT" => config.root = PathBuf::from(value),
            "SERVICE_USER" => config.service_user = value,
            "TIMEOUT" => {
                config.timeout_secs = value.parse().map_err(|_| HelperError::Config {
                    path: PathBuf::from(format!("${key}")),
                    message: format!("expected a number of seconds, got '{}'", value),
                })?;
            }
            // Consumed by file discovery.
            "USER_CONFIG" => continue,
            _ => {
                tracing::debug!("ignoring unknown override {}", key);
                continue;
            }
        }
        tracing::debug!("config override from {}", key);
    }
    Ok(())
}
