//! Configuration loading.
//!
//! - [`schema`] - the [`HelperConfig`] structure and its defaults
//! - [`loader`] - file discovery, layering and environment overrides

pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, load_config, load_paths, user_config_path, ConfigPaths, ENV_PREFIX,
    USER_CONFIG_ENV,
};
pub use schema::HelperConfig;
