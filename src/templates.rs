//! Service scripts and the default configuration, embedded at compile time.
//!
//! Templates use `{{name}}` placeholders. Shell `${...}` expansions in the
//! rc scripts are left alone.

use include_dir::{include_dir, Dir};
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::error::{HelperError, Result};

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// systemd unit.
pub const SYSTEMD_UNIT: &str = "service/v2ray.service";
/// SysV init script.
pub const SYSV_SCRIPT: &str = "service/v2ray.sysv";
/// FreeBSD rc.d script.
pub const FREEBSD_SCRIPT: &str = "service/v2ray.freebsd";
/// OpenBSD rc.d script.
pub const OPENBSD_SCRIPT: &str = "service/v2ray.openbsd";
/// Default server configuration.
pub const DEFAULT_CONFIG: &str = "config.json";

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Raw text of an embedded template.
pub fn load(name: &str) -> Result<&'static str> {
    let file = TEMPLATES_DIR
        .get_file(name)
        .ok_or_else(|| HelperError::Config {
            path: PathBuf::from("templates").join(name),
            message: "template not found".to_string(),
        })?;

    file.contents_utf8().ok_or_else(|| HelperError::Config {
        path: PathBuf::from("templates").join(name),
        message: "Invalid UTF-8".to_string(),
    })
}

/// Replace every `{{name}}` in `template` with its value.
///
/// A placeholder without a value is an error rather than an empty string.
pub fn render(template: &str, vars: &HashMap<&str, String>) -> Result<String> {
    let mut missing: Option<String> = None;
    let rendered = placeholder().replace_all(template, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        match vars.get(key) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    if let Some(key) = missing {
        return Err(HelperError::Config {
            path: PathBuf::from("templates"),
            message: format!("no value for placeholder '{}'", key),
        });
    }
    Ok(rendered.into_owned())
}

/// Load and render an embedded template.
pub fn render_named(name: &str, vars: &HashMap<&str, String>) -> Result<String> {
    render(load(name)?, vars)
}
