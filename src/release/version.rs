//! Version strings: normalization, comparison and installed-version probing.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::shell::CommandRunner;

/// Strip a leading `v`/`V` and surrounding whitespace.
pub fn normalize(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

/// Check whether two version strings name the same release.
pub fn same_version(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Equal
}

/// Compare versions to check if `latest` is newer than `current`.
pub fn is_newer(latest: &str, current: &str) -> bool {
    compare(latest, current) == Ordering::Greater
}

/// Compare dotted numeric versions component by component.
///
/// Missing components count as zero, so `4.22` equals `4.22.0`.
pub fn compare(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        normalize(v)
            .split(['.', '-', '+'])
            .map_while(|s| s.parse().ok())
            .collect()
    };

    let a_parts = parse(a);
    let b_parts = parse(b);
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let l = a_parts.get(i).copied().unwrap_or(0);
        let r = b_parts.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)v2ray\s+v?(\d+(?:\.\d+)*)").expect("version regex is valid")
    })
}

/// Extract the version from `v2ray --version` output.
///
/// ```
/// use v2ray_helper::release::version::parse_version_output;
///
/// let out = "V2Ray 4.22.1 (V2Fly, a community-driven edition of V2Ray.) Custom";
/// assert_eq!(parse_version_output(out).as_deref(), Some("4.22.1"));
/// ```
pub fn parse_version_output(output: &str) -> Option<String> {
    version_regex()
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Ask the installed `v2ray` binary for its version.
///
/// v2ray 4 answers `--version`; v5 only knows the `version` subcommand.
/// Returns `None` when v2ray is not installed or prints nothing recognizable.
pub fn installed_version(runner: &dyn CommandRunner, program: &str) -> Option<String> {
    for args in [&["--version"][..], &["version"][..]] {
        match runner.run(program, args) {
            Ok(result) if result.success => {
                if let Some(version) = parse_version_output(&result.stdout) {
                    tracing::debug!("{} reports version {}", program, version);
                    return Some(version);
                }
            }
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;

    #[test]
    fn normalize_strips_prefix() {
        assert_eq!(normalize("v4.22.1"), "4.22.1");
        assert_eq!(normalize(" V5.1.0 "), "5.1.0");
        assert_eq!(normalize("4.22.1"), "4.22.1");
    }

    #[test]
    fn is_newer_basic() {
        assert!(is_newer("v4.23.0", "4.22.1"));
        assert!(is_newer("5.0.0", "4.99.99"));
        assert!(is_newer("4.22.10", "4.22.9"));
    }

    #[test]
    fn is_newer_same_or_older() {
        assert!(!is_newer("4.22.1", "v4.22.1"));
        assert!(!is_newer("4.21.0", "4.22.1"));
    }

    #[test]
    fn missing_components_are_zero() {
        assert!(same_version("4.22", "v4.22.0"));
        assert!(is_newer("4.22.1", "4.22"));
    }

    #[test]
    fn suffixes_are_ignored() {
        assert!(same_version("v4.22.1-rc1", "4.22.1"));
    }

    #[test]
    fn parse_version_output_formats() {
        assert_eq!(
            parse_version_output("V2Ray v3.50 (die Commanderin) 20181211").as_deref(),
            Some("3.50")
        );
        assert_eq!(
            parse_version_output("V2Ray 5.4.1 (V2Fly, a community-driven edition of V2Ray.)")
                .as_deref(),
            Some("5.4.1")
        );
        assert_eq!(parse_version_output("command not found"), None);
    }

    #[test]
    fn installed_version_prefers_flag() {
        let runner = MockRunner::new();
        runner.respond("v2ray --version", "V2Ray 4.22.1 (V2Fly)");
        assert_eq!(installed_version(&runner, "v2ray").as_deref(), Some("4.22.1"));
        assert_eq!(runner.calls(), vec!["v2ray --version"]);
    }

    #[test]
    fn installed_version_falls_back_to_subcommand() {
        let runner = MockRunner::new();
        runner.fail("v2ray --version", 1);
        runner.respond("v2ray version", "V2Ray 5.7.0 (V2Fly)");
        assert_eq!(installed_version(&runner, "v2ray").as_deref(), Some("5.7.0"));
    }

    #[test]
    fn installed_version_none_when_absent() {
        let runner = MockRunner::new();
        runner.fail("v2ray --version", 127);
        runner.fail("v2ray version", 127);
        assert_eq!(installed_version(&runner, "v2ray"), None);
    }
}
