//! GitHub release lookup.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::HelperConfig;
use crate::download::build_client;
use crate::error::{HelperError, Result};
use crate::platform::Platform;

use super::metadata::{parse_dgst, parse_metadata_txt, Metadata};
use super::version::normalize;

/// A published release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Git tag, e.g. `v4.22.1`.
    pub tag_name: String,
    /// Marked as a pre-release on GitHub.
    #[serde(default)]
    pub prerelease: bool,
    /// Release page.
    #[serde(default)]
    pub html_url: Option<String>,
    /// Downloadable files.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable release file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File name, e.g. `v2ray-linux-64.zip`.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
    /// Size in bytes as reported by the API.
    #[serde(default)]
    pub size: u64,
}

impl Release {
    /// Tag without the leading `v`.
    pub fn version(&self) -> &str {
        normalize(&self.tag_name)
    }

    /// `"(pre release)"` for pre-releases, empty otherwise.
    pub fn pre_release_label(&self) -> &'static str {
        if self.prerelease {
            "(pre release)"
        } else {
            ""
        }
    }

    /// The archive built for `platform`.
    ///
    /// Returns `Ok(None)` on macOS, which installs through Homebrew.
    pub fn find_asset(&self, platform: &Platform) -> Result<Option<&Asset>> {
        let Some(fragment) = platform.asset_fragment() else {
            return Ok(None);
        };

        self.assets
            .iter()
            .find(|asset| asset.name.contains(&fragment))
            .map(Some)
            .ok_or_else(|| HelperError::UnsupportedPlatform {
                os: platform.os.to_string(),
                machine: platform.machine.clone(),
            })
    }
}

/// Queries the release API and the download server.
pub struct ReleaseClient {
    client: Client,
    api_base: String,
    download_base: String,
    repo: String,
}

impl ReleaseClient {
    /// Create a client from the helper configuration.
    pub fn new(config: &HelperConfig) -> Result<Self> {
        Ok(Self::with_client(build_client(config.timeout())?, config))
    }

    /// Create a client around an existing HTTP client.
    pub fn with_client(client: Client, config: &HelperConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            download_base: config.download_base.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
        }
    }

    /// The newest published release.
    pub fn latest(&self) -> Result<Release> {
        self.get_release(&format!(
            "{}/repos/{}/releases/latest",
            self.api_base, self.repo
        ))
    }

    /// The release for a specific tag.
    pub fn tagged(&self, tag: &str) -> Result<Release> {
        self.get_release(&format!(
            "{}/repos/{}/releases/tags/{}",
            self.api_base, self.repo, tag
        ))
    }

    /// Download URL of a release file.
    pub fn download_url(&self, tag: &str, file: &str) -> String {
        format!(
            "{}/{}/releases/download/{}/{}",
            self.download_base, self.repo, tag, file
        )
    }

    /// Published size and digests of `file`.
    ///
    /// Tries the release-wide `metadata.txt` first, then `<file>.dgst`.
    pub fn metadata(&self, tag: &str, file: &str) -> Result<Metadata> {
        tracing::info!("Fetch metadata for version {}", tag);

        let unavailable = |message: String| HelperError::MetadataUnavailable {
            file: file.to_string(),
            message,
        };

        match self.get_text(&self.download_url(tag, "metadata.txt")) {
            Ok(text) => {
                if let Some(meta) = parse_metadata_txt(&text, file) {
                    return Ok(meta);
                }
                tracing::debug!("metadata.txt has no entry for {}", file);
            }
            Err(e) => tracing::debug!("metadata.txt unavailable: {}", e),
        }

        let text = self
            .get_text(&self.download_url(tag, &format!("{}.dgst", file)))
            .map_err(|e| unavailable(e.to_string()))?;
        parse_dgst(&text, file).ok_or_else(|| unavailable("no usable digests".to_string()))
    }

    fn get_release(&self, url: &str) -> Result<Release> {
        tracing::debug!("GET {}", url);
        let lookup = |message: String| HelperError::ReleaseLookup { message };

        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|e| lookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(lookup(format!("HTTP {} from {}", response.status(), url)));
        }

        response
            .json()
            .map_err(|e| lookup(format!("invalid release JSON: {}", e)))
    }

    fn get_text(&self, url: &str) -> anyhow::Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            anyhow::bail!("HTTP {} fetching {}", response.status(), url);
        }
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::OsKind;

    fn release(names: &[&str]) -> Release {
        Release {
            tag_name: "v4.22.1".to_string(),
            prerelease: false,
            html_url: None,
            assets: names
                .iter()
                .map(|n| Asset {
                    name: n.to_string(),
                    browser_download_url: format!("https://example.com/{}", n),
                    size: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn deserializes_github_payload() {
        let json = r#"{
            "tag_name": "v4.22.1",
            "prerelease": true,
            "html_url": "https://github.com/v2ray/v2ray-core/releases/tag/v4.22.1",
            "assets": [
                {"name": "v2ray-linux-64.zip", "browser_download_url": "https://x/y.zip", "size": 42, "id": 1}
            ],
            "draft": false
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.version(), "4.22.1");
        assert_eq!(release.pre_release_label(), "(pre release)");
        assert_eq!(release.assets[0].size, 42);
    }

    #[test]
    fn find_asset_matches_platform() {
        let r = release(&["v2ray-linux-32.zip", "v2ray-linux-64.zip", "v2ray-linux-arm64.zip"]);
        let platform = Platform::from_parts(OsKind::Linux, "x86_64", true).unwrap();
        let asset = r.find_asset(&platform).unwrap().unwrap();
        assert_eq!(asset.name, "v2ray-linux-64.zip");
    }

    #[test]
    fn find_asset_missing_is_unsupported() {
        let r = release(&["v2ray-linux-64.zip"]);
        let platform = Platform::from_parts(OsKind::FreeBsd, "amd64", false).unwrap();
        assert!(matches!(
            r.find_asset(&platform),
            Err(HelperError::UnsupportedPlatform { .. })
        ));
    }

    #[test]
    fn find_asset_skips_macos() {
        let r = release(&[]);
        let platform = Platform::from_parts(OsKind::MacOs, "arm64", false).unwrap();
        assert!(r.find_asset(&platform).unwrap().is_none());
    }

    #[test]
    fn download_url_layout() {
        let config = HelperConfig {
            download_base: "https://github.com/".to_string(),
            ..Default::default()
        };
        let client = ReleaseClient::new(&config).unwrap();
        assert_eq!(
            client.download_url("v4.22.1", "metadata.txt"),
            "https://github.com/v2ray/v2ray-core/releases/download/v4.22.1/metadata.txt"
        );
    }
}
