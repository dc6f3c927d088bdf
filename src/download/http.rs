//! HTTP downloads.
//!
//! Files are streamed to `<dest>.v2tmp` and renamed into place once complete,
//! so an interrupted transfer never leaves a truncated file at `dest`.

use anyhow::Context;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{HelperError, Result};
use crate::ui::{format_duration, format_size, TransferProgress};

/// User agent sent with every request; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("v2ray-helper/", env!("CARGO_PKG_VERSION"));

const CHUNK_SIZE: usize = 64 * 1024;

/// Build the blocking HTTP client shared by release lookup and downloads.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;
    Ok(client)
}

/// Streams files over HTTP/HTTPS.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Create a downloader around an HTTP client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` to `dest`, reporting bytes to `progress`.
    ///
    /// Returns the number of bytes written.
    pub fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn TransferProgress,
    ) -> Result<u64> {
        let failed = |message: String| HelperError::Download {
            url: url.to_string(),
            message,
        };

        let partial = partial_path(dest);
        remove_stale(&partial)?;

        tracing::debug!("downloading {} to {}", url, dest.display());
        let started = Instant::now();
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        progress.set_length(response.content_length());

        let mut file = File::create(&partial)?;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|e| failed(e.to_string()))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])?;
            written += read as u64;
            progress.advance(read as u64);
        }
        file.sync_all()?;
        drop(file);

        fs::rename(&partial, dest)?;
        progress.finish();
        tracing::info!(
            "Downloaded {} in {}",
            format_size(written),
            format_duration(started.elapsed())
        );
        Ok(written)
    }
}

/// Temporary path a download is written to before it completes.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".v2tmp");
    PathBuf::from(name)
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("removed stale partial download {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
