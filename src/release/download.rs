//! Streaming download of release archives.

use crate::core::{Result, UpdaterError};
use crate::utils::ProgressBar;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Result of a download attempt that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The body was written to this path.
    Saved(PathBuf),
    /// The server answered with something other than `200 OK`; nothing was written.
    Rejected(u16),
}

/// Downloads archives over HTTP, following redirects.
///
/// No timeout is applied, so a stalled connection blocks the update until it
/// is interrupted.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    show_progress: bool,
}

impl Downloader {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| UpdaterError::network("build HTTP client", e))?;

        Ok(Self {
            client,
            show_progress: true,
        })
    }

    /// Enable or disable the progress indicator.
    #[must_use]
    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Stream `url` into `destination`, creating parent directories.
    ///
    /// Only a `200 OK` response is written. Any other status is reported as
    /// [`DownloadOutcome::Rejected`] without touching the file system.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<DownloadOutcome> {
        let operation = "download archive";
        info!("Downloading {}", url);

        let mut response =
            self.client.get(url).send().await.map_err(|e| UpdaterError::network(operation, e))?;

        let status = response.status();
        info!("Download status {}", status);
        if status != StatusCode::OK {
            warn!("Download of {} rejected with {}", url, status);
            return Ok(DownloadOutcome::Rejected(status.as_u16()));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| UpdaterError::io("create staging directory", parent, e))?;
        }

        let mut file = fs::File::create(destination)
            .await
            .map_err(|e| UpdaterError::io("create archive file", destination, e))?;

        let progress = ProgressBar::download(response.content_length(), self.show_progress);
        progress.set_prefix("Downloading");

        while let Some(chunk) =
            response.chunk().await.map_err(|e| UpdaterError::network(operation, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| UpdaterError::io("write archive file", destination, e))?;
            progress.inc(chunk.len() as u64);
        }

        file.flush().await.map_err(|e| UpdaterError::io("write archive file", destination, e))?;
        progress.finish_and_clear();

        info!("Saved {} bytes to {}", progress.position(), destination.display());
        Ok(DownloadOutcome::Saved(destination.to_path_buf()))
    }
}
