//! The update driver.
//!
//! [`Updater`] strings the pieces together in a fixed order:
//!
//! 1. resolve the [`ReleaseRef`] to an archive URL through a [`ReleaseSource`]
//! 2. download the archive into the staging directory
//! 3. extract it next to the archive
//! 4. install the extracted tree over the install root
//! 5. delete the cache file so the application rebuilds it
//!
//! Each step is awaited before the next starts. Extraction and installation
//! are synchronous file system work and run on the blocking thread pool.

use crate::archive::extract_archive;
use crate::config::UpdaterConfig;
use crate::core::{Result, UpdaterError};
use crate::installer::{InstallSummary, Installer, RenameAside};
use crate::release::{DownloadOutcome, Downloader, ReleaseRef, ReleaseSource, stable_tags};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// How an update run ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The release was downloaded and installed.
    Installed {
        reference: ReleaseRef,
        archive: PathBuf,
        summary: InstallSummary,
    },
    /// The archive server refused the download. Nothing on disk was changed.
    DownloadRejected { status: u16 },
}

/// Drives update and check runs for one installation.
pub struct Updater<S> {
    config: UpdaterConfig,
    source: S,
    downloader: Downloader,
}

impl<S: ReleaseSource> Updater<S> {
    pub fn new(config: UpdaterConfig, source: S) -> Result<Self> {
        let downloader = Downloader::new(&config.user_agent)?;
        Ok(Self {
            config,
            source,
            downloader,
        })
    }

    /// Show or hide the download progress indicator.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.downloader = self.downloader.show_progress(show_progress);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Download and install `reference`.
    ///
    /// Any error aborts the run at the step where it happened. Files installed
    /// before the failure stay in place.
    pub async fn update(&self, reference: &ReleaseRef) -> Result<UpdateOutcome> {
        info!("Updating to {}", reference);

        let url = self.source.archive_url(reference).await?;
        debug!("Archive for {} resolved to {}", reference, url);

        let archive = self.config.archive_path(reference);
        let archive = match self.downloader.download(&url, &archive).await? {
            DownloadOutcome::Saved(path) => path,
            DownloadOutcome::Rejected(status) => {
                return Ok(UpdateOutcome::DownloadRejected {
                    status,
                });
            }
        };

        let summary = self.extract_and_install(archive.clone()).await?;
        self.clear_cache().await;

        Ok(UpdateOutcome::Installed {
            reference: reference.clone(),
            archive,
            summary,
        })
    }

    /// Tags of the most recent stable releases, newest first.
    pub async fn check(&self) -> Result<Vec<String>> {
        let releases = self.source.list_releases(self.config.release_list_size).await?;
        debug!("Fetched {} releases", releases.len());
        Ok(stable_tags(&releases))
    }

    async fn extract_and_install(&self, archive: PathBuf) -> Result<InstallSummary> {
        let staging = self.config.staging_path();
        let installer = Installer::new(&self.config.install_root, &self.config.self_updater_name)
            .with_replacer(RenameAside::new(&self.config.aside_suffix));

        let task_staging = staging.clone();
        tokio::task::spawn_blocking(move || {
            let extracted = extract_archive(&archive, &task_staging)?;
            info!("Extracted {} entries from {}", extracted.len(), archive.display());
            installer.install(&extracted)
        })
        .await
        .map_err(|e| UpdaterError::io("run extraction task", &staging, io::Error::other(e)))?
    }

    /// Remove the cache file. A missing file is fine; other failures are
    /// logged and do not fail the update.
    async fn clear_cache(&self) {
        let cache = self.config.cache_path();
        match tokio::fs::remove_file(&cache).await {
            Ok(()) => info!("Removed cache file {}", cache.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cache file at {}", cache.display());
            }
            Err(e) => warn!("Failed to remove cache file {}: {}", cache.display(), e),
        }
    }
}
