//! Release lookup and archive download.
//!
//! The updater only needs two things from the hosting service: a URL from
//! which a release archive can be downloaded, and the list of recent release
//! tags. Both are behind the [`ReleaseSource`] trait so the driver can be
//! exercised against a fake server. [`GitHubReleases`] is the production
//! implementation.
//!
//! # References
//!
//! A [`ReleaseRef`] is either a tag name or [`ReleaseRef::Latest`], which
//! selects the current snapshot of the repository's default branch rather than
//! the newest tagged release.

mod download;
mod github;

pub use download::{DownloadOutcome, Downloader};
pub use github::GitHubReleases;

use crate::constants::LATEST_REFERENCE;
use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Which snapshot of the repository to install.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReleaseRef {
    /// The head of the default branch.
    Latest,
    /// A specific tag.
    Tag(String),
}

impl ReleaseRef {
    /// Parse a reference given on the command line.
    ///
    /// A missing, empty or `latest` reference selects [`ReleaseRef::Latest`].
    ///
    /// ```
    /// use rombot_updater::release::ReleaseRef;
    ///
    /// assert_eq!(ReleaseRef::parse(None), ReleaseRef::Latest);
    /// assert_eq!(ReleaseRef::parse(Some("latest")), ReleaseRef::Latest);
    /// assert_eq!(ReleaseRef::parse(Some("v1.2")), ReleaseRef::Tag("v1.2".to_string()));
    /// ```
    #[must_use]
    pub fn parse(reference: Option<&str>) -> Self {
        match reference.map(str::trim) {
            None | Some("") | Some(LATEST_REFERENCE) => Self::Latest,
            Some(tag) => Self::Tag(tag.to_string()),
        }
    }

    /// Short name used for display and for the downloaded archive file.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Latest => LATEST_REFERENCE,
            Self::Tag(tag) => tag,
        }
    }

    /// The git ref passed to the archive endpoint.
    #[must_use]
    pub fn git_ref(&self, default_branch: &str) -> String {
        match self {
            Self::Latest => format!("refs/heads/{default_branch}"),
            Self::Tag(tag) => tag.clone(),
        }
    }
}

impl fmt::Display for ReleaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A published release as reported by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

impl Release {
    /// Neither a draft nor a prerelease.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        !self.draft && !self.prerelease
    }
}

/// Tag names of the stable releases, in the order given.
#[must_use]
pub fn stable_tags(releases: &[Release]) -> Vec<String> {
    releases.iter().filter(|r| r.is_stable()).map(|r| r.tag_name.clone()).collect()
}

/// Where releases come from.
pub trait ReleaseSource {
    /// Resolve `reference` to a URL serving the zip archive of that snapshot.
    fn archive_url(&self, reference: &ReleaseRef) -> impl Future<Output = Result<String>> + Send;

    /// The `limit` most recent releases, newest first, drafts included.
    fn list_releases(&self, limit: usize) -> impl Future<Output = Result<Vec<Release>>> + Send;
}
