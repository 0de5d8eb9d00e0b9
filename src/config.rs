//! Updater configuration.
//!
//! Everything the original tool hard-coded (repository coordinates, the
//! staging directory, the self-updater file name, the cache file) lives in
//! [`UpdaterConfig`]. Every field has a default, so an empty or missing
//! configuration file behaves exactly like the stock updater.
//!
//! # File Format
//!
//! ```toml
//! owner = "SolarStrike-Software"
//! repo = "rom-bot"
//! default_branch = "master"
//! install_root = "."
//! staging_dir = ".tmp"
//! self_updater_name = "rombot_updater.exe"
//! cache_file = "cache/texts.lua"
//! release_list_size = 10
//! pause_after_update_secs = 2
//! ```
//!
//! # Lookup Order
//!
//! 1. The path passed with `--config` (or `ROMBOT_UPDATER_CONFIG`)
//! 2. `rombot-updater.toml` in the current working directory
//! 3. Built-in defaults

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_ASIDE_SUFFIX, DEFAULT_BRANCH, DEFAULT_CACHE_FILE,
    DEFAULT_CONFIG_FILE, DEFAULT_OWNER, DEFAULT_PAUSE_AFTER_UPDATE_SECS,
    DEFAULT_RELEASE_LIST_SIZE, DEFAULT_REPO, DEFAULT_SELF_UPDATER_NAME, DEFAULT_STAGING_DIR,
    default_user_agent,
};
use crate::core::{Result, UpdaterError};
use crate::release::ReleaseRef;
use crate::utils::sanitize_file_name;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Settings for one updater installation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// GitHub organisation or user owning the repository.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// GitHub repository name.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Branch whose snapshot is installed for the `latest` reference.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Base URL of the GitHub REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Directory the release is installed into.
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// Staging directory for downloads, relative to `install_root` unless absolute.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// File name of the updater binary inside release archives.
    #[serde(default = "default_self_updater_name")]
    pub self_updater_name: String,

    /// Suffix for the previous updater binary kept after a self-replace.
    #[serde(default = "default_aside_suffix")]
    pub aside_suffix: String,

    /// Cache file removed after a successful install, relative to `install_root`.
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Number of releases requested when listing tags.
    #[serde(default = "default_release_list_size")]
    pub release_list_size: usize,

    /// User agent sent to GitHub.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Seconds to pause after a successful update (0 disables the pause).
    #[serde(default = "default_pause_after_update_secs")]
    pub pause_after_update_secs: u64,
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

fn default_repo() -> String {
    DEFAULT_REPO.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_install_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STAGING_DIR)
}

fn default_self_updater_name() -> String {
    DEFAULT_SELF_UPDATER_NAME.to_string()
}

fn default_aside_suffix() -> String {
    DEFAULT_ASIDE_SUFFIX.to_string()
}

fn default_cache_file() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}

const fn default_release_list_size() -> usize {
    DEFAULT_RELEASE_LIST_SIZE
}

const fn default_pause_after_update_secs() -> u64 {
    DEFAULT_PAUSE_AFTER_UPDATE_SECS
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
            default_branch: default_branch(),
            api_base_url: default_api_base_url(),
            install_root: default_install_root(),
            staging_dir: default_staging_dir(),
            self_updater_name: default_self_updater_name(),
            aside_suffix: default_aside_suffix(),
            cache_file: default_cache_file(),
            release_list_size: default_release_list_size(),
            user_agent: default_user_agent(),
            pause_after_update_secs: default_pause_after_update_secs(),
        }
    }
}

impl UpdaterConfig {
    /// Load the configuration following the lookup order described above.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file silently falls back to built-in values.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path).await
                } else {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and parse a specific configuration file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(path).await.map_err(|e| UpdaterError::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;

        toml::from_str(&content).map_err(|e| UpdaterError::Config {
            message: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// Override the install root.
    #[must_use]
    pub fn with_install_root(mut self, install_root: impl Into<PathBuf>) -> Self {
        self.install_root = install_root.into();
        self
    }

    /// Directory that receives the archive and its extracted contents.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        self.install_root.join(&self.staging_dir)
    }

    /// Where the archive for `reference` is downloaded to.
    #[must_use]
    pub fn archive_path(&self, reference: &ReleaseRef) -> PathBuf {
        self.staging_path().join(format!("{}.zip", sanitize_file_name(reference.name())))
    }

    /// Absolute or install-root-relative location of the cache file.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.install_root.join(&self.cache_file)
    }
}
