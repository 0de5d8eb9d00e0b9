//! Command-line interface for the updater.
//!
//! ```text
//! rombot_updater [OPTIONS] [ACTION] [REFERENCE]
//! ```
//!
//! `ACTION` is `update` (the default) or `check`. `REFERENCE` is a release
//! tag, or `latest` for the head of the default branch, and is only read by
//! `update`. An unknown action prints a notice and exits successfully so that
//! launchers passing stray arguments do not see a failure.
//!
//! # Examples
//!
//! ```bash
//! rombot_updater                   # install the latest snapshot
//! rombot_updater update v3.1       # install a tagged release
//! rombot_updater check             # list recent stable releases
//! rombot_updater -v --install-dir C:\rom-bot update
//! ```

mod check;
mod update;

use crate::config::UpdaterConfig;
use crate::release::{GitHubReleases, ReleaseRef};
use crate::updater::Updater;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Actions accepted as the first positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Check,
}

impl Action {
    /// Parse the action argument. A missing action means [`Action::Update`];
    /// an unknown one is returned as the error value.
    pub fn parse(action: Option<&str>) -> std::result::Result<Self, String> {
        match action {
            None | Some("update") => Ok(Self::Update),
            Some("check") => Ok(Self::Check),
            Some(other) => Err(other.to_string()),
        }
    }
}

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Level for the log filter when `RUST_LOG` is not set. `None` disables logging.
    pub log_level: Option<String>,
    /// Hide the download progress indicator.
    pub no_progress: bool,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
    /// Install root overriding the configuration file.
    pub install_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the level chosen by the flags. Log
    /// lines go to stderr so stdout only carries the command's own output.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the updater configuration and apply flag overrides.
    pub async fn load_updater_config(&self) -> Result<UpdaterConfig> {
        let mut config = UpdaterConfig::load(self.config_path.as_deref())
            .await
            .context("Failed to load updater configuration")?;

        if let Some(install_dir) = &self.install_dir {
            config = config.with_install_root(install_dir);
        }

        debug!("Install root: {}", config.install_root.display());
        Ok(config)
    }
}

/// Updater for the RoM bot.
#[derive(Parser, Debug)]
#[command(name = "rombot_updater", version, about, long_about = None)]
pub struct Cli {
    /// Action to run: `update` (default) or `check`
    action: Option<String>,

    /// Release tag to install, or `latest` for the default branch
    reference: Option<String>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long)]
    quiet: bool,

    /// Path to the updater configuration file
    #[arg(short, long, env = "ROMBOT_UPDATER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory to install into (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    install_dir: Option<PathBuf>,

    /// Hide the download progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
            install_dir: self.install_dir.clone(),
        }
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Run the selected action with an externally built [`CliConfig`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let action = match Action::parse(self.action.as_deref()) {
            Ok(action) => action,
            Err(invalid) => {
                println!("Invalid command: `{invalid}`");
                return Ok(());
            }
        };

        let updater_config = config.load_updater_config().await?;
        let source = GitHubReleases::new(&updater_config)?;
        let updater = Updater::new(updater_config, source)?.with_progress(!config.no_progress);

        match action {
            Action::Update => {
                let reference = ReleaseRef::parse(self.reference.as_deref());
                update::run(&updater, &reference).await
            }
            Action::Check => check::run(&updater).await,
        }
    }
}
