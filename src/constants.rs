//! Default values used throughout the updater.
//!
//! Each of these is the fallback for a field of
//! [`UpdaterConfig`](crate::config::UpdaterConfig) and can be overridden in
//! the configuration file.

/// GitHub organisation that publishes the bot.
pub const DEFAULT_OWNER: &str = "SolarStrike-Software";

/// GitHub repository of the bot.
pub const DEFAULT_REPO: &str = "rom-bot";

/// Branch used for the `latest` snapshot.
pub const DEFAULT_BRANCH: &str = "master";

/// Base URL of the GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Staging directory, relative to the install root, that receives the
/// downloaded archive and its extracted contents.
pub const DEFAULT_STAGING_DIR: &str = ".tmp";

/// File name of the updater executable as shipped inside release archives.
/// Matched case-sensitively.
pub const DEFAULT_SELF_UPDATER_NAME: &str = "rombot_updater.exe";

/// Suffix appended to the previous updater binary when it is moved aside.
pub const DEFAULT_ASIDE_SUFFIX: &str = ".old";

/// Cached derived text resource that must be rebuilt after an update.
pub const DEFAULT_CACHE_FILE: &str = "cache/texts.lua";

/// Number of releases requested by `check`.
pub const DEFAULT_RELEASE_LIST_SIZE: usize = 10;

/// Seconds to wait after a successful update before exiting.
pub const DEFAULT_PAUSE_AFTER_UPDATE_SECS: u64 = 2;

/// Reference name that selects the default-branch snapshot.
pub const LATEST_REFERENCE: &str = "latest";

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "rombot-updater.toml";

/// Environment variable holding an optional GitHub API token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// User agent sent with every request. GitHub rejects requests without one.
pub fn default_user_agent() -> String {
    format!("rombot-updater/{}", env!("CARGO_PKG_VERSION"))
}
