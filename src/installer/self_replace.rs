//! Replacement of the updater's own executable.
//!
//! The running updater cannot simply truncate its own binary: several
//! platforms refuse to open an executing image for writing. Renaming is
//! allowed, so the current binary is moved to an aside name first and the new
//! copy is written to the now free target path. The aside copy doubles as a
//! manual recovery point.
//!
//! Platforms that need a different strategy (for example staging the binary
//! and swapping it on the next launch) can provide their own [`SelfReplace`]
//! implementation and hand it to the
//! [`Installer`](crate::installer::Installer).

use super::copy_file_contents;
use crate::constants::DEFAULT_ASIDE_SUFFIX;
use crate::core::{Result, UpdaterError};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Strategy for swapping the updater executable.
pub trait SelfReplace {
    /// Replace the file at `target` with the contents of `source`.
    fn replace_self(&self, target: &Path, source: &Path) -> Result<()>;
}

/// Rename the current binary aside, then copy the new one into place.
///
/// At most one aside copy is kept: an existing one is removed before the
/// current binary is renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameAside {
    suffix: String,
}

impl Default for RenameAside {
    fn default() -> Self {
        Self::new(DEFAULT_ASIDE_SUFFIX)
    }
}

impl RenameAside {
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// The path the previous binary is moved to: `target` with the suffix appended.
    ///
    /// ```
    /// use rombot_updater::installer::RenameAside;
    /// use std::path::{Path, PathBuf};
    ///
    /// let aside = RenameAside::default().aside_path(Path::new("bot/rombot_updater.exe"));
    /// assert_eq!(aside, PathBuf::from("bot/rombot_updater.exe.old"));
    /// ```
    #[must_use]
    pub fn aside_path(&self, target: &Path) -> PathBuf {
        let mut name = OsString::from(target.as_os_str());
        name.push(&self.suffix);
        PathBuf::from(name)
    }
}

impl SelfReplace for RenameAside {
    fn replace_self(&self, target: &Path, source: &Path) -> Result<()> {
        let aside = self.aside_path(target);

        // A stale aside copy must not block the update.
        if aside.exists() {
            debug!("Removing previous aside copy {}", aside.display());
            if let Err(e) = fs::remove_file(&aside) {
                warn!("Could not remove {}: {}", aside.display(), e);
            }
        }

        if target.exists() {
            info!("Moving {} aside to {}", target.display(), aside.display());
            fs::rename(target, &aside).map_err(|source| UpdaterError::Rename {
                from: target.display().to_string(),
                to: aside.display().to_string(),
                source,
            })?;
        }

        copy_file_contents(source, target)?;
        info!("Installed new updater binary at {}", target.display());
        Ok(())
    }
}
