//! Installation of an extracted release over the install root.
//!
//! The [`Installer`] consumes the ordered path list produced by
//! [`extract_archive`](crate::archive::extract_archive). The first path is the
//! archive's synthetic root directory; every other path is mapped to a
//! "real name" relative to the install root by stripping that prefix:
//!
//! ```text
//! .tmp/SolarStrike-Software-rom-bot-1a2b3c/            -> (root, skipped)
//! .tmp/SolarStrike-Software-rom-bot-1a2b3c/bot.lua     -> ./bot.lua
//! .tmp/SolarStrike-Software-rom-bot-1a2b3c/classes/    -> ./classes/
//! .tmp/SolarStrike-Software-rom-bot-1a2b3c/rombot_updater.exe
//!                                                      -> self-replace
//! ```
//!
//! Directories are recreated, regular files are overwritten unconditionally,
//! and the updater's own executable is routed through a [`SelfReplace`]
//! strategy. Installation is not transactional: a failure leaves the files
//! already copied in place.

mod self_replace;


pub use self_replace::{RenameAside, SelfReplace};

use crate::core::{Result, UpdaterError};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What an install run touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSummary {
    /// Directories ensured under the install root.
    pub directories: usize,
    /// Regular files copied (excluding the updater binary).
    pub files: usize,
    /// Whether the updater binary was replaced.
    pub self_replaced: bool,
}

/// Mirrors extracted files into an install root.
///
/// # Examples
///
/// ```rust,no_run
/// use rombot_updater::archive::extract_archive;
/// use rombot_updater::installer::Installer;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let extracted = extract_archive(Path::new(".tmp/latest.zip"), Path::new(".tmp"))?;
/// let summary = Installer::new(".", "rombot_updater.exe").install(&extracted)?;
/// println!("{} files installed", summary.files);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Installer<R = RenameAside> {
    install_root: PathBuf,
    self_updater_name: String,
    replacer: R,
}

impl Installer<RenameAside> {
    /// Create an installer using the default [`RenameAside`] strategy.
    pub fn new(install_root: impl Into<PathBuf>, self_updater_name: impl Into<String>) -> Self {
        Self {
            install_root: install_root.into(),
            self_updater_name: self_updater_name.into(),
            replacer: RenameAside::default(),
        }
    }
}

impl<R: SelfReplace> Installer<R> {
    /// Swap in a different self-replacement strategy.
    pub fn with_replacer<S: SelfReplace>(self, replacer: S) -> Installer<S> {
        Installer {
            install_root: self.install_root,
            self_updater_name: self.self_updater_name,
            replacer,
        }
    }

    #[must_use]
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Install every extracted entry below the archive root.
    ///
    /// Running this twice with the same list yields the same result as
    /// running it once.
    ///
    /// # Errors
    ///
    /// - [`UpdaterError::MalformedArchiveLayout`] if `extracted` is empty
    /// - [`UpdaterError::InvalidEntryName`] if an entry does not sit below the root
    /// - [`UpdaterError::Copy`] / [`UpdaterError::Rename`] / [`UpdaterError::Io`]
    ///   on file system failures
    pub fn install(&self, extracted: &[PathBuf]) -> Result<InstallSummary> {
        let (root, entries) =
            extracted.split_first().ok_or_else(|| UpdaterError::MalformedArchiveLayout {
                reason: "archive contained no entries".to_string(),
            })?;

        info!("Installing {} entries into {}", entries.len(), self.install_root.display());
        let mut summary = InstallSummary::default();

        for entry in entries {
            let real_name = real_name(root, entry)?;
            let destination = self.install_root.join(&real_name);

            let metadata = fs::metadata(entry)
                .map_err(|e| UpdaterError::io("inspect extracted entry", entry, e))?;

            if metadata.is_dir() {
                fs::create_dir_all(&destination)
                    .map_err(|e| UpdaterError::io("create directory", &destination, e))?;
                summary.directories += 1;
                continue;
            }

            if real_name.as_os_str() == OsStr::new(&self.self_updater_name) {
                self.replacer.replace_self(&destination, entry)?;
                summary.self_replaced = true;
                continue;
            }

            debug!("Installing {}", real_name.display());
            copy_file_contents(entry, &destination)?;
            summary.files += 1;
        }

        info!(
            "Installed {} files and {} directories{}",
            summary.files,
            summary.directories,
            if summary.self_replaced {
                " (updater replaced)"
            } else {
                ""
            }
        );
        Ok(summary)
    }
}

/// Path of `entry` relative to the archive `root`.
fn real_name(root: &Path, entry: &Path) -> Result<PathBuf> {
    match entry.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => Ok(relative.to_path_buf()),
        _ => Err(UpdaterError::InvalidEntryName {
            path: entry.display().to_string(),
        }),
    }
}

/// Overwrite `destination` with the bytes of `source`.
///
/// Missing parent directories are created. On unix the source permission bits
/// are applied so executables stay executable. The destination may be left
/// truncated if the copy fails.
pub(crate) fn copy_file_contents(source: &Path, destination: &Path) -> Result<()> {
    let copy_error = |path: &Path| {
        let path = path.display().to_string();
        move |source: io::Error| UpdaterError::Copy {
            path,
            source,
        }
    };

    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| UpdaterError::io("create directory", parent, e))?;
    }

    let mut reader = File::open(source).map_err(copy_error(source))?;
    let mut writer = File::create(destination).map_err(copy_error(destination))?;
    io::copy(&mut reader, &mut writer).map_err(copy_error(destination))?;

    #[cfg(unix)]
    {
        let permissions = reader.metadata().map_err(copy_error(source))?.permissions();
        fs::set_permissions(destination, permissions).map_err(copy_error(destination))?;
    }

    Ok(())
}
