//! Zip extraction guarded against path traversal ("zip-slip").
//!
//! [`extract_archive`] unpacks every entry of a release archive under a
//! destination root and returns the extracted paths in archive order. Release
//! archives produced by GitHub contain a single synthetic top-level directory
//! (`<owner>-<repo>-<hash>/`), so the first returned path is that directory and
//! every later path has it as a prefix. The installer relies on this.
//!
//! # Safety
//!
//! Each entry name is joined to the destination root and normalised
//! lexically. If the result does not lie strictly inside the root, extraction
//! stops with [`UpdaterError::PathTraversal`] before anything is written for
//! that entry.
//!
//! # Partial Failure
//!
//! Extraction is not transactional. On failure the returned
//! [`ExtractionError`] carries the paths that were already created alongside
//! the cause.

use crate::core::{Result, UpdaterError};
use crate::utils::path_validation::{is_strictly_within, normalize_path};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use zip::ZipArchive;

#[cfg(unix)]
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Extraction failed part-way through.
#[derive(Debug, Error)]
#[error("archive extraction stopped after {} entries", extracted.len())]
pub struct ExtractionError {
    /// Paths created before the failure, in archive order.
    pub extracted: Vec<PathBuf>,
    /// What went wrong.
    #[source]
    pub kind: UpdaterError,
}

impl From<ExtractionError> for UpdaterError {
    fn from(err: ExtractionError) -> Self {
        debug!("Extraction aborted after {} entries", err.extracted.len());
        err.kind
    }
}

/// Extract `archive_path` under `dest_root`.
///
/// `dest_root` is created if missing. Returned paths are absolute and
/// normalised. Directory entries are created, file entries are written with
/// their stored unix permission bits (on unix), truncating anything already at
/// that path.
///
/// # Errors
///
/// - [`UpdaterError::ArchiveOpen`] if the file is missing or not a zip archive
/// - [`UpdaterError::PathTraversal`] if an entry escapes `dest_root`
/// - [`UpdaterError::Copy`] or [`UpdaterError::Io`] on write failures
///
/// # Examples
///
/// ```rust,no_run
/// use rombot_updater::archive::extract_archive;
/// use std::path::Path;
///
/// let paths = extract_archive(Path::new(".tmp/latest.zip"), Path::new(".tmp"))?;
/// println!("extracted {} entries under {}", paths.len(), paths[0].display());
/// # Ok::<(), rombot_updater::archive::ExtractionError>(())
/// ```
pub fn extract_archive(
    archive_path: &Path,
    dest_root: &Path,
) -> std::result::Result<Vec<PathBuf>, ExtractionError> {
    let mut extracted = Vec::new();
    match extract_into(archive_path, dest_root, &mut extracted) {
        Ok(()) => Ok(extracted),
        Err(kind) => Err(ExtractionError {
            extracted,
            kind,
        }),
    }
}

fn extract_into(archive_path: &Path, dest_root: &Path, extracted: &mut Vec<PathBuf>) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| open_error(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| open_error(archive_path, e))?;

    fs::create_dir_all(dest_root)
        .map_err(|e| UpdaterError::io("create extraction root", dest_root, e))?;
    let root = std::path::absolute(dest_root)
        .map(|p| normalize_path(&p))
        .map_err(|e| UpdaterError::io("resolve extraction root", dest_root, e))?;

    info!("Extracting {} entries from {} into {}", archive.len(), archive_path.display(), root.display());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| UpdaterError::ArchiveOpen {
            path: archive_path.display().to_string(),
            reason: format!("failed to read entry {index}: {e}"),
        })?;

        let target = normalize_path(&root.join(entry.name()));
        if !is_strictly_within(&target, &root) {
            return Err(UpdaterError::PathTraversal {
                path: target.display().to_string(),
            });
        }

        extracted.push(target.clone());

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| UpdaterError::io("create directory", &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| UpdaterError::io("create directory", parent, e))?;
        }

        let mut output = create_entry_file(&target, entry.unix_mode())?;
        io::copy(&mut entry, &mut output).map_err(|source| UpdaterError::Copy {
            path: target.display().to_string(),
            source,
        })?;
        debug!("Extracted {}", target.display());
    }

    Ok(())
}

fn open_error(archive_path: &Path, reason: impl std::fmt::Display) -> UpdaterError {
    UpdaterError::ArchiveOpen {
        path: archive_path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn create_entry_file(path: &Path, mode: Option<u32>) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let permissions = mode.map(|m| m & 0o777).filter(|m| *m != 0).unwrap_or(DEFAULT_FILE_MODE);
        options.mode(permissions);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path).map_err(|source| UpdaterError::Copy {
        path: path.display().to_string(),
        source,
    })
}
