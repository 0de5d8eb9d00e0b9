//! rombot-updater - self-updating installer for the RoM bot
//!
//! Downloads a release archive of the bot from GitHub, unpacks it into a
//! staging directory and mirrors its contents over the installation,
//! including the updater's own executable.
//!
//! # Architecture Overview
//!
//! An update run is a straight pipeline:
//!
//! ```text
//! ReleaseRef --resolve--> archive URL --download--> .tmp/<ref>.zip
//!            --extract--> .tmp/<root>/...  --install--> install root
//!            --clear cache--> done
//! ```
//!
//! - [`release`] resolves references and lists releases through the
//!   [`ReleaseSource`](release::ReleaseSource) trait, and streams archives to disk
//! - [`archive`] extracts zip archives and refuses entries that would escape
//!   the destination directory
//! - [`installer`] maps extracted paths onto the install root and hands the
//!   updater's own binary to a [`SelfReplace`](installer::SelfReplace) strategy
//! - [`updater`] orders the steps and clears the cache file afterwards
//! - [`cli`] parses arguments and prints results
//!
//! # Supporting Modules
//!
//! - [`config`] - `rombot-updater.toml` settings with built-in defaults
//! - [`constants`] - default values
//! - [`core`] - error types and user-facing error formatting
//! - [`utils`] - path normalisation and progress bars
//!
//! # Safety
//!
//! Every archive entry is normalised against the extraction directory before
//! anything is written. An entry such as `../../etc/passwd` aborts extraction
//! with [`UpdaterError::PathTraversal`](core::UpdaterError::PathTraversal).
//! Installation itself is not transactional.

pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod release;
pub mod updater;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
