//! Error handling for the updater
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`UpdaterError`]) are returned by every library
//!    component, so the extractor, installer and self-replacer never terminate
//!    the process themselves.
//! 2. **User-friendly messages** ([`ErrorContext`]) are produced only at the CLI
//!    edge, where an error is turned into a coloured message with details and a
//!    suggestion before the process exits.
//!
//! # Error Categories
//!
//! - **Network**: [`UpdaterError::Network`] for release lookups and downloads
//! - **Archive**: [`UpdaterError::ArchiveOpen`], [`UpdaterError::PathTraversal`]
//! - **Layout**: [`UpdaterError::MalformedArchiveLayout`], [`UpdaterError::InvalidEntryName`]
//! - **File system**: [`UpdaterError::Copy`], [`UpdaterError::Rename`], [`UpdaterError::Io`]
//! - **Configuration**: [`UpdaterError::Config`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use rombot_updater::core::{UpdaterError, user_friendly_error};
//!
//! let error = UpdaterError::PathTraversal {
//!     path: "/opt/rom-bot/evil.txt".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::io;
use thiserror::Error;

/// Every failure the updater can report.
///
/// None of these are recovered from inside the library. The orchestration
/// layer receives them as values and decides whether to terminate.
#[derive(Error, Debug)]
pub enum UpdaterError {
    /// The release lookup or the archive download failed.
    #[error("Network error: {operation}")]
    Network {
        /// What was being attempted (e.g. "resolve archive link for latest")
        operation: String,
        /// Underlying reason reported by the HTTP client or server
        reason: String,
    },

    /// The downloaded file is missing or is not a readable zip archive.
    #[error("Failed to open archive: {path}")]
    ArchiveOpen {
        /// Path of the archive on disk
        path: String,
        /// Reason reported by the zip reader
        reason: String,
    },

    /// An archive entry would be written outside the extraction root.
    #[error("Illegal file path in archive: {path}")]
    PathTraversal {
        /// The computed destination path that escaped the root
        path: String,
    },

    /// The extracted entry list does not have the expected single-root shape.
    #[error("Malformed archive layout: {reason}")]
    MalformedArchiveLayout {
        /// Description of what was wrong with the layout
        reason: String,
    },

    /// An extracted entry could not be mapped to a name under the install root.
    #[error("Could not determine install name for '{path}'")]
    InvalidEntryName {
        /// The extracted path that could not be mapped
        path: String,
    },

    /// Copying bytes into an installed file failed.
    #[error("Failed to copy file: {path}")]
    Copy {
        /// The file that was being read or written
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Moving the current updater binary aside failed.
    #[error("Failed to rename '{from}' to '{to}'")]
    Rename {
        /// The file being renamed
        from: String,
        /// The aside name it was being renamed to
        to: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Any other file system failure (creating directories, reading metadata).
    #[error("File system error: {operation} ({path})")]
    Io {
        /// What was being attempted
        operation: String,
        /// The path involved
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl UpdaterError {
    /// Build an [`UpdaterError::Network`] from anything printable.
    pub fn network(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Network {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an [`UpdaterError::Io`] for `path`.
    pub fn io(operation: impl Into<String>, path: &std::path::Path, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.display().to_string(),
            source,
        }
    }

    /// Short category name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::ArchiveOpen { .. } => "archive-open",
            Self::PathTraversal { .. } => "path-traversal",
            Self::MalformedArchiveLayout { .. } => "malformed-layout",
            Self::InvalidEntryName { .. } => "invalid-entry-name",
            Self::Copy { .. } => "copy",
            Self::Rename { .. } => "rename",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
        }
    }
}

/// An error message enriched with details and a suggestion for the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The primary message
    pub message: String,
    /// Optional explanation of what happened
    pub details: Option<String>,
    /// Optional hint on how to fix it
    pub suggestion: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colours.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for printing.
///
/// Known [`UpdaterError`] variants get tailored suggestions. Everything else
/// is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = message_with_chain(&error);

    if let Some(updater_error) = error.downcast_ref::<UpdaterError>() {
        return create_error_context(updater_error, message);
    }

    if let Some(io_error) = error.downcast_ref::<io::Error>()
        && io_error.kind() == io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(message)
            .with_suggestion("Run the updater from an account that can write to the installation directory");
    }

    ErrorContext::new(message)
}

fn create_error_context(error: &UpdaterError, message: String) -> ErrorContext {
    match error {
        UpdaterError::Network {
            reason,
            ..
        } => ErrorContext::new(message)
            .with_details(reason.clone())
            .with_suggestion("Check your internet connection and that GitHub is reachable, then try again"),
        UpdaterError::ArchiveOpen {
            reason,
            ..
        } => ErrorContext::new(message)
            .with_details(reason.clone())
            .with_suggestion("Delete the staging directory and run the update again to download a fresh archive"),
        UpdaterError::PathTraversal { .. } => ErrorContext::new(message)
            .with_details("The archive contains an entry that would be written outside the extraction directory")
            .with_suggestion("Do not install this archive; report the release to the maintainers"),
        UpdaterError::MalformedArchiveLayout { .. }
        | UpdaterError::InvalidEntryName { .. } => ErrorContext::new(message)
            .with_details("Release archives are expected to contain a single top-level directory")
            .with_suggestion("Try a different release tag, or report the release to the maintainers"),
        UpdaterError::Copy { .. } => ErrorContext::new(message)
            .with_details("The installation may now be partially updated")
            .with_suggestion("Close the bot and any editors holding its files, then run the update again"),
        UpdaterError::Rename { .. } => ErrorContext::new(message)
            .with_details("The current updater binary was left untouched")
            .with_suggestion("Make sure no other copy of the updater is running, then try again"),
        UpdaterError::Config { .. } => ErrorContext::new(message)
            .with_suggestion("Check the TOML syntax of the updater configuration file"),
        UpdaterError::Io { .. } => ErrorContext::new(message)
            .with_suggestion("Check that the installation directory exists and is writable"),
    }
}

fn message_with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();

    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}
