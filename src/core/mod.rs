//! Core types shared by every updater component.
//!
//! - [`UpdaterError`] is the typed failure taxonomy returned by the library
//! - [`ErrorContext`] and [`user_friendly_error`] turn errors into CLI output

pub mod error;

pub use error::{ErrorContext, UpdaterError, user_friendly_error};

/// Result alias used throughout the library.
pub type Result<T, E = UpdaterError> = std::result::Result<T, E>;
