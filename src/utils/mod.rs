//! Supporting utilities for path safety and progress output.

pub mod path_validation;
pub mod progress;

pub use path_validation::{is_strictly_within, normalize_path, sanitize_file_name};
pub use progress::ProgressBar;
