//! Path validation utilities used to keep archive extraction inside its root.
//!
//! Archive entry names are untrusted input. Before anything is written, the
//! joined destination path is normalised lexically and checked against the
//! extraction root, so entries such as `../../etc/passwd` or `/etc/passwd`
//! are caught without touching the file system.

use std::path::{Component, Path, PathBuf};

/// Lexically normalise a path.
///
/// `.` components are dropped and `..` removes the preceding normal
/// component. A `..` directly below the root or a prefix is discarded, the
/// same way the operating system resolves `/..` to `/`. Leading `..`
/// components of a relative path are kept. Symlinks are not resolved.
///
/// # Examples
///
/// ```
/// use rombot_updater::utils::path_validation::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
/// assert_eq!(normalize_path(Path::new("/a/../../etc")), PathBuf::from("/etc"));
/// assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Returns `true` when `path` lies strictly inside `root`.
///
/// Both paths are expected to be normalised already. The comparison is
/// component-wise, so `/data/rootx` is not inside `/data/root`, and the root
/// itself is not considered to be inside itself.
#[must_use]
pub fn is_strictly_within(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}

/// Replace characters that are unsafe in a single file name.
///
/// Release references come from the command line and end up in the name of
/// the downloaded archive, so separators and other special characters are
/// mapped to `_`. An empty result becomes `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        sanitized
    }
}
