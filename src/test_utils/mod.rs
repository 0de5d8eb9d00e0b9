//! Test utilities shared by unit and integration tests.
//!
//! Available under `cfg(test)` and with the `test-utils` feature, which the
//! integration suite enables through the self dev-dependency.
//!
//! - [`init_test_logging`] installs a tracing subscriber once per process
//! - [`ArchiveBuilder`] builds release-shaped zip archives in memory or on disk

use anyhow::{Context, Result};
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG` if it is set. Without either
/// no subscriber is installed. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

enum FixtureEntry {
    Dir(String),
    File {
        name: String,
        contents: Vec<u8>,
        mode: Option<u32>,
    },
}

/// Builder for zip archives shaped like GitHub release zipballs.
///
/// Every archive starts with the synthetic root directory. [`dir`](Self::dir)
/// and [`file`](Self::file) take names relative to that root; the `raw_*`
/// variants take the stored entry name verbatim, which is how tests produce
/// malicious entries.
///
/// ```rust,no_run
/// use rombot_updater::test_utils::ArchiveBuilder;
///
/// let bytes = ArchiveBuilder::new("root-abc123")
///     .file("data.txt", b"hello")
///     .dir("sub")
///     .file("sub/x.bin", &[0xDE, 0xAD, 0xBE, 0xEF])
///     .to_bytes()
///     .unwrap();
/// assert!(!bytes.is_empty());
/// ```
pub struct ArchiveBuilder {
    root: String,
    entries: Vec<FixtureEntry>,
}

impl ArchiveBuilder {
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            entries: vec![FixtureEntry::Dir(format!("{root}/"))],
            root,
        }
    }

    /// An archive with no entries at all.
    pub fn empty() -> Self {
        Self {
            root: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn dir(self, name: &str) -> Self {
        let stored = format!("{}/{}/", self.root, name.trim_end_matches('/'));
        self.raw_dir(&stored)
    }

    pub fn file(self, name: &str, contents: &[u8]) -> Self {
        let stored = format!("{}/{}", self.root, name);
        self.raw_file(&stored, contents)
    }

    pub fn file_with_mode(mut self, name: &str, contents: &[u8], mode: u32) -> Self {
        self.entries.push(FixtureEntry::File {
            name: format!("{}/{}", self.root, name),
            contents: contents.to_vec(),
            mode: Some(mode),
        });
        self
    }

    pub fn raw_dir(mut self, stored_name: &str) -> Self {
        self.entries.push(FixtureEntry::Dir(stored_name.to_string()));
        self
    }

    pub fn raw_file(mut self, stored_name: &str, contents: &[u8]) -> Self {
        self.entries.push(FixtureEntry::File {
            name: stored_name.to_string(),
            contents: contents.to_vec(),
            mode: None,
        });
        self
    }

    /// Serialize the archive into memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_into(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the archive to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_into(file)
    }

    fn write_into<W: Write + Seek>(&self, sink: W) -> Result<()> {
        let mut writer = ZipWriter::new(sink);
        let base = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in &self.entries {
            match entry {
                FixtureEntry::Dir(name) => {
                    writer
                        .add_directory(name.as_str(), base)
                        .with_context(|| format!("Failed to add directory {name}"))?;
                }
                FixtureEntry::File {
                    name,
                    contents,
                    mode,
                } => {
                    let options = match mode {
                        Some(mode) => base.unix_permissions(*mode),
                        None => base,
                    };
                    writer
                        .start_file(name.as_str(), options)
                        .with_context(|| format!("Failed to add file {name}"))?;
                    writer.write_all(contents)?;
                }
            }
        }

        writer.finish().context("Failed to finish archive")?;
        Ok(())
    }
}
