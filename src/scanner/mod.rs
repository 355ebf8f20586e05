//! Scanner module for directory traversal and content fingerprinting.
//!
//! This module provides functionality for:
//! - Depth-bounded, exclusion-aware directory walking using walkdir
//! - Streaming content fingerprints (MD5 by default, SHA-256 or BLAKE3)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and entry discovery
//! - [`hasher`]: Chunked file fingerprinting
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default()
//!     .with_max_depth(Some(2))
//!     .with_exclude_extensions(["tmp", "log"]);
//!
//! let walker = Walker::new(Path::new("."), config);
//! for item in walker.walk() {
//!     match item {
//!         Ok(found) => println!("{} (depth {})", found.entry.describe(), found.depth),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};


// Re-export main types
pub use hasher::{DigestAlgorithm, Fingerprint, Fingerprinter, CHUNK_SIZE};
pub use walker::{WalkEntry, Walker};

/// Kind of filesystem object discovered during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    /// A regular file (or a link that does not point at a directory)
    File,
    /// A directory
    Directory,
}

impl EntryKind {
    /// Human-readable label used in scanned-item lines and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// One filesystem object discovered during a walk.
///
/// Entries are immutable once created and end up in at most one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Path to the object, rooted at the scan root
    pub path: PathBuf,
    /// Whether this is a file or a directory
    pub kind: EntryKind,
}

impl Entry {
    /// Create a new entry.
    #[must_use]
    pub fn new(path: PathBuf, kind: EntryKind) -> Self {
        Self { path, kind }
    }

    /// Create a file entry.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::File)
    }

    /// Create a directory entry.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::Directory)
    }

    /// Bare name of the entry, exactly as the filesystem stores it.
    ///
    /// This is what name-based grouping compares.
    #[must_use]
    pub fn file_name(&self) -> OsString {
        self.path.file_name().map(OsString::from).unwrap_or_default()
    }

    /// Bare name for display. Non-UTF-8 bytes are replaced, so two distinct
    /// names may render the same.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Descriptive line recorded in the scanned-items list: `"<Kind>: <path>"`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}: {}", self.kind.label(), self.path.display())
    }
}

/// Configuration for directory walking.
///
/// Controls depth pruning, extension exclusion and which entry kinds are
/// emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Emit file entries.
    pub include_files: bool,

    /// Emit directory entries. Directories are descended into either way.
    pub include_dirs: bool,

    /// Deepest directory (relative to the root, root = 0) whose contents are
    /// enumerated. `None` walks the whole tree.
    pub max_depth: Option<usize>,

    /// Lower-cased extensions with a leading `.`; matching files are skipped.
    pub exclude_extensions: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            include_files: true,
            include_dirs: true,
            max_depth: None,
            exclude_extensions: Vec::new(),
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `include_files` - Whether file entries are emitted
    /// * `include_dirs` - Whether directory entries are emitted
    /// * `max_depth` - Optional depth limit
    /// * `exclude_extensions` - Extensions to skip, normalized on the way in
    #[must_use]
    pub fn new<I, S>(
        include_files: bool,
        include_dirs: bool,
        max_depth: Option<usize>,
        exclude_extensions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            include_files,
            include_dirs,
            max_depth,
            exclude_extensions: normalize_extensions(exclude_extensions),
        }
    }

    /// Set the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the excluded extensions (normalized).
    #[must_use]
    pub fn with_exclude_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_extensions = normalize_extensions(extensions);
        self
    }

    /// Check whether a file name ends with an excluded extension.
    ///
    /// The comparison is case-insensitive.
    #[must_use]
    pub fn is_excluded(&self, file_name: &str) -> bool {
        if self.exclude_extensions.is_empty() {
            return false;
        }
        let lower = file_name.to_lowercase();
        self.exclude_extensions
            .iter()
            .any(|ext| lower.ends_with(ext.as_str()))
    }
}

/// Normalize one extension: trimmed, lower-cased, with a leading `.`.
///
/// # Example
///
/// ```
/// use dupescan::scanner::normalize_extension;
///
/// assert_eq!(normalize_extension("txt"), ".txt");
/// assert_eq!(normalize_extension(" .PNG "), ".png");
/// ```
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Normalize a list of extensions, dropping duplicates but keeping order.
#[must_use]
pub fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for ext in extensions {
        let ext = normalize_extension(ext.as_ref());
        if !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }
    normalized
}

/// Errors that can occur while traversing the directory tree.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when reading a directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Any other I/O error while enumerating a directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::NotADirectory(p) => p,
            Self::Io { path, .. } => path,
        }
    }

    /// Short reason used in failed-item lines.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "Directory permission denied",
            Self::NotFound(_) => "Directory not found",
            Self::NotADirectory(_) => "Not a directory",
            Self::Io { .. } => "Directory read failed",
        }
    }

    /// Failed-item line: `"<reason>: <path>"`.
    #[must_use]
    pub fn failed_item(&self) -> String {
        format!("{}: {}", self.reason(), self.path().display())
    }
}

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that could not be read.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }

    /// Short reason used in failed-item lines.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "File not found",
            Self::PermissionDenied(_) => "File permission denied",
            Self::Io { .. } => "File read failed",
        }
    }

    /// Failed-item line: `"<reason>: <path>"`.
    #[must_use]
    pub fn failed_item(&self) -> String {
        format!("{}: {}", self.reason(), self.path().display())
    }
}
