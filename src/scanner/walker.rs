//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for lazily traversing a
//! directory tree and emitting the files and directories that are candidates
//! for duplicate detection.
//!
//! # Features
//!
//! - Depth pruning: directories deeper than the limit are never enumerated
//! - Case-insensitive extension exclusion for files
//! - Independent gating of file and directory entries
//! - Deterministic order (children sorted by file name)
//! - Per-directory errors are yielded and the walk continues
//! - Graceful shutdown via atomic flag
//!
//! # Depth
//!
//! The root is depth 0 and every directory below it is one deeper than its
//! parent. A [`WalkEntry`] carries the depth of the directory that contains
//! it, so with `max_depth = Some(d)` only directories at depth `d` or less
//! have their contents listed.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_max_depth(Some(1));
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! for item in walker.walk() {
//!     match item {
//!         Ok(found) => println!("{}", found.entry.describe()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{Entry, EntryKind, ScanError, WalkerConfig};

/// An entry emitted by the walker together with its depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// The discovered file or directory
    pub entry: Entry,
    /// Depth of the directory that contains the entry (root = 0)
    pub depth: usize,
}

/// Directory walker for entry discovery.
///
/// Symbolic links are never followed, so the walk cannot loop.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupescan::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, iteration stops before the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The root being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding entries in discovery order.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; the subtree that failed to enumerate is skipped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupescan::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let found: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} entries", found.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<WalkEntry, ScanError>> + '_ {
        // Entries are reported by their parent's depth, which is one less than
        // walkdir's depth. A directory at depth `d` lists children at walkdir
        // depth `d + 1`, so that is as far as walkdir needs to go.
        let mut walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(max_depth) = self.config.max_depth {
            walk_dir = walk_dir.max_depth(max_depth.saturating_add(1));
        }

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |item| match item {
                Ok(dent) => self.process_entry(dent).map(Ok),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Turn a walkdir entry into a [`WalkEntry`] if it passes the filters.
    fn process_entry(&self, dent: DirEntry) -> Option<WalkEntry> {
        // Skip the root directory itself
        if dent.depth() == 0 {
            return None;
        }
        let depth = dent.depth() - 1;
        let kind = classify(&dent);

        match kind {
            EntryKind::Directory if !self.config.include_dirs => {
                log::trace!("Not emitting directory: {}", dent.path().display());
                return None;
            }
            EntryKind::File if !self.config.include_files => return None,
            EntryKind::File => {
                let name = dent.file_name().to_string_lossy();
                if self.config.is_excluded(&name) {
                    log::trace!("Excluded by extension: {}", dent.path().display());
                    return None;
                }
            }
            EntryKind::Directory => {}
        }

        Some(WalkEntry {
            entry: Entry::new(dent.into_path(), kind),
            depth,
        })
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let message = error.to_string();

        let scan_error = match error.into_io_error() {
            Some(io_error) => ScanError::from_io(&path, io_error),
            None => ScanError::Io {
                path,
                source: io::Error::other(message),
            },
        };
        log::warn!("Walker error: {}", scan_error);
        scan_error
    }
}

/// Decide whether a walkdir entry is a file or a directory.
///
/// Links are not followed for traversal, but a link that resolves to a
/// directory is still reported as one.
fn classify(dent: &DirEntry) -> EntryKind {
    let file_type = dent.file_type();
    if file_type.is_dir() || (file_type.is_symlink() && dent.path().is_dir()) {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}
