//! Plain-text audit log of one scan.
//!
//! # Layout
//!
//! ```text
//! Scan started: 2026-10-18 09:30:12.417
//! Scan root: /home/user/photos
//! Scan options:
//!   Check files: true
//!   ...
//!
//! Scanned items:
//! File: /home/user/photos/a.jpg
//! ...
//!
//! Failed items:
//! File permission denied: /home/user/photos/locked.jpg
//!
//! <text report>
//!
//! Scan ended: 2026-10-18 09:30:13.002
//! ```
//!
//! The `Failed items:` section is only written when something failed. A
//! scan that aborts gets a `Scan failed:` line in place of the items and the
//! report, and the log is still closed with its end timestamp.
//!
//! # Naming
//!
//! File names come from a [`LogNameProvider`]. Each candidate is opened with
//! `create_new`, so an existing log is never overwritten and the existence
//! check cannot race with another process.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::duplicates::{ScanOptions, ScanResult};
use crate::scanner::DigestAlgorithm;

/// Suffix shared by every audit log file name.
pub const LOG_SUFFIX: &str = "_dupescan-log.txt";

/// Candidate names tried before giving up.
pub const MAX_NAME_ATTEMPTS: u32 = 1000;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Errors raised while writing an audit log.
#[derive(thiserror::Error, Debug)]
pub enum AuditLogError {
    /// The log directory or file could not be created or written.
    #[error("Audit log I/O error for {path}: {source}")]
    Io {
        /// Path being written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Every candidate name already exists.
    #[error("No free audit log name in {0} after {MAX_NAME_ATTEMPTS} attempts")]
    NamesExhausted(PathBuf),
}

/// Supplies candidate file names for the audit log.
pub trait LogNameProvider {
    /// Candidate name for the given attempt (0-based).
    fn name(&self, attempt: u32) -> String;
}

/// Default provider: `<session-timestamp>_<counter>_dupescan-log.txt`.
///
/// The session timestamp is fixed when the provider is created; the counter
/// is the attempt number as four base-36 digits.
#[derive(Debug, Clone)]
pub struct SessionNameProvider {
    session: String,
}

impl SessionNameProvider {
    /// Provider stamped with the current local time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(Local::now().format("%Y%m%d%H%M%S%3f").to_string())
    }

    /// Provider with an explicit session stamp.
    #[must_use]
    pub fn with_session(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }
}

impl Default for SessionNameProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LogNameProvider for SessionNameProvider {
    fn name(&self, attempt: u32) -> String {
        format!("{}_{}{}", self.session, base36(attempt, 4), LOG_SUFFIX)
    }
}

/// Lower-case base-36 rendering of `n`, zero-padded to `width` digits.
fn base36(mut n: u32, width: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::with_capacity(width);
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    while out.len() < width {
        out.push(b'0');
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// An open, append-only audit log.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl AuditLog {
    /// Create a fresh log file in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Io`] if the directory or file cannot be
    /// created, and [`AuditLogError::NamesExhausted`] if every candidate name
    /// is taken.
    pub fn create(dir: &Path, names: &dyn LogNameProvider) -> Result<Self, AuditLogError> {
        fs::create_dir_all(dir).map_err(|source| AuditLogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(names.name(attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    log::debug!("Audit log: {}", path.display());
                    return Ok(Self {
                        path,
                        writer: BufWriter::new(file),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    log::trace!("Audit log name taken: {}", path.display());
                }
                Err(source) => return Err(AuditLogError::Io { path, source }),
            }
        }

        Err(AuditLogError::NamesExhausted(dir.to_path_buf()))
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the start timestamp, the scan root and the options.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Io`] if writing fails.
    pub fn write_header(
        &mut self,
        root: &Path,
        options: &ScanOptions,
        digest: DigestAlgorithm,
    ) -> Result<(), AuditLogError> {
        let excluded = if options.exclude_extensions.is_empty() {
            "none".to_string()
        } else {
            options.exclude_extensions.join(", ")
        };
        let depth = options
            .max_depth
            .map_or_else(|| "unlimited".to_string(), |d| d.to_string());

        let header = format!(
            "Scan started: {}\n\
             Scan root: {}\n\
             Scan options:\n  \
             Check files: {}\n  \
             Check directories: {}\n  \
             Check content: {}\n  \
             Digest: {}\n  \
             Key scope: {}\n  \
             Excluded extensions: {}\n  \
             Max depth: {}\n",
            timestamp(),
            root.display(),
            options.check_files,
            options.check_dirs,
            options.check_content,
            digest,
            options.key_scope,
            excluded,
            depth,
        );
        self.write_section(&header)
    }

    /// Write the scanned items and, when there are any, the failed items.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Io`] if writing fails.
    pub fn write_items(&mut self, result: &ScanResult) -> Result<(), AuditLogError> {
        let mut section = String::from("\nScanned items:\n");
        for item in &result.scanned_items {
            section.push_str(item);
            section.push('\n');
        }
        if !result.failed_items.is_empty() {
            section.push_str("\nFailed items:\n");
            for item in &result.failed_items {
                section.push_str(item);
                section.push('\n');
            }
        }
        self.write_section(&section)
    }

    /// Append the rendered text report, the same text shown on the console.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Io`] if writing fails.
    pub fn write_report(&mut self, rendered: &str) -> Result<(), AuditLogError> {
        self.write_section(&format!("\n{rendered}"))
    }

    /// Record why the scan stopped without a result.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Io`] if writing fails.
    pub fn write_failure(&mut self, message: &str) -> Result<(), AuditLogError> {
        self.write_section(&format!("\nScan failed: {message}\n"))
    }

    /// Write the end timestamp and close the file.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Io`] if writing or flushing fails.
    pub fn finish(mut self) -> Result<PathBuf, AuditLogError> {
        self.write_section(&format!("\nScan ended: {}\n", timestamp()))?;
        Ok(self.path)
    }

    /// Write and flush, so a crash loses at most the section in progress.
    fn write_section(&mut self, text: &str) -> Result<(), AuditLogError> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|source| AuditLogError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
