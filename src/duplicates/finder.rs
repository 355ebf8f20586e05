//! Scan coordination: walk, fingerprint, group.
//!
//! # Overview
//!
//! [`DuplicateFinder::scan`] drives one scan from start to finish:
//! 1. **Validate** the [`ScanOptions`] and the scan root
//! 2. **Walk** the tree, recording every emitted entry as a scanned item
//! 3. **Fingerprint** files in content mode, on a bounded rayon pool
//! 4. **Group** entries in discovery order and keep the reportable groups
//!
//! Unreadable files become failed items and join no group. A directory that
//! cannot be enumerated is a failed item too and the scan carries on,
//! reported as [`ScanStatus::Incomplete`], unless strict mode asks for the
//! whole scan to abort.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, ScanOptions};
//! use std::path::Path;
//!
//! let options = ScanOptions::default().with_content(true);
//! let finder = DuplicateFinder::with_defaults();
//! let result = finder.scan(Path::new("."), &options).unwrap();
//!
//! for group in &result.groups {
//!     println!("{}: {} entries", group.key, group.len());
//! }
//! ```

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use super::groups::{DuplicateGroup, DuplicateIndex, GroupKey, KeyScope};
use crate::progress::{ProgressCallback, PHASE_FINGERPRINT, PHASE_WALKING};
use crate::scanner::{
    normalize_extensions, DigestAlgorithm, Entry, EntryKind, Fingerprint, Fingerprinter,
    HashError, ScanError, Walker, WalkerConfig,
};

/// What to scan for. Produced by the CLI/config layer, validated up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Consider files
    pub check_files: bool,
    /// Consider directories
    pub check_dirs: bool,
    /// Group files by content fingerprint instead of name
    pub check_content: bool,
    /// Normalized extensions (`.ext`) of files to skip entirely
    pub exclude_extensions: Vec<String>,
    /// Deepest directory whose contents are listed (root = 0)
    pub max_depth: Option<usize>,
    /// Whether files and directories share one key namespace
    pub key_scope: KeyScope,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            check_files: true,
            check_dirs: true,
            check_content: false,
            exclude_extensions: Vec::new(),
            max_depth: None,
            key_scope: KeyScope::PerKind,
        }
    }
}

impl ScanOptions {
    /// Options checking only files.
    #[must_use]
    pub fn files_only() -> Self {
        Self {
            check_dirs: false,
            ..Self::default()
        }
    }

    /// Options checking only directories.
    #[must_use]
    pub fn dirs_only() -> Self {
        Self {
            check_files: false,
            ..Self::default()
        }
    }

    /// Enable or disable content mode.
    #[must_use]
    pub fn with_content(mut self, check_content: bool) -> Self {
        self.check_content = check_content;
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

    /// Set the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the key scope.
    #[must_use]
    pub fn with_key_scope(mut self, key_scope: KeyScope) -> Self {
        self.key_scope = key_scope;
        self
    }

    /// Reject option combinations that cannot describe a scan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when nothing is selected, when content mode is
    /// requested without checking files, or when an extension is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.check_files && !self.check_dirs {
            return Err(ConfigError::NothingToCheck);
        }
        if self.check_content && !self.check_files {
            return Err(ConfigError::ContentRequiresFiles);
        }
        if let Some(ext) = self
            .exclude_extensions
            .iter()
            .find(|ext| ext.trim_start_matches('.').is_empty())
        {
            return Err(ConfigError::EmptyExtension(ext.clone()));
        }
        Ok(())
    }

    /// Walker configuration matching these options.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.check_files,
            self.check_dirs,
            self.max_depth,
            &self.exclude_extensions,
        )
    }
}

/// Invalid scan configuration, rejected before a scan starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither files nor directories were selected.
    #[error("Nothing to check: enable files, directories, or both")]
    NothingToCheck,

    /// Content comparison only applies to files.
    #[error("Content comparison requires checking files")]
    ContentRequiresFiles,

    /// An excluded extension has no characters after the dot.
    #[error("Empty extension in exclude list: '{0}'")]
    EmptyExtension(String),
}

/// Errors that stop a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The options were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The scan root is missing or not a directory.
    #[error("Invalid scan root: {0}")]
    Root(#[source] ScanError),

    /// A directory could not be enumerated and strict mode is on.
    #[error("Scan aborted: {0}")]
    Traversal(#[source] ScanError),
}

/// Tuning for how a scan runs, as opposed to what it looks for.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of threads used for fingerprinting.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Digest used for content fingerprints.
    pub digest: DigestAlgorithm,
    /// Abort the scan on the first traversal error.
    pub strict: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("digest", &self.digest)
            .field("strict", &self.strict)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            digest: DigestAlgorithm::default(),
            strict: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the fingerprint thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    /// Abort on the first traversal error instead of skipping the subtree.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// How far a scan got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Every reachable directory was enumerated
    #[default]
    Complete,
    /// At least one directory could not be enumerated and was skipped
    Incomplete,
    /// Stopped early by a shutdown request; results are partial
    Interrupted,
}

/// Counters describing a finished scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Directory entries emitted by the walk
    pub directories: usize,
    /// File entries emitted by the walk
    pub files: usize,
    /// Files successfully fingerprinted (content mode)
    pub fingerprinted: usize,
    /// Failed items (unreadable files and directories)
    pub failed: usize,
    /// Number of reportable groups
    pub duplicate_groups: usize,
    /// Entries in reportable groups beyond the first of each group
    pub duplicate_entries: usize,
    /// Wall-clock time of the scan
    pub duration: Duration,
    /// Whether the scan covered the whole tree
    pub status: ScanStatus,
}

/// Everything a scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Reportable groups, ordered by first discovery of their key
    pub groups: Vec<DuplicateGroup>,
    /// `"<Kind>: <path>"` for every emitted entry, in discovery order
    pub scanned_items: Vec<String>,
    /// `"<reason>: <path>"` for every file or directory that could not be read
    pub failed_items: Vec<String>,
    /// Counters and status
    pub summary: ScanSummary,
}

impl ScanResult {
    /// Check if any reportable group was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Check if the whole tree was scanned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.summary.status == ScanStatus::Complete
    }

    /// Find a reportable group by its raw key.
    #[must_use]
    pub fn group(&self, key: impl AsRef<OsStr>) -> Option<&DuplicateGroup> {
        let key = key.as_ref();
        self.groups.iter().find(|g| g.key.as_os_str() == key)
    }
}

/// Output of the walk phase.
#[derive(Debug, Default)]
struct Walked {
    /// Emitted entries in discovery order
    entries: Vec<Entry>,
    /// Failed-item lines, each tagged with the number of entries emitted
    /// before the failure
    failures: Vec<(usize, String)>,
}

/// Orchestrates the walk, fingerprinting and grouping.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Scan `root` for duplicates.
    ///
    /// # Errors
    ///
    /// - [`FinderError::Config`] if `options` are invalid
    /// - [`FinderError::Root`] if `root` is missing or not a directory
    /// - [`FinderError::Traversal`] in strict mode, on the first directory
    ///   that cannot be enumerated
    pub fn scan(&self, root: &Path, options: &ScanOptions) -> Result<ScanResult, FinderError> {
        options.validate()?;
        validate_root(root)?;

        let start = Instant::now();
        log::info!("Scanning {} ({:?})", root.display(), options);

        let mut result = ScanResult::default();
        let walked = self.walk(root, options, &mut result)?;

        let fingerprints = if options.check_content {
            self.fingerprint_files(&walked.entries)
        } else {
            Vec::new()
        };

        // Directory failures are merged back in at their walk position
        let mut walk_failures = walked.failures.into_iter().peekable();
        let mut index = DuplicateIndex::new();
        for (i, entry) in walked.entries.into_iter().enumerate() {
            while let Some((_, item)) = walk_failures.next_if(|(pos, _)| *pos <= i) {
                result.failed_items.push(item);
            }
            let key = match entry.kind {
                EntryKind::File if options.check_content => {
                    match fingerprints.get(i).and_then(Option::as_ref) {
                        Some(Ok(fp)) => {
                            result.summary.fingerprinted += 1;
                            GroupKey::for_content(options.key_scope, fp.clone())
                        }
                        Some(Err(e)) => {
                            result.failed_items.push(e.failed_item());
                            continue;
                        }
                        // Not fingerprinted before shutdown
                        None => continue,
                    }
                }
                kind => GroupKey::for_name(options.key_scope, kind, entry.file_name()),
            };
            index.add(entry, key);
        }
        result
            .failed_items
            .extend(walk_failures.map(|(_, item)| item));

        if self.config.is_shutdown_requested() {
            log::info!("Scan interrupted by shutdown signal");
            result.summary.status = ScanStatus::Interrupted;
        }

        result.groups = index.finalize();
        result.summary.failed = result.failed_items.len();
        result.summary.duplicate_groups = result.groups.len();
        result.summary.duplicate_entries =
            result.groups.iter().map(DuplicateGroup::duplicate_count).sum();
        result.summary.duration = start.elapsed();

        log::info!(
            "Scan complete: {} entries, {} failed, {} duplicate groups ({:?})",
            result.scanned_items.len(),
            result.summary.failed,
            result.summary.duplicate_groups,
            result.summary.status
        );

        Ok(result)
    }

    /// Walk the tree, filling scanned items and returning the emitted
    /// entries in discovery order along with the directories that failed.
    fn walk(
        &self,
        root: &Path,
        options: &ScanOptions,
        result: &mut ScanResult,
    ) -> Result<Walked, FinderError> {
        let mut walker = Walker::new(root, options.walker_config());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_phase_start(PHASE_WALKING, 0);
        }

        let mut walked = Walked::default();
        for item in walker.walk() {
            match item {
                Ok(found) => {
                    log::trace!("Found (depth {}): {}", found.depth, found.entry.describe());
                    match found.entry.kind {
                        EntryKind::File => result.summary.files += 1,
                        EntryKind::Directory => result.summary.directories += 1,
                    }
                    result.scanned_items.push(found.entry.describe());
                    if let Some(cb) = callback {
                        cb.on_progress(
                            result.scanned_items.len(),
                            found.entry.path.to_string_lossy().as_ref(),
                        );
                    }
                    walked.entries.push(found.entry);
                }
                Err(e) if self.config.strict => {
                    if let Some(cb) = callback {
                        cb.on_phase_end(PHASE_WALKING);
                    }
                    log::error!("Strict mode: aborting on {}", e);
                    return Err(FinderError::Traversal(e));
                }
                Err(e) => {
                    walked.failures.push((walked.entries.len(), e.failed_item()));
                    result.summary.status = ScanStatus::Incomplete;
                }
            }
        }

        if let Some(cb) = callback {
            cb.on_phase_end(PHASE_WALKING);
        }
        Ok(walked)
    }

    /// Fingerprint every file in `entries` on a bounded pool.
    ///
    /// The returned vector lines up with `entries`: `None` for directories
    /// and for files skipped after a shutdown request.
    fn fingerprint_files(
        &self,
        entries: &[Entry],
    ) -> Vec<Option<Result<Fingerprint, HashError>>> {
        let total = entries.iter().filter(|e| e.kind == EntryKind::File).count();
        if total == 0 {
            log::debug!("Fingerprint: No files to process");
            return entries.iter().map(|_| None).collect();
        }

        let fingerprinter = Fingerprinter::new(self.config.digest);
        let callback = self.config.progress_callback.as_ref();
        let completed = AtomicUsize::new(0);

        if let Some(cb) = callback {
            cb.on_phase_start(PHASE_FINGERPRINT, total);
        }
        log::info!(
            "Fingerprinting {} files with {} ({} threads)",
            total,
            fingerprinter.algorithm(),
            self.config.io_threads
        );

        let compute = || -> Vec<Option<Result<Fingerprint, HashError>>> {
            entries
                .par_iter()
                .map(|entry| {
                    if entry.kind != EntryKind::File || self.config.is_shutdown_requested() {
                        return None;
                    }

                    let outcome = fingerprinter.fingerprint(&entry.path);
                    if let Err(ref e) = outcome {
                        log::warn!("Failed to fingerprint {}: {}", entry.path.display(), e);
                    }

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(cb) = callback {
                        cb.on_progress(done, entry.path.to_string_lossy().as_ref());
                    }
                    Some(outcome)
                })
                .collect()
        };

        let fingerprints = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(compute),
            Err(e) => {
                log::warn!(
                    "Failed to create fingerprint thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                compute()
            }
        };

        if let Some(cb) = callback {
            cb.on_phase_end(PHASE_FINGERPRINT);
        }
        fingerprints
    }
}

/// Make sure the scan root exists and is a directory.
///
/// [`DuplicateFinder::scan`] runs this itself; callers can use it to reject
/// a bad root before doing any other work.
///
/// # Errors
///
/// Returns [`FinderError::Root`] if `root` is missing, unreadable or not a
/// directory.
pub fn validate_root(root: &Path) -> Result<(), FinderError> {
    let metadata = fs::metadata(root).map_err(|e| FinderError::Root(ScanError::from_io(root, e)))?;
    if !metadata.is_dir() {
        return Err(FinderError::Root(ScanError::NotADirectory(
            root.to_path_buf(),
        )));
    }
    Ok(())
}
