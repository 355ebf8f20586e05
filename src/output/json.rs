//! JSON output formatter for scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "key": "notes.md",
//!       "kind": "file",
//!       "paths": ["./a/notes.md", "./b/notes.md"]
//!     }
//!   ],
//!   "failed_items": ["File permission denied: ./locked.bin"],
//!   "summary": {
//!     "files": 10,
//!     "directories": 3,
//!     "fingerprinted": 0,
//!     "failed": 1,
//!     "duplicate_groups": 1,
//!     "duplicate_entries": 1,
//!     "scan_duration_ms": 12,
//!     "status": "incomplete",
//!     "digest": null,
//!     "exit_code": 3,
//!     "exit_code_name": "DS003"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, GroupKind, ScanResult, ScanStatus, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::DigestAlgorithm;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Shared name or hex fingerprint
    pub key: String,
    /// Kind of the members
    pub kind: GroupKind,
    /// Member paths, in discovery order
    pub paths: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            key: group.key.to_string(),
            kind: group.kind(),
            paths: group
                .entries
                .iter()
                .map(|e| e.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// File entries emitted by the walk
    pub files: usize,
    /// Directory entries emitted by the walk
    pub directories: usize,
    /// Files successfully fingerprinted
    pub fingerprinted: usize,
    /// Number of failed items
    pub failed: usize,
    /// Number of reportable groups
    pub duplicate_groups: usize,
    /// Entries beyond the first of each group
    pub duplicate_entries: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan covered the whole tree
    pub status: ScanStatus,
    /// Fingerprint algorithm, in content mode
    pub digest: Option<DigestAlgorithm>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(
        summary: &ScanSummary,
        digest: Option<DigestAlgorithm>,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            files: summary.files,
            directories: summary.directories,
            fingerprinted: summary.fingerprinted,
            failed: summary.failed,
            duplicate_groups: summary.duplicate_groups,
            duplicate_entries: summary.duplicate_entries,
            scan_duration_ms: summary.duration.as_millis() as u64,
            status: summary.status,
            digest,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Items that could not be read
    pub failed_items: Vec<String>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from a scan result.
    ///
    /// # Arguments
    ///
    /// * `result` - The scan result
    /// * `digest` - Fingerprint algorithm, when the scan ran in content mode
    ///
    /// # Example
    ///
    /// ```
    /// use dupescan::duplicates::ScanResult;
    /// use dupescan::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&ScanResult::default(), None);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(result: &ScanResult, digest: Option<DigestAlgorithm>) -> Self {
        Self {
            duplicates: result.groups.iter().map(JsonDuplicateGroup::from).collect(),
            failed_items: result.failed_items.clone(),
            summary: JsonSummary::from_scan_summary(
                &result.summary,
                digest,
                ExitCode::from_result(result),
            ),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
