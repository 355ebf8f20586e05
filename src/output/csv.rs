//! CSV output formatter for scan results.
//!
//! One row is generated for each entry of each reportable group.
//!
//! # Columns
//!
//! - `group`: 1-based group number, in report order
//! - `key`: Shared name or hex fingerprint
//! - `kind`: `file`, `directory` or `mixed` (the group's kind)
//! - `path`: Path of the entry

use std::borrow::Cow;
use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::{DuplicateGroup, GroupKind};

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group: usize,
    key: Cow<'a, str>,
    kind: GroupKind,
    path: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the CSV output to the given writer.
    ///
    /// The header row is written even when there are no groups.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(["group", "key", "kind", "path"])?;

        for (idx, group) in self.groups.iter().enumerate() {
            let kind = group.kind();
            for entry in &group.entries {
                csv_writer.serialize(CsvRow {
                    group: idx + 1,
                    key: group.key.to_string_lossy(),
                    kind,
                    path: entry.path.to_string_lossy().into_owned(),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
