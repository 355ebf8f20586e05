//! Report formatters and the audit log.
//!
//! This module renders scan results in different formats:
//! - Plain text for the console and the audit log
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, ScanOptions};
//! use dupescan::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let result = finder.scan(Path::new("."), &ScanOptions::default()).unwrap();
//!
//! // Output as JSON to stdout
//! let output = JsonOutput::new(&result, None);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod audit;
pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use audit::{AuditLog, AuditLogError, LogNameProvider, SessionNameProvider};
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextReport;
