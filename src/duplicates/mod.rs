//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Name-based grouping of files and directories
//! - Content-based grouping of files by fingerprint
//! - Scan coordination, status and failure accounting

pub mod finder;
pub mod groups;

pub use finder::{
    validate_root, ConfigError, DuplicateFinder, FinderConfig, FinderError, ScanOptions,
    ScanResult, ScanStatus, ScanSummary,
};
pub use groups::{DuplicateGroup, DuplicateIndex, GroupKey, GroupKind, KeyScope};
