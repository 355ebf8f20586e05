//! Command-line interface definitions for dupescan.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, structured errors, config file) come before the
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # Report files and directories sharing a name under the current directory
//! dupescan scan
//!
//! # Report files with identical content, ignoring logs and temp files
//! dupescan scan ~/Downloads --check files --content --exclude log,tmp
//!
//! # Only look two levels deep and keep an audit log
//! dupescan scan ~/Projects --max-depth 2 --log --log-dir ~/dupescan-logs
//!
//! # JSON output for scripting, with debug logging
//! dupescan -v scan ~/Downloads --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::KeyScope;
use crate::scanner::DigestAlgorithm;

/// Find duplicate files and directories by name or by content.
///
/// dupescan walks a directory tree and reports entries that share a name, or
/// files that share a content fingerprint (MD5 by default).
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (TOML)
    ///
    /// Defaults to `dupescan/config.toml` in the platform config directory.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupescan.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree for duplicates
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Which entries to check
    #[arg(short = 't', long, value_enum, default_value_t = CheckTarget::All)]
    pub check: CheckTarget,

    /// Group files by content fingerprint instead of name
    #[arg(short, long)]
    pub content: bool,

    /// File extensions to skip (comma-separated, repeatable)
    ///
    /// Matching is case-insensitive; a leading dot is optional.
    #[arg(short, long, value_name = "EXT", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Deepest directory level whose contents are listed (root = 0)
    #[arg(short = 'd', long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Content fingerprint algorithm [default: md5]
    #[arg(long, value_enum)]
    pub digest: Option<DigestAlgorithm>,

    /// Whether files and directories share one key namespace [default: per-kind]
    #[arg(long, value_enum)]
    pub key_scope: Option<KeyScope>,

    /// Abort on the first directory that cannot be read
    #[arg(long)]
    pub strict: bool,

    /// Number of I/O threads for fingerprinting [default: 4]
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Write an audit log of the scan
    #[arg(long)]
    pub log: bool,

    /// Directory for audit logs (implies --log)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// In name mode, print a fingerprint for each file in the report
    #[arg(long)]
    pub show_fingerprints: bool,

    /// Disable the progress display
    #[arg(long)]
    pub no_progress: bool,
}

impl ScanArgs {
    /// Whether an audit log was requested.
    #[must_use]
    pub fn wants_log(&self) -> bool {
        self.log || self.log_dir.is_some()
    }
}

/// Which kinds of entries to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckTarget {
    /// Files only
    Files,
    /// Directories only
    Dirs,
    /// Files and directories
    All,
}

impl CheckTarget {
    /// `(check_files, check_dirs)` for this target.
    #[must_use]
    pub fn selection(self) -> (bool, bool) {
        match self {
            Self::Files => (true, false),
            Self::Dirs => (false, true),
            Self::All => (true, true),
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
