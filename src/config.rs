//! Layered application configuration.
//!
//! Settings are merged with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config FILE`, else `dupescan/config.toml` in the
//!    platform config directory
//! 3. `DUPESCAN_*` environment variables (e.g. `DUPESCAN_IO_THREADS=8`)
//! 4. Command-line flags, applied by [`Config::scan_options`] and
//!    [`Config::finder_config`]
//!
//! An explicit `--config` path that does not exist is an error; a missing
//! default file is not.
//!
//! # Example file
//!
//! ```toml
//! digest = "sha256"
//! key_scope = "per-kind"
//! io_threads = 2
//! exclude_extensions = ["log", "tmp"]
//! max_depth = 5
//! strict = false
//! log_dir = "/var/log/dupescan"
//! progress = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::ScanArgs;
use crate::duplicates::{FinderConfig, KeyScope, ScanOptions};
use crate::scanner::{normalize_extensions, DigestAlgorithm};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content fingerprint algorithm.
    pub digest: DigestAlgorithm,
    /// Key namespace for groups.
    pub key_scope: KeyScope,
    /// Fingerprint thread count.
    pub io_threads: usize,
    /// Extensions to exclude when `--exclude` is not given.
    pub exclude_extensions: Vec<String>,
    /// Default depth limit.
    pub max_depth: Option<usize>,
    /// Abort on the first traversal error.
    pub strict: bool,
    /// Directory for audit logs.
    pub log_dir: Option<PathBuf>,
    /// Show progress while scanning.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::Md5,
            key_scope: KeyScope::PerKind,
            io_threads: 4,
            exclude_extensions: Vec::new(),
            max_depth: None,
            strict: false,
            log_dir: None,
            progress: true,
        }
    }
}

impl Config {
    /// Build the layered figment without extracting it.
    ///
    /// `path` overrides the default config file location.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = path.map(Path::to_path_buf).or_else(Self::default_path);
        if let Some(file) = file {
            log::debug!("Config file: {}", file.display());
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `path` does not exist, or if any layer holds a
    /// malformed or mistyped value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
        }

        Self::figment(path)
            .extract()
            .context("Failed to load configuration")
    }

    /// Default config file: `<platform config dir>/dupescan/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Scan options from the CLI arguments, falling back to this config.
    ///
    /// Extensions given on the command line replace the configured list.
    #[must_use]
    pub fn scan_options(&self, args: &ScanArgs) -> ScanOptions {
        let (check_files, check_dirs) = args.check.selection();
        let exclude = if args.exclude.is_empty() {
            &self.exclude_extensions
        } else {
            &args.exclude
        };

        ScanOptions {
            check_files,
            check_dirs,
            check_content: args.content,
            exclude_extensions: normalize_extensions(exclude),
            max_depth: args.max_depth.or(self.max_depth),
            key_scope: args.key_scope.unwrap_or(self.key_scope),
        }
    }

    /// Finder tuning from the CLI arguments, falling back to this config.
    ///
    /// The shutdown flag and progress callback are attached by the caller.
    #[must_use]
    pub fn finder_config(&self, args: &ScanArgs) -> FinderConfig {
        FinderConfig::default()
            .with_digest(self.digest_for(args))
            .with_io_threads(args.io_threads.unwrap_or(self.io_threads))
            .with_strict(args.strict || self.strict)
    }

    /// Effective digest algorithm.
    #[must_use]
    pub fn digest_for(&self, args: &ScanArgs) -> DigestAlgorithm {
        args.digest.unwrap_or(self.digest)
    }

    /// Directory audit logs are written to; the working directory by default.
    #[must_use]
    pub fn log_dir_for(&self, args: &ScanArgs) -> PathBuf {
        args.log_dir
            .clone()
            .or_else(|| self.log_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
