//! dupescan - duplicate file and directory finder
//!
//! Walks a directory tree and reports files and directories that share a
//! name, or files that share a content fingerprint.
//!
//! The library is split along the scan pipeline:
//! - [`scanner`]: depth-bounded walking and content fingerprints
//! - [`duplicates`]: the grouping index and the scan coordinator
//! - [`output`]: text, JSON and CSV reports and the audit log
//!
//! [`run_app`] wires these to the command line.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{validate_root, DuplicateFinder};
use crate::error::ExitCode;
use crate::output::{AuditLog, CsvOutput, JsonOutput, SessionNameProvider, TextReport};
use crate::progress::Progress;
use crate::signal::ShutdownHandler;

/// Run the application for parsed arguments.
///
/// Returns the exit code describing the scan outcome. Errors that stop the
/// run (bad configuration, unusable scan root, strict-mode traversal
/// failure, unwritable output) are returned as `Err` and map to
/// [`ExitCode::GeneralError`].
///
/// # Errors
///
/// See above.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())?;
    log::debug!("Effective config: {:?}", config);

    match cli.command {
        Commands::Scan(ref args) => run_scan(args, &config, cli.quiet),
    }
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let options = config.scan_options(args);
    options.validate().context("Invalid scan options")?;
    let digest = config.digest_for(args);

    let shutdown = match signal::install_handler() {
        Ok(handler) => handler,
        Err(e) => {
            log::warn!("{}; Ctrl+C will terminate immediately", e);
            ShutdownHandler::new()
        }
    };

    let mut finder_config = config
        .finder_config(args)
        .with_shutdown_flag(shutdown.get_flag());
    let show_progress =
        config.progress && !args.no_progress && !quiet && args.output == OutputFormat::Text;
    if show_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let scan_context = || format!("Failed to scan {}", args.path.display());
    // A bad root never gets as far as creating a log
    validate_root(&args.path).with_context(scan_context)?;

    let audit = if args.wants_log() {
        let mut log = AuditLog::create(&config.log_dir_for(args), &SessionNameProvider::new())?;
        log.write_header(&args.path, &options, digest)?;
        Some(log)
    } else {
        None
    };

    let result = match DuplicateFinder::new(finder_config).scan(&args.path, &options) {
        Ok(result) => result,
        Err(e) => {
            let err = anyhow::Error::new(e).context(scan_context());
            if let Some(log) = audit {
                close_failed_log(log, &err);
            }
            return Err(err);
        }
    };

    let report = TextReport::new(&result, options.check_content, digest)
        .with_fingerprints(args.show_fingerprints);
    // Rendered once, so the console and the log show the same fingerprints
    let rendered = (args.output == OutputFormat::Text || audit.is_some())
        .then(|| report.render())
        .unwrap_or_default();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => out.write_all(rendered.as_bytes())?,
        OutputFormat::Json => JsonOutput::new(&result, options.check_content.then_some(digest))
            .write_to(&mut out, true)?,
        OutputFormat::Csv => CsvOutput::new(&result.groups).write_to(&mut out)?,
    }
    out.flush()?;

    if let Some(mut log) = audit {
        log.write_items(&result)?;
        log.write_report(&rendered)?;
        let path = log.finish()?;
        log::info!("Audit log written to {}", path.display());
    }

    let code = ExitCode::from_result(&result);
    log::debug!("Exit code: {} ({})", code.as_i32(), code.code_prefix());
    Ok(code)
}

/// Close the log of a scan that returned an error. The scan error is what
/// gets reported, so a failure here is only logged.
fn close_failed_log(mut log: AuditLog, err: &anyhow::Error) {
    let closed = log
        .write_failure(&format!("{err:#}"))
        .and_then(|()| log.finish());
    match closed {
        Ok(path) => log::info!("Audit log written to {}", path.display()),
        Err(e) => log::warn!("Could not finish audit log: {}", e),
    }
}
