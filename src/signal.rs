//! Ctrl+C handling for graceful shutdown.
//!
//! The handler only raises a shared `AtomicBool`. The walker stops yielding
//! entries and the fingerprint pool skips remaining files once the flag is
//! set, so an interrupted scan still returns the groups built so far, with
//! [`ScanStatus::Interrupted`](crate::duplicates::ScanStatus::Interrupted).
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupescan::duplicates::FinderConfig;
//! use dupescan::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler that is not hooked to any signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request a shutdown, as Ctrl+C would.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear a previous request.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// The flag itself, for [`FinderConfig::with_shutdown_flag`](crate::duplicates::FinderConfig::with_shutdown_flag).
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static HOOKED: Mutex<Option<ShutdownHandler>> = Mutex::new(None);

/// Hook Ctrl+C to a process-wide shutdown flag and return it, cleared.
///
/// The OS hook is registered on the first call only; later calls (repeated
/// `run_app` invocations in tests) get the same handler back with the flag
/// reset.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the hook cannot be registered,
/// for instance because another Ctrl+C handler already owns the signal.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let mut hooked = HOOKED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(ref handler) = *hooked {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted. Finishing with partial results...");
        let _ = stderr.flush();
    })?;

    log::debug!("Ctrl+C handler installed");
    *hooked = Some(handler.clone());
    Ok(handler)
}
