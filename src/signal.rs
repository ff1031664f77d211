//! Ctrl+C handling and cooperative cancellation.
//!
//! A [`CancelToken`] wraps the `Arc<AtomicBool>` that the scan engine checks
//! at its loop checkpoints. [`install_handler`] ties a token to Ctrl+C so an
//! interrupted CLI scan stops promptly and exits with code 130.
//!
//! ```rust,no_run
//! use dupagent::signal::install_handler;
//!
//! let token = install_handler().expect("signal handler");
//! let flag = token.flag();
//! // pass `flag` to DuplicateFinder::with_shutdown_flag or start_scan_with_token
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag.
///
/// Clones share the same flag, so a token handed to a worker observes a
/// `cancel()` issued from any other clone.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The underlying flag, for components that take `Arc<AtomicBool>`.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear a previous cancellation so the token can drive a new scan.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl From<Arc<AtomicBool>> for CancelToken {
    fn from(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancelToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// The process-wide handler is registered once. Later calls (tests running
/// `run_app` repeatedly) get the same token back, reset to not-cancelled.
///
/// # Errors
///
/// Returns [`SignalError`] when the OS refuses the handler and no token was
/// registered before.
pub fn install_handler() -> Result<CancelToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancelToken::new();
    let hooked = token.clone();

    match ctrlc::set_handler(move || {
        hooked.cancel();
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked token");
            Ok(GLOBAL_TOKEN.get_or_init(CancelToken::new).clone())
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
