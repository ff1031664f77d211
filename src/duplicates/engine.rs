//! Background scan worker.
//!
//! [`start_scan`] validates the roots on the calling thread, then runs one
//! [`DuplicateFinder`] on a dedicated named thread. Every notification is sent
//! over a crossbeam channel owned by the returned [`ScanHandle`]; the last
//! message of a scan is always [`ScanEvent::Finished`].
//!
//! Only one worker runs per handle. Starting a second scan over the same roots
//! while a handle is alive is the caller's responsibility to avoid: drop or
//! [`ScanHandle::join`] the previous handle first.
//!
//! ```no_run
//! use dupagent::duplicates::{start_scan, ScanEvent};
//! use dupagent::scanner::ScanOptions;
//! use std::path::PathBuf;
//!
//! let handle = start_scan(vec![PathBuf::from(".")], ScanOptions::default())?;
//! for event in handle.events() {
//!     if let ScanEvent::Progress(pct) = event {
//!         println!("{pct}%");
//!     }
//! }
//! # Ok::<(), dupagent::duplicates::FinderError>(())
//! ```

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};

use super::events::{ScanEvent, ScanOutcome};
use super::finder::{validate_roots, DuplicateFinder, FinderError};
use crate::scanner::ScanOptions;
use crate::signal::CancelToken;

const WORKER_NAME: &str = "dupagent-scan";

/// Start a scan on a background worker with a fresh cancel token.
///
/// # Errors
///
/// Returns [`FinderError`] when a root is invalid or the worker thread cannot
/// be spawned. No thread is started in either case.
pub fn start_scan(roots: Vec<PathBuf>, options: ScanOptions) -> Result<ScanHandle, FinderError> {
    start_scan_with_token(roots, options, CancelToken::new())
}

/// Start a scan that also observes an externally owned token (e.g. Ctrl+C).
///
/// # Errors
///
/// See [`start_scan`].
pub fn start_scan_with_token(
    roots: Vec<PathBuf>,
    options: ScanOptions,
    token: CancelToken,
) -> Result<ScanHandle, FinderError> {
    validate_roots(&roots)?;

    let (tx, rx) = unbounded();
    let flag = token.flag();

    let worker = thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            log::debug!("Scan worker started for {} root(s)", roots.len());
            let mut finder = DuplicateFinder::new(options).with_shutdown_flag(flag);
            let outcome = finder.scan(&roots, &tx);
            let _ = tx.send(ScanEvent::Finished(outcome));
            log::debug!("Scan worker finished");
        })
        .map_err(FinderError::Spawn)?;

    Ok(ScanHandle {
        events: rx,
        token,
        worker: Some(worker),
    })
}

/// Presenter-side handle to a running scan.
#[derive(Debug)]
pub struct ScanHandle {
    events: Receiver<ScanEvent>,
    token: CancelToken,
    worker: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Receiver of the scan's notifications.
    #[must_use]
    pub fn events(&self) -> &Receiver<ScanEvent> {
        &self.events
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        log::debug!("Scan cancellation requested");
        self.token.cancel();
    }

    /// Token shared with the worker.
    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker to exit. Pending events stay readable.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::WorkerPanicked`] if the worker panicked.
    pub fn join(&mut self) -> Result<(), FinderError> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| FinderError::WorkerPanicked),
            None => Ok(()),
        }
    }

    /// Drain events until the outcome arrives, then join.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::WorkerPanicked`] if the worker died without
    /// publishing an outcome.
    pub fn wait(self) -> Result<ScanOutcome, FinderError> {
        self.wait_with(|_| {})
    }

    /// Like [`wait`](Self::wait), passing every non-terminal event to `observe`.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub fn wait_with<F>(mut self, mut observe: F) -> Result<ScanOutcome, FinderError>
    where
        F: FnMut(&ScanEvent),
    {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                ScanEvent::Finished(done) => {
                    outcome = Some(done);
                    break;
                }
                other => observe(&other),
            }
        }
        self.join()?;
        outcome.ok_or(FinderError::WorkerPanicked)
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.token.cancel();
            if worker.join().is_err() {
                log::warn!("Scan worker panicked");
            }
        }
    }
}
