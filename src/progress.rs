//! Terminal rendering of scan events with indicatif.
//!
//! The walk phase shows a spinner; the hash phase shows a percentage bar fed
//! by [`ScanEvent::Progress`] with the file currently being hashed as its
//! message. In quiet mode nothing is drawn.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::duplicates::{ScanEvent, ScanStatus};

/// Longest file name shown next to the bar.
const MAX_NAME_LEN: usize = 30;

/// Progress display driven by [`ScanEvent`]s.
#[derive(Debug)]
pub struct ScanProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
    accessible: bool,
}

impl ScanProgress {
    /// Create a reporter. With `quiet` set, every call is a no-op.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: None,
            quiet,
            accessible: false,
        }
    }

    /// Use ASCII bars and no spinner animation.
    #[must_use]
    pub fn with_accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }

    fn spinner_style(&self) -> ProgressStyle {
        if self.accessible {
            ProgressStyle::with_template("{msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
        } else {
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        }
    }

    fn bar_style(&self) -> ProgressStyle {
        if self.accessible {
            ProgressStyle::with_template("[{elapsed_precise}] [{bar:40}] {pos}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-")
        } else {
            ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.green/blue}] {pos}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█>-")
        }
    }

    /// Update the display for one event.
    pub fn handle(&mut self, event: &ScanEvent) {
        if self.quiet {
            return;
        }

        match event {
            ScanEvent::Status(ScanStatus::Walking) => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(self.spinner_style());
                pb.set_message(ScanStatus::Walking.to_string());
                if !self.accessible {
                    pb.enable_steady_tick(Duration::from_millis(100));
                }
                self.replace(pb);
            }
            ScanEvent::Status(status @ ScanStatus::Hashing { .. }) => {
                let pb = ProgressBar::new(100);
                pb.set_style(self.bar_style());
                pb.set_message(status.to_string());
                self.replace(pb);
            }
            ScanEvent::Status(ScanStatus::HashingFile { name }) => {
                if let Some(pb) = &self.bar {
                    pb.set_message(truncate_name(name, MAX_NAME_LEN));
                }
            }
            ScanEvent::Status(status) => self.finish(&status.to_string()),
            ScanEvent::Progress(pct) => {
                if let Some(pb) = &self.bar {
                    pb.set_position(u64::from(*pct));
                }
            }
            ScanEvent::Finished(_) => self.clear(),
        }
    }

    /// Finish the active bar, leaving `message` on screen.
    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.bar.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Remove the active bar from the screen.
    pub fn clear(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }

    fn replace(&mut self, pb: ProgressBar) {
        self.clear();
        self.bar = Some(pb);
    }
}

/// Shorten a file name for display, keeping its end.
fn truncate_name(name: &str, max_len: usize) -> String {
    let count = name.chars().count();
    if count <= max_len {
        return name.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let tail: String = name.chars().skip(count - keep).collect();
    format!("...{tail}")
}
