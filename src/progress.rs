//! Progress-callback trait for observing a batch while it runs.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] and the
//! orchestrator reports every file it starts, completes, or fails, plus a
//! begin/end pair for the batch itself.
//!
//! A trait object keeps the library agnostic about the host application's
//! plumbing: the same five hooks can drive a terminal progress bar, feed a
//! log aggregator, or update a job-status row, and the orchestrator never
//! needs to know which. Channels would force a receiver task on every
//! caller; an unset callback costs nothing.
//!
//! # Example
//!
//! A stateless reporter that writes one line per finished file:
//!
//! ```rust
//! use resume2json::{BatchProgressCallback, ExtractionConfig};
//! use std::sync::Arc;
//!
//! struct StderrTicker;
//!
//! impl BatchProgressCallback for StderrTicker {
//!     fn on_file_complete(&self, file_name: &str, total_files: usize) {
//!         eprintln!("finished {file_name} (batch of {total_files})");
//!     }
//!
//!     fn on_batch_complete(&self, total_files: usize, success_count: usize) {
//!         eprintln!("{success_count}/{total_files} resumes extracted");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(StderrTicker))
//!     .build()
//!     .unwrap();
//! # let _ = config;
//! ```

use std::sync::Arc;

/// Called by the batch orchestrator as it processes each input file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because
/// files are processed concurrently when `concurrency > 1`.
///
/// # Thread safety
///
/// With `concurrency > 1` the per-file hooks fire from whichever worker
/// task reaches them first, possibly interleaved across files.
/// Implementations that accumulate state must synchronise it themselves
/// (an `AtomicUsize` or `Mutex` is enough).
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after input discovery, before any file is processed.
    ///
    /// # Arguments
    /// * `total_files` — number of PDFs that will be processed
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file's text extraction begins.
    ///
    /// # Arguments
    /// * `file_name`   — input file name (no directory components)
    /// * `total_files` — total files in the batch
    fn on_file_start(&self, file_name: &str, total_files: usize) {
        let _ = (file_name, total_files);
    }

    /// Called when a file has been extracted and its JSON written.
    ///
    /// # Arguments
    /// * `file_name`   — input file name
    /// * `total_files` — total files in the batch
    fn on_file_complete(&self, file_name: &str, total_files: usize) {
        let _ = (file_name, total_files);
    }

    /// Called when a file fails at any stage (read, extraction, write).
    ///
    /// # Arguments
    /// * `file_name`   — input file name
    /// * `total_files` — total files in the batch
    /// * `error`       — failure description suitable for display
    fn on_file_error(&self, file_name: &str, total_files: usize, error: &str) {
        let _ = (file_name, total_files, error);
    }

    /// Called once after every file has been attempted.
    ///
    /// # Arguments
    /// * `total_files`   — total files in the batch
    /// * `success_count` — files that produced a valid output record
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// Implementation that ignores every event; used when no callback is set.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
