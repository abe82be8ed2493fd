//! Output records and JSON writers for batch extraction.
//!
//! Two persisted shapes exist:
//!
//! * `<stem>.json` — one [`ProcessedResume`] per successfully processed
//!   input file, named after the input file's stem.
//! * [`CONSOLIDATED_FILE_NAME`] — a JSON array of every successful
//!   [`ProcessedResume`] from the run, in discovery order. Omitted entirely
//!   when a run has zero successes, so its presence always means "at least
//!   one resume was extracted".
//!
//! ## Why atomic writes?
//!
//! Both writers go through [`write_json_atomic`]: serialize, write to a
//! sibling `*.json.tmp`, then rename. A reader (or a re-run) can therefore
//! never observe a truncated JSON document, only the previous complete file
//! or the new complete file.

use crate::error::FileError;
use crate::schema::Resume;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Well-known name of the consolidated output file.
pub const CONSOLIDATED_FILE_NAME: &str = "all_resumes.json";

/// A [`Resume`] plus the two provenance fields the orchestrator attaches.
///
/// Serializes flat: the resume's keys and the provenance keys sit side by
/// side in one JSON object, which is the shape both output files use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResume {
    #[serde(flatten)]
    pub resume: Resume,
    /// Original input file name, without directory components.
    pub source_file: String,
    /// When this record was produced (UTC, serialized as RFC 3339).
    pub processed_at: DateTime<Utc>,
}

impl ProcessedResume {
    /// Attach provenance to an extracted resume, stamping the current time.
    pub fn new(resume: Resume, source_file: impl Into<String>) -> Self {
        Self {
            resume,
            source_file: source_file.into(),
            processed_at: Utc::now(),
        }
    }
}

/// One failed input file and what went wrong with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    /// Input file name, without directory components.
    pub file: String,
    pub error: FileError,
}

/// Result of one batch run.
///
/// Invariant: `successful + failed == total`, and `failures.len() == failed`.
/// `consolidated_path` is `Some` only when the consolidated file was actually
/// written (at least one success and consolidation not disabled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Input files discovered.
    pub total: usize,
    /// Files that produced a valid output record.
    pub successful: usize,
    /// Files that failed at any stage.
    pub failed: usize,
    /// Per-file diagnostics for every failure, in discovery order.
    pub failures: Vec<FileFailure>,
    /// Directory the outputs were written to.
    pub output_dir: PathBuf,
    /// Path of the consolidated file, when one was written.
    pub consolidated_path: Option<PathBuf>,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
}

/// Serialize `value` as pretty JSON and write it to `path` atomically.
///
/// Writes to `<path>.tmp` in the same directory, then renames over `path`.
/// The rename stays within one filesystem, so it cannot produce a partially
/// written target.
pub(crate) async fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), std::io::Error> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
