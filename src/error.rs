//! Error types for the resume2json library.
//!
//! The split into two error types mirrors the two ways a run can go wrong:
//!
//! * [`BatchError`] — **Fatal**: the batch cannot proceed at all (input
//!   directory missing, output directory uncreatable, provider not
//!   configured). Returned as `Err(BatchError)` from the top-level
//!   `process_batch*` / `extract_file` functions.
//!
//! * [`FileError`] — **Non-fatal**: a single input file failed (corrupt PDF,
//!   transient API error, schema mismatch) but all other files are fine.
//!   Stored inside [`crate::output::FileFailure`] so callers can inspect
//!   partial success rather than losing the whole batch to one bad resume.
//!
//! The separation keeps per-file isolation visible in the types: nothing that
//! is a `FileError` can terminate the batch, and anything that is a
//! `BatchError` means no per-file result could have been persisted anyway.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume2json library.
///
/// File-level failures use [`FileError`] and are stored in
/// [`crate::output::BatchSummary`] rather than propagated here.
#[derive(Debug, Error)]
pub enum BatchError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input directory was not found at the given path.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is a directory.")]
    InputDirNotFound { path: PathBuf },

    /// Input directory exists but its entries could not be listed.
    #[error("Failed to read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Output directory could not be created or is not writable.
    ///
    /// Fatal rather than per-file: if the output root cannot be prepared,
    /// no later per-file result could be persisted either.
    #[error("Failed to prepare output directory '{path}': {source}\nCheck permissions on the parent directory.")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The consolidated file could not be written after successes exist.
    #[error("Failed to write consolidated file '{path}': {source}")]
    ConsolidatedWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Provider errors ───────────────────────────────────────────────────
    /// No usable extraction provider (missing API key etc.).
    #[error("LLM provider is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Single-file wrapper ───────────────────────────────────────────────
    /// A per-file error surfaced through the single-file entry point, where
    /// there is no batch summary to carry it.
    #[error(transparent)]
    File(#[from] FileError),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single input file.
///
/// Stored in [`crate::output::BatchSummary::failures`] when a file fails.
/// The overall batch always continues past it.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The PDF could not be opened or parsed.
    #[error("'{file}': failed to read PDF: {detail}")]
    DocumentRead { file: String, detail: String },

    /// The structured extraction call failed.
    #[error("'{file}': extraction failed ({kind}): {detail}")]
    Extraction {
        file: String,
        kind: ExtractionKind,
        detail: String,
    },

    /// The per-file output JSON could not be written.
    #[error("'{file}': failed to write output '{path}': {detail}")]
    OutputWrite {
        file: String,
        path: PathBuf,
        detail: String,
    },
}

impl FileError {
    /// Name of the input file this error belongs to.
    pub fn file(&self) -> &str {
        match self {
            FileError::DocumentRead { file, .. }
            | FileError::Extraction { file, .. }
            | FileError::OutputWrite { file, .. } => file,
        }
    }

    /// Attribute an attempt-level failure to a file.
    pub fn extraction(file: impl Into<String>, failure: ExtractionFailure) -> Self {
        FileError::Extraction {
            file: file.into(),
            kind: failure.kind,
            detail: failure.detail,
        }
    }
}

/// One extraction attempt's failure, before it is attributed to a file.
///
/// [`crate::pipeline::llm::ResumeExtractor`] implementations return this;
/// the pipeline wraps it into [`FileError::Extraction`] together with the
/// file name and the retry policy's verdict.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {detail}")]
pub struct ExtractionFailure {
    pub kind: ExtractionKind,
    pub detail: String,
}

impl ExtractionFailure {
    pub fn new(kind: ExtractionKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// What went wrong inside an extraction call.
///
/// The discriminant drives retry policy: only [`is_transient`] kinds are ever
/// retried. Schema-validation failures are deterministic for a given response
/// and retrying them would just burn quota.
///
/// [`is_transient`]: ExtractionKind::is_transient
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExtractionKind {
    /// Network/transport failure before any HTTP status was received.
    Transport,
    /// API returned a non-success HTTP status.
    Api { status: u16 },
    /// API returned HTTP 429.
    RateLimited,
    /// The call exceeded the configured timeout.
    Timeout,
    /// The extracted text was empty; nothing to send.
    EmptyText,
    /// The provider returned a response with no content.
    EmptyResponse,
    /// The response content failed to decode against the Resume schema.
    SchemaValidation,
}

impl ExtractionKind {
    /// Whether a retry could plausibly change the outcome.
    pub fn is_transient(self) -> bool {
        match self {
            ExtractionKind::Transport | ExtractionKind::RateLimited | ExtractionKind::Timeout => {
                true
            }
            ExtractionKind::Api { status } => (500..=599).contains(&status),
            ExtractionKind::EmptyText
            | ExtractionKind::EmptyResponse
            | ExtractionKind::SchemaValidation => false,
        }
    }
}

impl std::fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionKind::Transport => write!(f, "transport error"),
            ExtractionKind::Api { status } => write!(f, "API error, HTTP {status}"),
            ExtractionKind::RateLimited => write!(f, "rate limited"),
            ExtractionKind::Timeout => write!(f, "timeout"),
            ExtractionKind::EmptyText => write!(f, "empty input text"),
            ExtractionKind::EmptyResponse => write!(f, "empty model response"),
            ExtractionKind::SchemaValidation => write!(f, "schema validation"),
        }
    }
}
