//! # resume2json
//!
//! Batch-extract structured resume data from PDF files using an
//! OpenAI-compatible LLM with strict JSON Schema output.
//!
//! ## Why this crate?
//!
//! Resumes arrive as free-form PDFs; downstream systems want rows. Regex
//! and keyword heuristics break on every new layout, so this crate extracts
//! the raw text from each PDF and asks a schema-constrained LLM to produce
//! one [`Resume`] record per file. The schema is enforced twice: once at
//! the provider via `response_format: json_schema` (strict mode), and again
//! locally by serde when the response is decoded. Output that does not
//! match the contract fails that one file; it is never patched up.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input_dir/*.pdf
//!  │
//!  ├─ 1. Discover  list + sort PDFs (deterministic order)
//!  ├─ 2. Text      per-file text extraction (CPU-bound, spawn_blocking)
//!  ├─ 3. Extract   concurrent schema-constrained LLM calls
//!  ├─ 4. Write     <stem>.json per file (atomic tmp + rename)
//!  └─ 5. Combine   all_resumes.json for all successful files
//! ```
//!
//! Every per-file failure is isolated: it is recorded in the
//! [`BatchSummary`] and the batch keeps going. Only environment problems
//! (missing input directory, unwritable output, no credentials) abort the
//! run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume2json::{process_batch, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads the API key from OPENAI_API_KEY
//!     let config = ExtractionConfig::default();
//!     let summary = process_batch("resume", "output", &config).await?;
//!     println!(
//!         "{}/{} succeeded, {} failed",
//!         summary.successful, summary.total, summary.failed
//!     );
//!     for failure in &summary.failures {
//!         eprintln!("  {}: {}", failure.file, failure.error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume2json` binary (clap + anyhow + tracing-subscriber) |
//!
//! Library-only consumers can opt out of the binary's dependencies:
//! ```toml
//! resume2json = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod schema;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{extract_file, process_batch, process_batch_sync};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{BatchError, ExtractionFailure, ExtractionKind, FileError};
pub use output::{BatchSummary, FileFailure, ProcessedResume, CONSOLIDATED_FILE_NAME};
pub use pipeline::discover::{discover_pdfs, PdfEntry};
pub use pipeline::llm::{OpenAiExtractor, ResumeExtractor};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use schema::{
    CertificationItem, ContactInfo, EducationItem, ExperienceItem, Resume,
};
