//! Batch orchestration: a directory of PDFs in, structured JSON out.
//!
//! ## Why failures are values
//!
//! One unreadable or unparseable resume must never take the rest of the
//! batch down with it. Every per-file problem is caught at the file
//! boundary and carried through as a [`FileError`] inside the
//! [`BatchSummary`]; only environment-level problems (missing input
//! directory, unwritable output directory, no credentials) abort the run
//! as a [`BatchError`].
//!
//! Files are processed concurrently up to `config.concurrency`, but the
//! results are re-sorted into discovery order before anything is written,
//! so the consolidated document and the summary are deterministic
//! regardless of completion order.

use crate::config::ExtractionConfig;
use crate::error::{BatchError, FileError};
use crate::output::{
    write_json_atomic, BatchSummary, FileFailure, ProcessedResume, CONSOLIDATED_FILE_NAME,
};
use crate::pipeline::discover::{discover_pdfs, PdfEntry};
use crate::pipeline::llm::{extract_with_retry, OpenAiExtractor, ResumeExtractor};
use crate::pipeline::text;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process every PDF in `input_dir` and write the results to `output_dir`.
///
/// This is the library's main entry point.
///
/// For each discovered PDF the pipeline extracts its text, runs the
/// structured extraction, and writes `<stem>.json` to `output_dir`. After
/// all files finish, the successful records are written to
/// [`CONSOLIDATED_FILE_NAME`] in discovery order. A batch with zero
/// successes produces no consolidated file.
///
/// # Returns
/// `Ok(BatchSummary)` on success, even if some (or all) files failed —
/// check `summary.failed` and `summary.failures`.
///
/// # Errors
/// Returns `Err(BatchError)` only for batch-fatal problems:
/// - Input directory missing or unreadable
/// - Output directory cannot be created
/// - No extraction credentials configured
/// - Consolidated output cannot be written
pub async fn process_batch(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<BatchSummary, BatchError> {
    let total_start = Instant::now();
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    info!(
        "Starting batch extraction: {} -> {}",
        input_dir.display(),
        output_dir.display()
    );

    // ── Step 1: Discover input files ─────────────────────────────────────
    let entries = discover_pdfs(input_dir)?;
    let total = entries.len();
    info!("Found {} PDF files in {}", total, input_dir.display());

    // ── Step 2: Prepare output directory ─────────────────────────────────
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| BatchError::OutputDir {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    // An empty directory is a valid batch: report zero totals without
    // requiring credentials or touching the network.
    if entries.is_empty() {
        warn!("No PDF files found in {}", input_dir.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(0);
            cb.on_batch_complete(0, 0);
        }
        return Ok(BatchSummary {
            total: 0,
            successful: 0,
            failed: 0,
            failures: Vec::new(),
            output_dir: output_dir.to_path_buf(),
            consolidated_path: None,
            duration_ms: total_start.elapsed().as_millis() as u64,
        });
    }

    // ── Step 3: Resolve the extraction provider ──────────────────────────
    let provider = resolve_provider(config)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 4: Process files concurrently ───────────────────────────────
    let mut results: Vec<(usize, Result<ProcessedResume, FileError>)> =
        stream::iter(entries.iter().map(|entry| {
            let provider = Arc::clone(&provider);
            async move {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_start(&entry.file_name, total);
                }
                let result = process_one(entry, &provider, output_dir, config).await;
                if let Some(ref cb) = config.progress_callback {
                    match &result {
                        Ok(_) => cb.on_file_complete(&entry.file_name, total),
                        Err(e) => cb.on_file_error(&entry.file_name, total, &e.to_string()),
                    }
                }
                (entry.index, result)
            }
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    // Restore discovery order for the consolidated output and the summary.
    results.sort_by_key(|(index, _)| *index);

    // ── Step 5: Split successes from failures ────────────────────────────
    let mut successes: Vec<ProcessedResume> = Vec::new();
    let mut failures: Vec<FileFailure> = Vec::new();
    for (_, result) in results {
        match result {
            Ok(processed) => successes.push(processed),
            Err(error) => failures.push(FileFailure {
                file: error.file().to_string(),
                error,
            }),
        }
    }

    // ── Step 6: Write the consolidated document ──────────────────────────
    let consolidated_path = if successes.is_empty() {
        warn!("No files succeeded; skipping {}", CONSOLIDATED_FILE_NAME);
        None
    } else if !config.write_consolidated {
        debug!("Consolidated output disabled by config");
        None
    } else {
        let path = output_dir.join(CONSOLIDATED_FILE_NAME);
        write_json_atomic(&path, &successes)
            .await
            .map_err(|e| BatchError::ConsolidatedWrite {
                path: path.clone(),
                source: e,
            })?;
        info!(
            "Wrote {} records to {}",
            successes.len(),
            path.display()
        );
        Some(path)
    };

    let successful = successes.len();
    let failed = failures.len();
    info!(
        "Batch complete: {}/{} files succeeded, {} failed, {}ms total",
        successful,
        total,
        failed,
        total_start.elapsed().as_millis()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, successful);
    }

    Ok(BatchSummary {
        total,
        successful,
        failed,
        failures,
        output_dir: output_dir.to_path_buf(),
        consolidated_path,
        duration_ms: total_start.elapsed().as_millis() as u64,
    })
}

/// Synchronous wrapper around [`process_batch`].
///
/// Spins up a throwaway tokio runtime for the duration of the call, so it
/// must not be invoked from inside an async context.
pub fn process_batch_sync(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<BatchSummary, BatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BatchError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(process_batch(input_dir, output_dir, config))
}

/// Extract a single PDF without writing anything to disk.
///
/// Runs the same text-extraction and structured-extraction stages as
/// [`process_batch`] and returns the normalized record with provenance
/// attached. Per-file errors surface here as [`BatchError::File`] since
/// there is no batch to absorb them.
pub async fn extract_file(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ProcessedResume, BatchError> {
    let path = path.as_ref();
    let provider = resolve_provider(config)?;
    let file = text::file_name_of(path);
    let extracted = text::extract_text(path).await?;
    let resume = extract_with_retry(&provider, &extracted, &file, config).await?;
    Ok(ProcessedResume::new(resume, file))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the extraction provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    the provider entirely; we use it as-is. Useful in tests or when the
///    caller needs custom middleware (caching, rate-limiting).
///
/// 2. **HTTP extractor from config** — [`OpenAiExtractor::from_config`]
///    builds the default client from `config.model` / `config.base_url`,
///    reading the API key from the config or the environment.
fn resolve_provider(config: &ExtractionConfig) -> Result<Arc<dyn ResumeExtractor>, BatchError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }
    Ok(Arc::new(OpenAiExtractor::from_config(config)?))
}

/// Run the full per-file pipeline: text extraction, structured
/// extraction, per-file JSON write.
async fn process_one(
    entry: &PdfEntry,
    provider: &Arc<dyn ResumeExtractor>,
    output_dir: &Path,
    config: &ExtractionConfig,
) -> Result<ProcessedResume, FileError> {
    let extracted = text::extract_text(&entry.path).await?;
    let resume = extract_with_retry(provider, &extracted, &entry.file_name, config).await?;
    let processed = ProcessedResume::new(resume, entry.file_name.clone());

    let path = output_dir.join(format!("{}.json", entry.stem));
    write_json_atomic(&path, &processed)
        .await
        .map_err(|e| FileError::OutputWrite {
            file: entry.file_name.clone(),
            path: path.clone(),
            detail: e.to_string(),
        })?;
    debug!("{}: wrote {}", entry.file_name, path.display());

    Ok(processed)
}
