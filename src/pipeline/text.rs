//! Text extraction: PDF file → concatenated page text.
//!
//! ## Why spawn_blocking?
//!
//! `pdf-extract` parses the whole document synchronously on the calling
//! thread. Moving the parse onto the Tokio blocking pool keeps the async
//! workers free while several files parse in parallel, and it contains the
//! parser: a panic inside `pdf-extract` on a pathological file surfaces as a
//! `JoinError` here and becomes that one file's [`FileError::DocumentRead`],
//! never a batch abort.
//!
//! Extraction is best-effort by contract: scanned or image-only PDFs produce
//! empty or garbled text, and that is passed through unchanged (no OCR).
//! The empty-text case is rejected downstream by the extraction client,
//! which refuses to spend an API call on it.

use crate::error::FileError;
use std::path::Path;
use tracing::debug;

/// Extract the plain text of every page, pages separated by newlines.
///
/// Fails with [`FileError::DocumentRead`] when the file cannot be opened or
/// parsed as a PDF. Never fails on content: whatever text the parser
/// recovers is returned as-is.
pub async fn extract_text(path: &Path) -> Result<String, FileError> {
    let file = file_name_of(path);
    let owned = path.to_path_buf();

    let outcome = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned)).await;

    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(FileError::DocumentRead {
                file,
                detail: e.to_string(),
            })
        }
        Err(join_err) => {
            return Err(FileError::DocumentRead {
                file,
                detail: format!("PDF parser panicked: {join_err}"),
            })
        }
    };

    debug!(file = %file, chars = text.len(), "extracted text");
    Ok(text)
}

/// File name portion of a path, for diagnostics and provenance.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
