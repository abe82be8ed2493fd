//! Input discovery: enumerate the PDFs a batch run will process.
//!
//! Flat and non-recursive, extension match only (`.pdf`, any ASCII case).
//! Entries come back sorted by file name, so processing order, summary order,
//! and the consolidated array order are the same deterministic order
//! regardless of filesystem enumeration order or worker completion order.

use crate::error::BatchError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One discovered input file.
#[derive(Debug, Clone)]
pub struct PdfEntry {
    /// Path to the file, as rooted at the input directory.
    pub path: PathBuf,
    /// File name including extension (`cv_alice.pdf`).
    pub file_name: String,
    /// File stem the output JSON is named after (`cv_alice`).
    pub stem: String,
    /// Position in discovery order; consolidated output sorts by this.
    pub index: usize,
}

/// Enumerate `*.pdf` files in `input_dir`, sorted by file name.
///
/// Subdirectories are never entered; a directory whose name ends in `.pdf`
/// is skipped. File names that are not valid UTF-8 are skipped too, since
/// they cannot name an output stem. An empty result is not an error.
pub fn discover_pdfs(input_dir: &Path) -> Result<Vec<PdfEntry>, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::InputDirNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let read_dir = std::fs::read_dir(input_dir).map_err(|e| BatchError::InputDirUnreadable {
        path: input_dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| BatchError::InputDirUnreadable {
            path: input_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() || !has_pdf_extension(&path) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!("skipping non-UTF-8 file name in {}", input_dir.display());
            continue;
        };
        files.push((file_name.to_string(), path));
    }

    // Lexicographic by file name: the documented discovery order.
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let entries: Vec<PdfEntry> = files
        .into_iter()
        .enumerate()
        .map(|(index, (file_name, path))| {
            let stem = Path::new(&file_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&file_name)
                .to_string();
            PdfEntry {
                path,
                file_name,
                stem,
                index,
            }
        })
        .collect();

    debug!(
        "discovered {} PDF file(s) in {}",
        entries.len(),
        input_dir.display()
    );
    Ok(entries)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
