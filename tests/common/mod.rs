//! Shared helpers for the integration tests: a minimal PDF generator and a
//! deterministic mock extraction provider.
#![allow(dead_code)]

use futures::future::BoxFuture;
use resume2json::{ExtractionFailure, ExtractionKind, Resume, ResumeExtractor};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Marker line: any PDF whose text contains this makes [`EchoExtractor`]
/// return a schema-validation failure.
pub const UNPARSEABLE_MARKER: &str = "UNPARSEABLE";

/// Build a complete single-page PDF that renders `lines` of text.
///
/// The document carries a correct xref table and uses the built-in
/// Helvetica font, so any standards-compliant text extractor reads the
/// lines back verbatim (one `Tj` per line, ASCII only).
pub fn minimal_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 12 Tf\n14 TL\n72 720 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("T*\n");
        }
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        content.push_str(&format!("({escaped}) Tj\n"));
    }
    content.push_str("ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf: Vec<u8> = Vec::new();
    pdf.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    pdf
}

/// Bytes that carry a PDF header but no parseable document structure.
pub fn corrupt_pdf() -> Vec<u8> {
    b"%PDF-1.4\nthis file ends before any object or xref table".to_vec()
}

/// Write a generated resume PDF named `file_name` into `dir`.
pub fn write_resume_pdf(dir: &Path, file_name: &str, lines: &[&str]) {
    std::fs::write(dir.join(file_name), minimal_pdf(lines)).unwrap();
}

/// A [`ResumeExtractor`] that derives the record from the extracted text
/// instead of calling any API.
///
/// * first non-empty line        → `contact.name`
/// * `Email: <addr>` line        → `contact.email`
/// * `Skills: a, b, c` line      → `skills`
/// * text containing [`UNPARSEABLE_MARKER`] → schema-validation failure
///
/// With [`EchoExtractor::with_stagger`], each call sleeps one millisecond
/// per character of input text, so files with longer content finish later.
/// Ordering tests use this to force out-of-order completion.
pub struct EchoExtractor {
    pub calls: AtomicUsize,
    stagger: bool,
}

impl EchoExtractor {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            stagger: false,
        }
    }

    pub fn with_stagger() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            stagger: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResumeExtractor for EchoExtractor {
    fn extract_resume<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Resume, ExtractionFailure>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.stagger {
                tokio::time::sleep(Duration::from_millis(text.len() as u64)).await;
            }
            if text.contains(UNPARSEABLE_MARKER) {
                return Err(ExtractionFailure::new(
                    ExtractionKind::SchemaValidation,
                    "response did not match the resume schema",
                ));
            }
            Ok(resume_from_text(text))
        })
    }
}

fn resume_from_text(text: &str) -> Resume {
    let mut resume = Resume::default();
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    if let Some(name) = lines.next() {
        resume.contact.name = Some(name.to_string());
    }
    for line in lines {
        if let Some(email) = line.strip_prefix("Email: ") {
            resume.contact.email = Some(email.to_string());
        } else if let Some(skills) = line.strip_prefix("Skills: ") {
            resume.skills = skills.split(',').map(|s| s.trim().to_string()).collect();
        }
    }
    resume
}
