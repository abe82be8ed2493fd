//! Integration tests for the batch pipeline, using generated PDFs and the
//! deterministic mock provider from `common`.
//!
//! No network access and no API key required; the live-API path is covered
//! separately in `tests/e2e.rs`.

mod common;

use chrono::{DateTime, Utc};
use common::{corrupt_pdf, write_resume_pdf, EchoExtractor, UNPARSEABLE_MARKER};
use resume2json::{
    process_batch, process_batch_sync, BatchProgressCallback, ExtractionConfig, ExtractionKind,
    FileError, ProcessedResume, ResumeExtractor, CONSOLIDATED_FILE_NAME,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn echo_config(provider: Arc<EchoExtractor>) -> ExtractionConfig {
    ExtractionConfig::builder()
        .provider(provider as Arc<dyn ResumeExtractor>)
        .build()
        .expect("valid config")
}

fn read_records(path: &Path) -> Vec<ProcessedResume> {
    let json = std::fs::read_to_string(path).expect("consolidated file must be readable");
    serde_json::from_str(&json).expect("consolidated file must be a JSON array of records")
}

// ── Mixed batches ────────────────────────────────────────────────────────────

/// One corrupt file among three good ones: the batch keeps going, the
/// failure is recorded, and the counts add up.
#[tokio::test]
async fn corrupt_file_does_not_stop_the_batch() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_resume_pdf(input.path(), "cv_alice.pdf", &["Alice Martin", "Email: alice@example.com"]);
    write_resume_pdf(input.path(), "cv_bob.pdf", &["Bob Okafor", "Skills: Rust, SQL"]);
    write_resume_pdf(input.path(), "cv_carol.pdf", &["Carol Wei"]);
    std::fs::write(input.path().join("broken.pdf"), corrupt_pdf()).unwrap();

    let provider = Arc::new(EchoExtractor::new());
    let config = echo_config(Arc::clone(&provider));

    let summary = process_batch(input.path(), output.path(), &config)
        .await
        .expect("a corrupt file must not be batch-fatal");

    assert_eq!(summary.total, 4);
    assert_eq!(summary.successful, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.successful + summary.failed, summary.total);

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].file, "broken.pdf");
    assert!(matches!(
        summary.failures[0].error,
        FileError::DocumentRead { .. }
    ));

    // The corrupt file never reaches the provider.
    assert_eq!(provider.calls(), 3);

    // Per-file outputs exist for successes only.
    assert!(output.path().join("cv_alice.json").is_file());
    assert!(output.path().join("cv_bob.json").is_file());
    assert!(output.path().join("cv_carol.json").is_file());
    assert!(!output.path().join("broken.json").exists());

    // Consolidated output lists the successes in input order.
    let consolidated = output.path().join(CONSOLIDATED_FILE_NAME);
    assert_eq!(summary.consolidated_path.as_deref(), Some(&*consolidated));
    let records = read_records(&consolidated);
    let sources: Vec<&str> = records.iter().map(|r| r.source_file.as_str()).collect();
    assert_eq!(sources, vec!["cv_alice.pdf", "cv_bob.pdf", "cv_carol.pdf"]);
    assert_eq!(records[0].resume.contact.name.as_deref(), Some("Alice Martin"));
    assert_eq!(records[1].resume.skills, vec!["Rust", "SQL"]);
}

/// An extraction-stage failure (bad model output) is isolated exactly like
/// a read-stage failure.
#[tokio::test]
async fn extraction_failure_is_isolated() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_resume_pdf(input.path(), "cv_good.pdf", &["Dana Fox"]);
    write_resume_pdf(input.path(), "cv_weird.pdf", &["Eve Null", UNPARSEABLE_MARKER]);

    let provider = Arc::new(EchoExtractor::new());
    let config = echo_config(Arc::clone(&provider));

    let summary = process_batch(input.path(), output.path(), &config)
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].file, "cv_weird.pdf");
    assert!(matches!(
        summary.failures[0].error,
        FileError::Extraction {
            kind: ExtractionKind::SchemaValidation,
            ..
        }
    ));

    assert!(output.path().join("cv_good.json").is_file());
    assert!(!output.path().join("cv_weird.json").exists());

    let records = read_records(&output.path().join(CONSOLIDATED_FILE_NAME));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_file, "cv_good.pdf");
}

/// Both files fail: totals still add up and no consolidated file appears.
#[tokio::test]
async fn consolidated_file_is_omitted_when_nothing_succeeds() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    std::fs::write(input.path().join("bad_one.pdf"), corrupt_pdf()).unwrap();
    std::fs::write(input.path().join("bad_two.pdf"), corrupt_pdf()).unwrap();

    let config = echo_config(Arc::new(EchoExtractor::new()));
    let summary = process_batch(input.path(), output.path(), &config)
        .await
        .expect("all files failing is not batch-fatal");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.successful, 0);
    assert_eq!(summary.failed, 2);
    assert!(summary.consolidated_path.is_none());
    assert!(!output.path().join(CONSOLIDATED_FILE_NAME).exists());
}

// ── Output shape ─────────────────────────────────────────────────────────────

/// The per-file JSON is the resume record flattened at the top level, with
/// `source_file` and an RFC 3339 `processed_at` alongside it.
#[tokio::test]
async fn per_file_json_has_flat_record_shape() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_resume_pdf(
        input.path(),
        "cv_alice.pdf",
        &["Alice Martin", "Email: alice@example.com", "Skills: Rust"],
    );

    let config = echo_config(Arc::new(EchoExtractor::new()));
    process_batch(input.path(), output.path(), &config)
        .await
        .unwrap();

    let json = std::fs::read_to_string(output.path().join("cv_alice.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    // Flattened: schema fields sit at the top level, not under a "resume" key.
    assert!(value.get("resume").is_none());
    assert_eq!(value["contact"]["name"], "Alice Martin");
    assert_eq!(value["contact"]["email"], "alice@example.com");
    assert_eq!(value["skills"][0], "Rust");
    assert_eq!(value["source_file"], "cv_alice.pdf");

    let stamp = value["processed_at"].as_str().expect("processed_at must be a string");
    let parsed: DateTime<Utc> = stamp.parse().expect("processed_at must be RFC 3339");
    assert!(parsed <= Utc::now());
}

/// Re-running the batch over existing outputs replaces them in place.
#[tokio::test]
async fn rerunning_a_batch_overwrites_previous_outputs() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_resume_pdf(input.path(), "cv_alice.pdf", &["Alice Martin"]);
    write_resume_pdf(input.path(), "cv_bob.pdf", &["Bob Okafor"]);

    let config = echo_config(Arc::new(EchoExtractor::new()));
    let first = process_batch(input.path(), output.path(), &config)
        .await
        .unwrap();
    let second = process_batch(input.path(), output.path(), &config)
        .await
        .unwrap();

    assert_eq!(first.successful, 2);
    assert_eq!(second.successful, 2);

    // Still exactly two records after the second run, not four.
    let records = read_records(&output.path().join(CONSOLIDATED_FILE_NAME));
    assert_eq!(records.len(), 2);

    // No leftover temp files from the atomic writes.
    let stray: Vec<_> = std::fs::read_dir(output.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(stray.is_empty(), "no .tmp files may survive: {stray:?}");
}

/// `write_consolidated(false)` keeps the per-file outputs but skips
/// `all_resumes.json`.
#[tokio::test]
async fn consolidated_output_can_be_disabled() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_resume_pdf(input.path(), "cv_alice.pdf", &["Alice Martin"]);

    let provider: Arc<dyn ResumeExtractor> = Arc::new(EchoExtractor::new());
    let config = ExtractionConfig::builder()
        .provider(provider)
        .write_consolidated(false)
        .build()
        .unwrap();

    let summary = process_batch(input.path(), output.path(), &config)
        .await
        .unwrap();

    assert_eq!(summary.successful, 1);
    assert!(summary.consolidated_path.is_none());
    assert!(output.path().join("cv_alice.json").is_file());
    assert!(!output.path().join(CONSOLIDATED_FILE_NAME).exists());
}

// ── Ordering under concurrency ───────────────────────────────────────────────

/// Files that finish out of order (longer content sleeps longer in the
/// staggered mock) still appear in input order in the consolidated output.
#[tokio::test]
async fn consolidated_order_is_input_order_not_completion_order() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    // aa has the longest text (finishes last), cc the shortest (finishes
    // first). Input order is aa, bb, cc.
    let padding_long = "x".repeat(160);
    let padding_mid = "x".repeat(80);
    write_resume_pdf(
        input.path(),
        "aa_slowest.pdf",
        &["Aaron Aardvark", &padding_long],
    );
    write_resume_pdf(input.path(), "bb_middle.pdf", &["Bea Badger", &padding_mid]);
    write_resume_pdf(input.path(), "cc_fastest.pdf", &["Cy Cheetah"]);

    let provider: Arc<dyn ResumeExtractor> = Arc::new(EchoExtractor::with_stagger());
    let config = ExtractionConfig::builder()
        .provider(provider)
        .concurrency(4)
        .build()
        .unwrap();

    let summary = process_batch(input.path(), output.path(), &config)
        .await
        .unwrap();
    assert_eq!(summary.successful, 3);

    let records = read_records(&output.path().join(CONSOLIDATED_FILE_NAME));
    let sources: Vec<&str> = records.iter().map(|r| r.source_file.as_str()).collect();
    assert_eq!(
        sources,
        vec!["aa_slowest.pdf", "bb_middle.pdf", "cc_fastest.pdf"]
    );
}

// ── Progress events ──────────────────────────────────────────────────────────

struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl BatchProgressCallback for RecordingCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.events.lock().unwrap().push(format!("batch_start {total_files}"));
    }
    fn on_file_start(&self, file_name: &str, _total_files: usize) {
        self.events.lock().unwrap().push(format!("start {file_name}"));
    }
    fn on_file_complete(&self, file_name: &str, _total_files: usize) {
        self.events.lock().unwrap().push(format!("complete {file_name}"));
    }
    fn on_file_error(&self, file_name: &str, _total_files: usize, _error: &str) {
        self.events.lock().unwrap().push(format!("error {file_name}"));
    }
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("batch_complete {total_files} {success_count}"));
    }
}

/// With `concurrency = 1` the full event sequence is deterministic.
#[tokio::test]
async fn progress_events_fire_in_order() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_resume_pdf(input.path(), "cv_alpha.pdf", &["Ana Alpha"]);
    write_resume_pdf(input.path(), "cv_beta.pdf", &["Ben Beta", UNPARSEABLE_MARKER]);
    write_resume_pdf(input.path(), "cv_gamma.pdf", &["Gus Gamma"]);

    let recorder = Arc::new(RecordingCallback {
        events: Mutex::new(Vec::new()),
    });
    let provider: Arc<dyn ResumeExtractor> = Arc::new(EchoExtractor::new());
    let config = ExtractionConfig::builder()
        .provider(provider)
        .progress_callback(Arc::clone(&recorder) as Arc<dyn BatchProgressCallback>)
        .concurrency(1)
        .build()
        .unwrap();

    process_batch(input.path(), output.path(), &config)
        .await
        .unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "batch_start 3",
            "start cv_alpha.pdf",
            "complete cv_alpha.pdf",
            "start cv_beta.pdf",
            "error cv_beta.pdf",
            "start cv_gamma.pdf",
            "complete cv_gamma.pdf",
            "batch_complete 3 2",
        ]
    );
}

// ── Sync wrapper ─────────────────────────────────────────────────────────────

/// `process_batch_sync` runs the same pipeline on its own runtime.
#[test]
fn sync_wrapper_processes_a_batch() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    write_resume_pdf(input.path(), "cv_alice.pdf", &["Alice Martin"]);

    let config = echo_config(Arc::new(EchoExtractor::new()));
    let summary = process_batch_sync(input.path(), output.path(), &config).unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.successful, 1);
    assert!(output.path().join("cv_alice.json").is_file());
}
