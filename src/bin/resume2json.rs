//! CLI binary for resume2json.
//!
//! Flag parsing, terminal progress, and summary printing live here; all
//! extraction logic stays in the library crate behind `ExtractionConfig`.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume2json::{
    discover_pdfs, process_batch, BatchProgressCallback, ExtractionConfig, ProgressCallback,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI styling helpers ─────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── indicatif-backed progress display ────────────────────────────────────────

/// Terminal progress display built on [indicatif]: a live bar plus one log
/// line per finished file. Safe under concurrency, where completion order
/// need not match input order.
struct CliProgressCallback {
    /// One bar pinned to the bottom row; `bar.println` routes lines above it.
    bar: ProgressBar,
    /// Per-file wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<String, Instant>>,
    /// Count of files that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create the callback in its pre-discovery state; `on_batch_start`
    /// supplies the real bar length once the input has been scanned.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        // Discovery phase: spinner without a counter, the total is unknown.
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning input directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Trade the spinner for a counted bar of length `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }

    fn elapsed_for(&self, file_name: &str) -> u128 {
        self.start_times
            .lock()
            .unwrap()
            .remove(file_name)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        // Discovery finished; the bar can show a real position and ETA.
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_files} resumes…"))
        ));
    }

    fn on_file_start(&self, file_name: &str, _total_files: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(file_name.to_string(), Instant::now());
        self.bar.set_message(file_name.to_string());
    }

    fn on_file_complete(&self, file_name: &str, _total_files: usize) {
        let elapsed_ms = self.elapsed_for(file_name);
        self.bar.println(format!(
            "  {} {:<32}  {}",
            green("✓"),
            file_name,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file_name: &str, _total_files: usize, error: &str) {
        let elapsed_ms = self.elapsed_for(file_name);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Cap the message so a single failure cannot wrap the whole row.
        let msg = match error.char_indices().nth(79) {
            Some((idx, _)) => format!("{}\u{2026}", &error[..idx]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} {:<32}  {}  {}",
            red("✗"),
            file_name,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = total_files.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} resumes extracted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} resumes extracted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process ./resume into ./output (the defaults)
  resume2json

  # Explicit directories
  resume2json ./inbox -o ./extracted

  # Use a different model, more parallel calls
  resume2json --model gpt-4o --concurrency 8

  # Retry transient API failures up to 3 times per file
  resume2json --max-retries 3

  # Per-file JSON only, skip all_resumes.json
  resume2json --no-consolidated

  # Fail the process (exit 1) if any file could not be extracted
  resume2json --strict

  # List the PDFs that would be processed (no API key needed)
  resume2json --list-only

  # Machine-readable batch summary on stdout
  resume2json --json > summary.json

OUTPUT LAYOUT:
  output/
    cv_alice.json      one record per successfully processed PDF
    cv_bob.json
    all_resumes.json   every successful record, in input order
                       (omitted when no file succeeds)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY             API key for the extraction endpoint (required)
  RESUME2JSON_MODEL          Override model ID
  RESUME2JSON_BASE_URL       OpenAI-compatible endpoint base URL
  RESUME2JSON_CONCURRENCY    Parallel extraction calls
  RESUME2JSON_MAX_RETRIES    Retries per file for transient API failures

  Variables are also read from a .env file in the working directory.

SETUP:
  1. Export a key:    export OPENAI_API_KEY=sk-...
  2. Drop PDFs into:  ./resume/
  3. Run:             resume2json
"#;

/// Extract structured resume data from a directory of PDF files.
#[derive(Parser, Debug)]
#[command(
    name = "resume2json",
    version,
    about = "Extract structured resume data from PDF files using schema-constrained LLM calls",
    long_about = "Process a directory of PDF resumes into structured JSON. Each file's text is \
extracted locally, then sent to an OpenAI-compatible endpoint with a strict JSON Schema \
response format. Per-file failures are reported and skipped; the rest of the batch continues.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the PDF resumes to process.
    #[arg(default_value = "resume")]
    input_dir: PathBuf,

    /// Directory to write the JSON output files into.
    #[arg(short, long, env = "RESUME2JSON_OUTPUT", default_value = "output")]
    output_dir: PathBuf,

    /// Model ID for the extraction call.
    #[arg(
        long,
        env = "RESUME2JSON_MODEL",
        default_value = "gpt-4o-mini",
        long_help = "Chat-completions model to use. Must support strict json_schema response \
          format (gpt-4o-mini, gpt-4o, and newer)."
    )]
    model: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "RESUME2JSON_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// Number of concurrent extraction calls.
    #[arg(short, long, env = "RESUME2JSON_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Retries per file for transient API failures (0 = one attempt only).
    #[arg(long, env = "RESUME2JSON_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Max LLM output tokens per file.
    #[arg(long, env = "RESUME2JSON_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0). Keep at 0 for reproducible extraction.
    #[arg(long, env = "RESUME2JSON_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Per-file API call timeout in seconds.
    #[arg(long, env = "RESUME2JSON_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// File whose contents replace the built-in system prompt.
    #[arg(long, env = "RESUME2JSON_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Skip writing the consolidated all_resumes.json.
    #[arg(long, env = "RESUME2JSON_NO_CONSOLIDATED")]
    no_consolidated: bool,

    /// Exit with code 1 if any file fails to extract.
    #[arg(long)]
    strict: bool,

    /// List the PDFs that would be processed, then exit (no API key needed).
    #[arg(long)]
    list_only: bool,

    /// Print the batch summary as JSON on stdout.
    #[arg(long, env = "RESUME2JSON_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "RESUME2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Show debug-level logs.
    #[arg(short, long, env = "RESUME2JSON_VERBOSE")]
    verbose: bool,

    /// Silence everything but errors.
    #[arg(short, long, env = "RESUME2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY and RESUME2JSON_* vars from a local .env file
    // before clap resolves env-backed arguments.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // While the bar is drawing, INFO-level library logs would tear it, so
    // they are raised to ERROR unless the user asked for verbosity.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_only {
        let entries =
            discover_pdfs(&cli.input_dir).context("Failed to scan input directory")?;
        if cli.json {
            let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&names).context("Failed to serialise file list")?
            );
        } else {
            for entry in &entries {
                println!("{}", entry.file_name);
            }
            if !cli.quiet {
                eprintln!("{} PDF files in {}", entries.len(), cli.input_dir.display());
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Run the batch ────────────────────────────────────────────────────
    let summary = process_batch(&cli.input_dir, &cli.output_dir, &config)
        .await
        .context("Batch extraction failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        if !show_progress {
            // The bar already reported each file; repeat stats only without it.
            eprintln!(
                "Processed {}/{} files in {}ms",
                summary.successful, summary.total, summary.duration_ms
            );
            for failure in &summary.failures {
                eprintln!("  {} {}: {}", red("✗"), failure.file, failure.error);
            }
        }
        if let Some(ref path) = summary.consolidated_path {
            eprintln!(
                "   {} records  →  {}",
                dim(&summary.successful.to_string()),
                bold(&path.display().to_string())
            );
        }
    }

    if cli.strict && summary.failed > 0 {
        anyhow::bail!("{} of {} files failed", summary.failed, summary.total);
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt file {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = ExtractionConfig::builder()
        .model(&cli.model)
        .base_url(&cli.base_url)
        .concurrency(cli.concurrency)
        .max_retries(cli.max_retries)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .write_consolidated(!cli.no_consolidated);

    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
