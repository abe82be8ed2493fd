//! Configuration types for batch resume extraction.
//!
//! Every setting for a batch run lives in [`ExtractionConfig`], assembled
//! through [`ExtractionConfigBuilder`]. One struct, borrowed by every worker
//! task, shows in a single place exactly what a run will do; nothing in the
//! library reads the process environment after the provider has been
//! constructed.
//!
//! # Why a builder
//! With this many knobs a positional constructor would be unreadable and
//! would break every caller each time a field is added. The builder keeps
//! call sites down to the settings they actually change and documented
//! defaults cover the rest.

use crate::error::BatchError;
use crate::pipeline::llm::ResumeExtractor;
use crate::progress::BatchProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Model used when none is configured. Matches the cheapest model that
/// handles structured extraction reliably.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API root. Override [`ExtractionConfig::base_url`]
/// to target any other compatible provider.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable the provider credential is read from when
/// [`ExtractionConfig::api_key`] is not set explicitly.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for a batch extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use resume2json::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .model("gpt-4o-mini")
///     .concurrency(8)
///     .api_timeout_secs(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Chat-completions model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// API root the client posts to, without a trailing `/chat/completions`.
    /// Default: [`DEFAULT_BASE_URL`]. Any OpenAI-compatible endpoint works
    /// as long as it supports `response_format: json_schema`.
    pub base_url: String,

    /// Explicit API credential. Default: `None`, meaning the provider reads
    /// [`API_KEY_ENV`] from the environment exactly once at construction.
    /// Never logged; the `Debug` impl redacts it.
    pub api_key: Option<String>,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Extraction wants the most literal reading of the text, not variety.
    /// Zero keeps repeated runs over the same resume as stable as the
    /// provider allows.
    pub temperature: f32,

    /// Maximum tokens the model may generate per resume. Default: 4096.
    ///
    /// A dense multi-page CV serialises to well under 3k output tokens;
    /// 4096 leaves headroom without risking runaway cost. Setting this too
    /// low truncates the JSON mid-object, which then fails schema validation.
    pub max_tokens: usize,

    /// Number of input files processed concurrently. Default: 4.
    ///
    /// The dominant per-file cost is one network call, so modest parallelism
    /// cuts wall-clock time nearly linearly. `1` reproduces strictly
    /// sequential processing. Raise with care: every unit is an extra
    /// in-flight API request counting against your rate limits.
    pub concurrency: usize,

    /// Maximum retry attempts for a transient provider failure. Default: 0.
    ///
    /// Zero means every file gets exactly one attempt, the baseline
    /// contract. When raised, only transport errors, timeouts, 429s and 5xx
    /// responses are retried; schema-validation failures never are, since
    /// resending the same text cannot fix a shape mismatch deterministically.
    pub max_retries: u32,

    /// First retry delay in milliseconds; each further attempt doubles it.
    /// Default: 500.
    ///
    /// Doubles after each attempt: 500 ms, 1 s, 2 s. Irrelevant while
    /// `max_retries` is 0.
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds for the extraction request. Default: 60.
    ///
    /// Converts a hung provider connection into a per-file failure instead
    /// of stalling the whole batch.
    pub api_timeout_secs: u64,

    /// Custom system prompt. If None, uses the built-in default from
    /// [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Whether to write the consolidated `all_resumes.json`. Default: true.
    pub write_consolidated: bool,

    /// Pre-constructed extraction provider. Takes precedence over building
    /// the HTTP client from `base_url`/`api_key`, which is how tests and
    /// embedders substitute their own backend.
    pub provider: Option<Arc<dyn ResumeExtractor>>,

    /// Optional observer for per-file progress events.
    pub progress_callback: Option<Arc<dyn BatchProgressCallback>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            temperature: 0.0,
            max_tokens: 4096,
            concurrency: 4,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            system_prompt: None,
            write_consolidated: true,
            provider: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("concurrency", &self.concurrency)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("write_consolidated", &self.write_consolidated)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn ResumeExtractor>"))
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn write_consolidated(mut self, v: bool) -> Self {
        self.config.write_consolidated = v;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ResumeExtractor>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Validate the accumulated settings and produce the final config.
    pub fn build(self) -> Result<ExtractionConfig, BatchError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(BatchError::InvalidConfig("Model must not be empty".into()));
        }
        if reqwest::Url::parse(&c.base_url).is_err() {
            return Err(BatchError::InvalidConfig(format!(
                "Base URL is not a valid URL: '{}'",
                c.base_url
            )));
        }
        if c.concurrency == 0 {
            return Err(BatchError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(BatchError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
