//! Structured extraction: resume text → [`Resume`] via an OpenAI-compatible
//! chat-completions call.
//!
//! This module is intentionally thin. All prompt wording lives in
//! [`crate::prompts`] and the output shape lives in [`crate::schema`], so
//! either can change without touching the transport, decode, or retry logic
//! here.
//!
//! ## The schema-validation boundary
//!
//! The request pins `response_format` to a strict JSON Schema, and the
//! response content is decoded with `serde_json::from_str::<Resume>`. Any
//! shape the model produces that does not match the contract fails that one
//! file with a schema-validation error; nothing is patched up or guessed at.
//! The two tolerated softenings (nameless certifications, malformed URLs)
//! run *after* the decode, in [`Resume::normalize`].
//!
//! ## Retry Strategy
//!
//! Disabled by default: `max_retries = 0` gives every file exactly one
//! attempt. When enabled, only failures where a retry could change the
//! outcome (transport errors, timeouts, 429, 5xx) are retried, with
//! exponential backoff (`retry_backoff_ms * 2^(attempt-1)`). A
//! schema-validation failure or auth error short-circuits immediately.

use crate::config::{ExtractionConfig, API_KEY_ENV};
use crate::error::{BatchError, ExtractionFailure, ExtractionKind, FileError};
use crate::prompts::{user_message, DEFAULT_SYSTEM_PROMPT};
use crate::schema::{resume_json_schema, Resume, RESUME_SCHEMA_NAME};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// A backend that turns resume text into a structured [`Resume`].
///
/// One call means one attempt: retry policy is applied by the pipeline in
/// [`extract_with_retry`], and [`Resume::normalize`] runs there too, so
/// implementations return the decoded record as-is. The default
/// implementation is [`OpenAiExtractor`]; tests and embedders inject their
/// own via [`crate::config::ExtractionConfig::provider`].
pub trait ResumeExtractor: Send + Sync {
    /// Extract the structured record from resume text, in one attempt.
    fn extract_resume<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Resume, ExtractionFailure>>;
}

/// Run the extraction for one file, honouring the retry policy.
///
/// Rejects empty text before spending any provider call, applies the
/// transient-only retry loop around the provider, and normalizes the
/// successful record. Every failure comes back as a value attributed to
/// `file`; nothing here can abort a batch.
pub async fn extract_with_retry(
    provider: &Arc<dyn ResumeExtractor>,
    text: &str,
    file: &str,
    config: &ExtractionConfig,
) -> Result<Resume, FileError> {
    if text.trim().is_empty() {
        return Err(FileError::Extraction {
            file: file.to_string(),
            kind: ExtractionKind::EmptyText,
            detail: "no text could be extracted from the document".into(),
        });
    }

    let mut last_failure: Option<ExtractionFailure> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "{}: retry {}/{} after {}ms",
                file, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match provider.extract_resume(text).await {
            Ok(resume) => {
                if attempt > 0 {
                    debug!("{}: extraction succeeded on attempt {}", file, attempt + 1);
                }
                return Ok(resume.normalize());
            }
            Err(failure) => {
                warn!(
                    "{}: extraction attempt {} failed: {}",
                    file,
                    attempt + 1,
                    failure
                );
                let transient = failure.kind.is_transient();
                last_failure = Some(failure);
                if !transient {
                    break;
                }
            }
        }
    }

    let failure = last_failure.unwrap_or_else(|| {
        ExtractionFailure::new(ExtractionKind::Transport, "unknown extraction failure")
    });
    Err(FileError::extraction(file, failure))
}

// ── OpenAI-compatible HTTP client ────────────────────────────────────────────

/// [`ResumeExtractor`] over an OpenAI-compatible `/chat/completions`
/// endpoint with strict `json_schema` structured output.
///
/// Credential resolution happens once, at construction: an explicit
/// `config.api_key` wins, otherwise [`API_KEY_ENV`] is read from the
/// environment. Nothing is read from the environment per call.
pub struct OpenAiExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    system_prompt: Option<String>,
}

impl OpenAiExtractor {
    /// Build the HTTP extractor from a validated config.
    ///
    /// Fails with [`BatchError::ProviderNotConfigured`] when no credential
    /// is available; the per-call timeout comes from
    /// `config.api_timeout_secs`.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, BatchError> {
        let api_key = match &config.api_key {
            Some(key) if !key.trim().is_empty() => key.clone(),
            _ => std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| BatchError::ProviderNotConfigured {
                    hint: format!(
                        "Set {API_KEY_ENV} in your environment (or a .env file), \
                         or pass an api_key in the config."
                    ),
                })?,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| BatchError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }

    async fn request_once(&self, text: &str) -> Result<Resume, ExtractionFailure> {
        let user = user_message(text);
        let system = self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::JsonSchema {
                json_schema: JsonSchemaDefinition {
                    name: RESUME_SCHEMA_NAME.to_string(),
                    strict: true,
                    schema: resume_json_schema(),
                },
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_failure(status.as_u16(), &body));
        }

        let decoded: ChatCompletionResponse =
            response.json().await.map_err(transport_failure)?;
        let content = decoded
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        let cleaned = strip_json_fences(&content);
        if cleaned.is_empty() {
            return Err(ExtractionFailure::new(
                ExtractionKind::EmptyResponse,
                "model returned a response with no content",
            ));
        }

        let resume: Resume = serde_json::from_str(cleaned).map_err(|e| {
            ExtractionFailure::new(ExtractionKind::SchemaValidation, e.to_string())
        })?;

        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "structured extraction call succeeded"
        );
        Ok(resume)
    }
}

impl ResumeExtractor for OpenAiExtractor {
    fn extract_resume<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Resume, ExtractionFailure>> {
        Box::pin(self.request_once(text))
    }
}

fn transport_failure(e: reqwest::Error) -> ExtractionFailure {
    let kind = if e.is_timeout() {
        ExtractionKind::Timeout
    } else {
        ExtractionKind::Transport
    };
    ExtractionFailure::new(kind, e.to_string())
}

fn api_failure(status: u16, body: &str) -> ExtractionFailure {
    // Surface the provider's message field when the body is the usual
    // {"error": {"message": ...}} envelope; otherwise keep the raw body.
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    let kind = if status == 429 {
        ExtractionKind::RateLimited
    } else {
        ExtractionKind::Api { status }
    };
    ExtractionFailure::new(kind, message)
}

/// Strip a ```` ```json ```` (or bare ```` ``` ````) fence from model output.
///
/// Structured-output mode should make fences impossible, but compatible
/// providers that downgrade to plain JSON mode occasionally wrap the
/// document anyway.
fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    for prefix in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            let rest = rest.trim_start();
            return match rest.strip_suffix("```") {
                Some(inner) => inner.trim(),
                None => rest,
            };
        }
    }
    trimmed
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: usize,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ResponseFormat {
    #[serde(rename = "json_schema")]
    JsonSchema { json_schema: JsonSchemaDefinition },
}

#[derive(Serialize)]
struct JsonSchemaDefinition {
    name: String,
    strict: bool,
    schema: Value,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
