//! Resume data contract: the structured record every extraction must produce.
//!
//! ## Why is almost every field optional?
//!
//! Real-world resumes omit things constantly: no phone number, no GPA, dates
//! written as "Summer 2019". Making fields required would turn ordinary
//! resumes into extraction failures. The schema therefore accepts absence
//! everywhere, with one deliberate exception: a certification without a name
//! is not a certification, so [`CertificationItem::name`] is required and
//! nameless entries are dropped during normalization instead of failing the
//! whole file.
//!
//! ## Decode strictness vs. normalization
//!
//! The decode boundary is strict: the provider's response must deserialize
//! into [`Resume`] or the file fails with a schema-validation error. After
//! the decode, [`Resume::normalize`] applies exactly two softenings that the
//! contract tolerates:
//!
//! 1. A malformed URL in `linkedin` / `github` / `website` /
//!    `credential_url` is coerced to absent (logged, never fatal).
//! 2. A certification whose name is missing or blank is dropped from the
//!    list (logged, never fatal).
//!
//! Blank strings are trimmed to `None` throughout so downstream consumers
//! never have to distinguish `""` from absent.
//!
//! Sequence order (education, experience, skills, certifications) follows
//! whatever the extraction call returned, which is typically resume document
//! order. Nothing here sorts.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

/// Name under which the schema is registered in the structured-output request.
pub const RESUME_SCHEMA_NAME: &str = "resume";

/// Candidate contact details.
///
/// The three link fields must hold well-formed absolute `http(s)` URLs after
/// [`Resume::normalize`]; anything else is coerced to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Free-text location as written ("Berlin", "SF Bay Area, Remote OK").
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

/// One education entry.
///
/// Dates and GPA are free-form strings: resumes mix "2019", "Jun 2019",
/// "2019-06", and "expected 2026", and no calendar parsing is attempted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<String>,
}

/// One work-experience entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub company: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    /// Narrative or bullet text, line breaks preserved.
    pub description: Option<String>,
}

/// One certification entry.
///
/// `name` is required; entries that arrive without one (or with a blank one)
/// are removed by [`Resume::normalize`] rather than failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationItem {
    #[serde(default)]
    pub name: String,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

/// The aggregate structured record for one resume.
///
/// This is exactly the shape requested from the provider via
/// [`resume_json_schema`] and the shape written to disk (plus provenance,
/// see [`crate::output::ProcessedResume`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<CertificationItem>,
}

impl Resume {
    /// Apply the contract's tolerated softenings after a strict decode.
    ///
    /// * blank strings become `None` (or are removed from `skills`)
    /// * malformed URL fields are coerced to `None` with a warning
    /// * certifications without a name are dropped with a warning
    ///
    /// Everything else, including sequence order, is left untouched.
    pub fn normalize(mut self) -> Resume {
        tidy(&mut self.contact.name);
        tidy(&mut self.contact.email);
        tidy(&mut self.contact.phone);
        tidy(&mut self.contact.location);
        tidy_url(&mut self.contact.linkedin, "contact.linkedin");
        tidy_url(&mut self.contact.github, "contact.github");
        tidy_url(&mut self.contact.website, "contact.website");

        for edu in &mut self.education {
            tidy(&mut edu.institution);
            tidy(&mut edu.degree);
            tidy(&mut edu.field_of_study);
            tidy(&mut edu.start_date);
            tidy(&mut edu.end_date);
            tidy(&mut edu.gpa);
        }

        for exp in &mut self.experience {
            tidy(&mut exp.company);
            tidy(&mut exp.title);
            tidy(&mut exp.start_date);
            tidy(&mut exp.end_date);
            tidy(&mut exp.location);
            tidy(&mut exp.description);
        }

        self.skills = self
            .skills
            .into_iter()
            .filter_map(|s| {
                let trimmed = s.trim().to_string();
                (!trimmed.is_empty()).then_some(trimmed)
            })
            .collect();

        let mut kept = Vec::with_capacity(self.certifications.len());
        for mut cert in self.certifications {
            cert.name = cert.name.trim().to_string();
            tidy(&mut cert.issuer);
            tidy(&mut cert.date);
            tidy(&mut cert.credential_id);
            tidy_url(&mut cert.credential_url, "certification.credential_url");
            if cert.name.is_empty() {
                warn!("dropped a certification entry without a name");
                continue;
            }
            kept.push(cert);
        }
        self.certifications = kept;

        self
    }
}

// ── Field cleanup helpers ────────────────────────────────────────────────────

/// Trim a free-text field; blank becomes `None`.
fn tidy(slot: &mut Option<String>) {
    if let Some(s) = slot.take() {
        let trimmed = s.trim().to_string();
        if !trimmed.is_empty() {
            *slot = Some(trimmed);
        }
    }
}

/// Trim a URL field and coerce anything that is not a well-formed absolute
/// `http(s)` URL to `None`.
fn tidy_url(slot: &mut Option<String>, field: &'static str) {
    tidy(slot);
    let ok = slot.as_deref().map_or(true, valid_http_url);
    if !ok {
        if let Some(url) = slot.take() {
            warn!(field, %url, "dropped malformed URL during normalization");
        }
    }
}

fn valid_http_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

// ── JSON Schema for structured output ────────────────────────────────────────

/// JSON Schema describing [`Resume`] for the provider's strict structured
/// output mode.
///
/// Strict mode requires every property to appear in `required` and
/// `additionalProperties: false` on every object; optionality is expressed
/// as the nullable type `["string", "null"]`.
pub fn resume_json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "contact": {
                "type": "object",
                "properties": {
                    "name": nullable_string(),
                    "email": nullable_string(),
                    "phone": nullable_string(),
                    "location": nullable_string(),
                    "linkedin": nullable_string(),
                    "github": nullable_string(),
                    "website": nullable_string(),
                },
                "required": [
                    "name", "email", "phone", "location",
                    "linkedin", "github", "website"
                ],
                "additionalProperties": false,
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "institution": nullable_string(),
                        "degree": nullable_string(),
                        "field_of_study": nullable_string(),
                        "start_date": nullable_string(),
                        "end_date": nullable_string(),
                        "gpa": nullable_string(),
                    },
                    "required": [
                        "institution", "degree", "field_of_study",
                        "start_date", "end_date", "gpa"
                    ],
                    "additionalProperties": false,
                },
            },
            "experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "company": nullable_string(),
                        "title": nullable_string(),
                        "start_date": nullable_string(),
                        "end_date": nullable_string(),
                        "location": nullable_string(),
                        "description": nullable_string(),
                    },
                    "required": [
                        "company", "title", "start_date",
                        "end_date", "location", "description"
                    ],
                    "additionalProperties": false,
                },
            },
            "skills": {
                "type": "array",
                "items": { "type": "string" },
            },
            "certifications": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "issuer": nullable_string(),
                        "date": nullable_string(),
                        "credential_id": nullable_string(),
                        "credential_url": nullable_string(),
                    },
                    "required": [
                        "name", "issuer", "date",
                        "credential_id", "credential_url"
                    ],
                    "additionalProperties": false,
                },
            },
        },
        "required": ["contact", "education", "experience", "skills", "certifications"],
        "additionalProperties": false,
    })
}

fn nullable_string() -> Value {
    json!({ "type": ["string", "null"] })
}

// ── Tests ────────────────────────────────────────────────────────────────────
