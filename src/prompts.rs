//! Instruction templates for structured resume extraction.
//!
//! All prompt text lives in this one module: tightening the no-invention
//! rule or adjusting date handling means editing a single constant, and unit
//! tests can assert on prompt content without ever touching a real model.
//!
//! Callers can override the default via
//! [`crate::config::ExtractionConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// Default system prompt for extracting a structured record from resume text.
///
/// This prompt is used when `ExtractionConfig::system_prompt` is `None`. The
/// response format is additionally constrained server-side via a JSON Schema,
/// so the prompt focuses on extraction faithfulness rather than output shape.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert resume parser. Your task is to extract structured candidate data from the plain text of a resume.

Follow these rules precisely:

1. FAITHFUL EXTRACTION
   - Extract ONLY information that is present in the resume text
   - Never invent, infer, or embellish a value the text does not state
   - Set a field to null when the resume does not provide it

2. CONTACT
   - Extract name, email, phone, and location exactly as written
   - linkedin, github, and website must be complete URLs; set them to null
     when the resume shows no such link

3. DATES
   - Copy dates verbatim ("Jun 2019", "2019-06", "June 2019 - Present")
   - Do NOT normalise, reformat, or complete partial dates

4. ORDER
   - Keep education, experience, and certification entries in the order they
     appear in the document

5. EXPERIENCE
   - Put the role narrative or bullet text into description, preserving line
     breaks between bullets

6. SKILLS
   - List each distinct skill once, as written, without grouping or ranking

7. CERTIFICATIONS
   - Include an entry only when the certification has a name
   - credential_url must be a complete URL or null"#;

/// Build the user message embedding the extracted resume text.
///
/// Sent alongside the system prompt as the sole user turn.
pub fn user_message(resume_text: &str) -> String {
    format!(
        "Resume text:\n\n\"\"\"\n{}\n\"\"\"\n\nExtract the structured record.",
        resume_text
    )
}
