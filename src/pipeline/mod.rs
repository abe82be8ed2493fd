//! Pipeline stages for batch resume extraction.
//!
//! One submodule per stage; a stage can be tested on its own, and the
//! extraction backend can be substituted in tests without touching the
//! stages around it.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ text ──▶ llm
//! (dir scan)   (pdf)    (structured output)
//! ```
//!
//! 1. [`discover`] — enumerate the input directory's PDFs in deterministic
//!    order
//! 2. [`text`]     — extract page text; runs in `spawn_blocking` because PDF
//!    parsing is synchronous
//! 3. [`llm`]      — drive the schema-constrained extraction call with
//!    timeout and optional retry; the only stage with network I/O

pub mod discover;
pub mod llm;
pub mod text;
