//! Stages of the analysis request.
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ parse
//! (path/URL)  (base64)  (VLM)   (JSON → StructuredResult)
//! ```
//!
//! 1. [`input`]  read a local file, download a URL or decode a data URL
//! 2. [`encode`] strip data-URL prefixes, downscale large photos, base64
//! 3. [`llm`]    the [`llm::InferenceClient`] seam and its edgequake-llm
//!    implementation; the only stage with model I/O
//! 4. [`parse`]  turn reply text into a complete result or an error

pub mod encode;
pub mod input;
pub mod llm;
pub mod parse;
