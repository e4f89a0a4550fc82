//! # sagip-worksheet
//!
//! Turn a photo of a graded quiz into a printable remediation worksheet.
//!
//! ## Pipeline Overview
//!
//! ```text
//! quiz photo (path / URL / data URL)
//!  │
//!  ├─ 1. Input    read file, download URL or decode data URL
//!  ├─ 2. Encode   downscale oversized photos, base64
//!  ├─ 3. VLM      one call: find the errors, write a concept review,
//!  │              practice problems and an answer key (JSON)
//!  ├─ 4. Parse    reply → StructuredResult, or a typed error
//!  └─ 5. Render   StructuredResult → A4 PDF worksheet (lopdf)
//! ```
//!
//! Analysis and rendering are separate calls with separate error types
//! ([`InferenceError`], [`RenderError`]) so a failed render can be retried
//! without another model call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sagip_worksheet::{analyze_image, save_worksheet, Language, WorksheetConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY
//!     let config = WorksheetConfig::default();
//!     let output = analyze_image("quiz.jpg", Language::Taglish, &config).await?;
//!     println!("{}", output.result.concept_review);
//!
//!     let path = save_worksheet(&output.result, output.language, &config).await?;
//!     eprintln!("saved {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sagip` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! sagip-worksheet = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod worksheet;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_image, analyze_sync, resolve_provider};
pub use config::{FooterStyle, WorksheetConfig, WorksheetConfigBuilder};
pub use error::{InferenceError, RenderError, SagipError};
pub use language::Language;
pub use output::{AnalysisOutput, AnalysisStats, RenderedWorksheet, StructuredResult};
pub use pipeline::encode::EncodedImage;
pub use pipeline::llm::{InferenceClient, InferenceReply, InferenceRequest, LlmInferenceClient};
pub use worksheet::{render_worksheet, save_worksheet, save_worksheet_sync};
