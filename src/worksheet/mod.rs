//! Worksheet rendering: [`StructuredResult`] → printable A4 PDF.
//!
//! ```text
//! StructuredResult
//!  │
//!  ├─ sanitize  ₱ → "PHP ", typographic dashes/quotes → ASCII
//!  ├─ layout    cursor-driven placement onto a DocumentBuilder
//!  ├─ pdf       DocumentBuilder → bytes (lopdf, Helvetica, WinAnsi)
//!  └─ save      spawn_blocking + temp file + rename
//! ```

pub mod builder;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod sanitize;

use crate::config::WorksheetConfig;
use crate::error::RenderError;
use crate::language::Language;
use crate::output::{RenderedWorksheet, StructuredResult};
use layout::{RenderOptions, TITLE};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `Sagip_Worksheet_<unix-millis>.pdf`
pub fn worksheet_file_name(timestamp_ms: i64) -> String {
    format!("Sagip_Worksheet_{timestamp_ms}.pdf")
}

/// Lay out and encode a worksheet with explicit options.
pub fn render_with_options(
    result: &StructuredResult,
    language: Language,
    options: &RenderOptions,
) -> Result<RenderedWorksheet, RenderError> {
    let doc = layout::layout_worksheet(result, language, options)?;
    let page_count = doc.page_count();
    let bytes = pdf::encode(&doc, TITLE)?;
    debug!("Encoded {} pages, {} bytes", page_count, bytes.len());

    Ok(RenderedWorksheet {
        bytes,
        page_count,
        file_name: worksheet_file_name(chrono::Utc::now().timestamp_millis()),
    })
}

/// Render a worksheet dated today, with the footer from `config`.
///
/// # Errors
/// [`RenderError::MissingField`] for a blank concept review,
/// [`RenderError::Encode`] if PDF serialisation fails.
pub fn render_worksheet(
    result: &StructuredResult,
    language: Language,
    config: &WorksheetConfig,
) -> Result<RenderedWorksheet, RenderError> {
    render_with_options(result, language, &RenderOptions::today(config.footer.clone()))
}

/// Render a worksheet and save it into `config.output_dir`.
///
/// Rendering runs on the blocking pool; a panic there surfaces as
/// [`RenderError::Internal`]. The file is written atomically (temp file +
/// rename). Returns the path of the saved PDF.
pub async fn save_worksheet(
    result: &StructuredResult,
    language: Language,
    config: &WorksheetConfig,
) -> Result<PathBuf, RenderError> {
    let owned = result.clone();
    let options = RenderOptions::today(config.footer.clone());

    let rendered =
        tokio::task::spawn_blocking(move || render_with_options(&owned, language, &options))
            .await
            .map_err(|e| RenderError::Internal(format!("Render task panicked: {e}")))??;

    let path = config.output_dir.join(&rendered.file_name);
    write_atomic(&path, &rendered.bytes).await?;

    info!(
        "Saved {}-page worksheet to {}",
        rendered.page_count,
        path.display()
    );
    Ok(path)
}

/// Synchronous wrapper around [`save_worksheet`].
///
/// Creates a temporary tokio runtime internally.
pub fn save_worksheet_sync(
    result: &StructuredResult,
    language: Language,
    config: &WorksheetConfig,
) -> Result<PathBuf, RenderError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RenderError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(save_worksheet(result, language, config))
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let write_err = |e| RenderError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuredResult {
        StructuredResult {
            concept_review: "Kapag nagdadagdag, pagsamahin ang mga bilang.".into(),
            practice_problems: vec!["2+2=___".into(), "3+5=___".into()],
            answer_key: vec!["4".into(), "8".into()],
        }
    }

    #[test]
    fn file_name_format() {
        assert_eq!(
            worksheet_file_name(1_760_000_000_123),
            "Sagip_Worksheet_1760000000123.pdf"
        );
    }

    #[test]
    fn render_counts_pages() {
        let out = render_worksheet(&sample(), Language::Tagalog, &WorksheetConfig::default())
            .expect("render");
        assert_eq!(out.page_count, 2);
        assert!(out.bytes.starts_with(b"%PDF"));
        assert!(out.file_name.starts_with("Sagip_Worksheet_"));
    }

    #[tokio::test]
    async fn save_writes_into_output_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = WorksheetConfig::builder()
            .output_dir(dir.path().join("nested"))
            .build()
            .expect("valid");

        let path = save_worksheet(&sample(), Language::English, &config)
            .await
            .expect("saved");

        assert!(path.starts_with(dir.path()));
        let bytes = std::fs::read(&path).expect("file exists");
        let doc = lopdf::Document::load_mem(&bytes).expect("valid pdf");
        assert_eq!(doc.get_pages().len(), 2);
        assert!(!path.with_extension("pdf.tmp").exists());
    }

    #[tokio::test]
    async fn save_reports_render_errors() {
        let mut bad = sample();
        bad.concept_review.clear();
        let err = save_worksheet(&bad, Language::English, &WorksheetConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingField { .. }));
    }
}
