//! Error types for the sagip-worksheet library.
//!
//! Two error kinds map onto the two user actions:
//!
//! * [`InferenceError`]: the photo could not be turned into a
//!   [`crate::output::StructuredResult`]: the image was unreadable, the
//!   provider is not configured, the model call failed, or its reply was
//!   empty or did not match the expected JSON schema.
//!
//! * [`RenderError`]: a result was available but the worksheet PDF could
//!   not be produced or saved.
//!
//! Callers show a distinct retryable message for each. A failed render keeps
//! the analysis result intact so rendering can be retried without paying for
//! another model call.
//!
//! [`SagipError`] wraps both for callers that run the whole pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of the analysis stage.
#[derive(Debug, Error)]
pub enum InferenceError {
    // ── Image input ───────────────────────────────────────────────────────
    /// Image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    ImageNotFound { path: PathBuf },

    /// Process does not have read permission on the image.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The bytes are not a supported image (JPEG, PNG, WEBP).
    #[error("'{source_name}' is not a supported image (JPEG, PNG or WEBP expected)")]
    UnsupportedImage { source_name: String },

    /// The image header was recognised but decoding or re-encoding failed.
    #[error("Could not process image '{source_name}': {detail}")]
    ImageDecodeFailed { source_name: String, detail: String },

    /// Photo URL download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Photo URL download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Provider ──────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The provider call returned an error.
    #[error("LLM API error: {message}")]
    ApiError { message: String },

    /// The provider call did not finish within the configured timeout.
    #[error("LLM call timed out after {secs}s\nIncrease --api-timeout or try a smaller photo.")]
    Timeout { secs: u64 },

    // ── Reply ─────────────────────────────────────────────────────────────
    /// The model answered with no text at all.
    #[error("No response text received from the model")]
    EmptyResponse,

    /// The reply text is not JSON.
    #[error("Model reply is not valid JSON: {detail}")]
    NotJson { detail: String },

    /// The reply is JSON but does not match the worksheet schema.
    #[error("Model reply does not match the worksheet schema: {detail}")]
    SchemaMismatch { detail: String },
}

/// Failure of the worksheet rendering stage.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A string the layout needs was empty.
    #[error("Cannot lay out worksheet: {field} is missing")]
    MissingField { field: &'static str },

    /// lopdf refused to serialise the document.
    #[error("PDF encoding failed: {detail}")]
    Encode { detail: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write worksheet '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The render task panicked or could not be scheduled.
    #[error("Internal render error: {0}")]
    Internal(String),
}

/// Any error from the library.
#[derive(Debug, Error)]
pub enum SagipError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
