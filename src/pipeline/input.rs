//! Input resolution: turn a user-supplied photo reference into image bytes.
//!
//! Three forms are accepted:
//! - a local file path,
//! - an `http(s)` URL, downloaded into memory,
//! - a `data:image/...;base64,` URL, as produced by browser file pickers.
//!
//! Magic bytes are checked before returning so callers get a clear
//! [`InferenceError::UnsupportedImage`] instead of a model-side failure.

use crate::error::InferenceError;
use crate::pipeline::encode::{is_data_url, strip_data_url_prefix};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::path::PathBuf;
use tracing::{debug, info};

/// Raw photo bytes with their detected type.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    /// Where the bytes came from, for error messages.
    pub name: String,
}

impl ImageSource {
    /// Build from bytes already in memory, validating the image type.
    pub fn from_bytes(bytes: Vec<u8>, name: impl Into<String>) -> Result<Self, InferenceError> {
        let name = name.into();
        let format = detect_format(&bytes).ok_or_else(|| InferenceError::UnsupportedImage {
            source_name: name.clone(),
        })?;
        Ok(Self { bytes, format, name })
    }

    pub fn mime_type(&self) -> &'static str {
        mime_for(self.format)
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a path, URL or data URL to validated image bytes.
pub async fn resolve_image(input: &str, timeout_secs: u64) -> Result<ImageSource, InferenceError> {
    if is_data_url(input) {
        decode_data_url(input)
    } else if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input).await
    }
}

fn decode_data_url(input: &str) -> Result<ImageSource, InferenceError> {
    let payload = strip_data_url_prefix(input);
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| InferenceError::ImageDecodeFailed {
            source_name: "data URL".into(),
            detail: e.to_string(),
        })?;
    debug!("Decoded data URL → {} bytes", bytes.len());
    ImageSource::from_bytes(bytes, "data URL")
}

async fn resolve_local(path_str: &str) -> Result<ImageSource, InferenceError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(InferenceError::PermissionDenied { path });
        }
        Err(_) => return Err(InferenceError::ImageNotFound { path }),
    };

    debug!("Read local image: {} ({} bytes)", path.display(), bytes.len());
    ImageSource::from_bytes(bytes, path.display().to_string())
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ImageSource, InferenceError> {
    info!("Downloading photo from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| InferenceError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            InferenceError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            InferenceError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(InferenceError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| InferenceError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    ImageSource::from_bytes(bytes.to_vec(), url)
}

/// Detect JPEG, PNG or WEBP from magic bytes.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(bytes) {
        Ok(f @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => Some(f),
        _ => None,
    }
}

pub(crate) fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        _ => "image/jpeg",
    }
}
