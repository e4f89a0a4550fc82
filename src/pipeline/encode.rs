//! Image encoding: photo bytes → base64 payload for the multimodal request.
//!
//! Vision APIs take images as raw base64 plus a MIME type. Browser-style
//! data URLs carry a `data:image/...;base64,` prefix that must be stripped
//! before transmission. Large phone photos are downscaled first; text on a
//! quiz stays legible well below 2048 px and the request gets much smaller.

use crate::error::InferenceError;
use crate::pipeline::input::{mime_for, ImageSource};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Cursor;
use tracing::{debug, warn};

static RE_DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/[A-Za-z0-9.+-]+;base64,").unwrap());

/// A base64 image ready to attach to a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Raw base64, never prefixed with `data:`.
    pub data: String,
    pub mime_type: String,
    /// Decoded payload size in bytes.
    pub byte_len: usize,
}

impl EncodedImage {
    /// Build from a base64 string or a full data URL.
    pub fn from_base64(data: &str, mime_type: impl Into<String>) -> Self {
        let data = strip_data_url_prefix(data).trim().to_string();
        let padding = data.bytes().rev().take_while(|&b| b == b'=').count();
        let byte_len = (data.len() / 4 * 3).saturating_sub(padding);
        Self {
            data,
            mime_type: mime_type.into(),
            byte_len,
        }
    }

    /// Convert into the attachment type understood by edgequake-llm.
    pub fn to_image_data(&self) -> ImageData {
        ImageData::new(self.data.clone(), self.mime_type.as_str()).with_detail("high")
    }
}

pub fn is_data_url(input: &str) -> bool {
    input.starts_with("data:image/")
}

/// Remove a leading `data:image/<type>;base64,` if present.
pub fn strip_data_url_prefix(input: &str) -> &str {
    match RE_DATA_URL_PREFIX.find(input) {
        Some(m) => &input[m.end()..],
        None => input,
    }
}

/// Encode a photo, downscaling it when its longest edge exceeds `max_dimension`.
pub fn encode_image(src: &ImageSource, max_dimension: u32) -> Result<EncodedImage, InferenceError> {
    let img = image::load_from_memory_with_format(&src.bytes, src.format).map_err(|e| {
        InferenceError::ImageDecodeFailed {
            source_name: src.name.clone(),
            detail: e.to_string(),
        }
    })?;

    let (bytes, format) = if img.width().max(img.height()) > max_dimension {
        warn!(
            "Photo is {}x{}; downscaling to fit {} px",
            img.width(),
            img.height(),
            max_dimension
        );
        let scaled = img.resize(max_dimension, max_dimension, FilterType::Triangle);
        (write_jpeg(&scaled, &src.name)?, ImageFormat::Jpeg)
    } else {
        (src.bytes.clone(), src.format)
    };

    let b64 = STANDARD.encode(&bytes);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(EncodedImage {
        data: b64,
        mime_type: mime_for(format).to_string(),
        byte_len: bytes.len(),
    })
}

fn write_jpeg(img: &DynamicImage, name: &str) -> Result<Vec<u8>, InferenceError> {
    // The JPEG encoder rejects alpha channels.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .map_err(|e| InferenceError::ImageDecodeFailed {
            source_name: name.to_string(),
            detail: e.to_string(),
        })?;
    Ok(buf)
}
