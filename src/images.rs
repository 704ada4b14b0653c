//! Image attachment preparation.
//!
//! Attached images are stored inline as `data:` URIs, so they are shrunk to a
//! bounded size and re-encoded as JPEG before they reach the journal. Bytes
//! that cannot be decoded or re-encoded are stored as they are.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::ImageConfig;

/// Read an image file and return it as a `data:` URI ready for a draft.
///
/// Only the file read can fail; decode and encode problems fall back to the
/// original bytes.
pub fn prepare_image(path: &Path, options: &ImageConfig) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    Ok(compress_or_passthrough(&bytes, options))
}

/// Downscale and re-encode `bytes`, or wrap them unchanged on failure.
pub fn compress_or_passthrough(bytes: &[u8], options: &ImageConfig) -> String {
    match compress(bytes, options) {
        Ok(jpeg) => {
            tracing::debug!(before = bytes.len(), after = jpeg.len(), "image compressed");
            data_uri("image/jpeg", &jpeg)
        }
        Err(e) => {
            tracing::warn!(error = %e, "image compression failed, using original");
            data_uri(sniff_mime(bytes), bytes)
        }
    }
}

fn compress(bytes: &[u8], options: &ImageConfig) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes).context("failed to decode image")?;
    let img = downscale(img, options.max_dimension);

    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, options.jpeg_quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .context("failed to encode JPEG")?;
    Ok(out.into_inner())
}

/// Scale so the longer side is at most `max_dim`, keeping the aspect ratio.
fn downscale(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    match target_size(width, height, max_dim) {
        Some((w, h)) => img.resize_exact(w, h, FilterType::Triangle),
        None => img,
    }
}

fn target_size(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    if max_dim == 0 {
        return None;
    }
    let scale = |side: u32, long: u32| ((side as f64 * max_dim as f64 / long as f64).round() as u32).max(1);
    if width > height && width > max_dim {
        Some((max_dim, scale(height, width)))
    } else if height >= width && height > max_dim {
        Some((scale(width, height), max_dim))
    } else {
        None
    }
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => "application/octet-stream",
    }
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decoded size in bytes of a `data:` URI payload, for display.
pub fn data_uri_size(uri: &str) -> usize {
    match uri.split_once(";base64,") {
        Some((_, payload)) => payload.len() / 4 * 3,
        None => uri.len(),
    }
}
