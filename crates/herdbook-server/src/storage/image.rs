//! Uploaded image detection

use image::ImageFormat;

/// Formats accepted for bovid photos
pub const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// A payload that decoded as an accepted image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedImage {
    pub format: ImageFormat,
}

impl DetectedImage {
    /// Canonical file extension, without the dot
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }

    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Sniff the format from magic bytes and fully decode the payload
///
/// Returns `None` for unknown formats, formats outside [`ACCEPTED_FORMATS`],
/// and truncated or corrupt data.
pub fn detect_image(bytes: &[u8]) -> Option<DetectedImage> {
    let format = image::guess_format(bytes).ok()?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return None;
    }

    match image::load_from_memory_with_format(bytes, format) {
        Ok(_) => Some(DetectedImage { format }),
        Err(e) => {
            tracing::debug!(error = %e, ?format, "Image failed to decode");
            None
        },
    }
}
