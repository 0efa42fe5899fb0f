//! Image selection and transport encoding.
//!
//! This module turns a user-chosen file into the in-memory payload sent to
//! the Gemini API: raw bytes plus a declared MIME type, with a Base64
//! encoding step for inline transmission.

use crate::error::{AppError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::ImageFormat;
use std::fs;
use std::path::Path;

/// Upload limit matching the original product constraint (10 MB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// An image the user selected for analysis.
///
/// Owns the raw bytes and the declared content type. Replaced wholesale when
/// the user picks a new image; dropped on reset, which releases the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    /// Raw encoded image bytes, exactly as read from the source.
    pub data: Vec<u8>,
    /// MIME type transmitted alongside the bytes, e.g. `image/jpeg`.
    pub mime_type: String,
}

impl SelectedImage {
    /// Builds a selection from already-loaded bytes and a known content type.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Reads an image file and sniffs its content type from the magic bytes.
    ///
    /// Accepts PNG, JPEG, GIF, and WebP up to [`MAX_IMAGE_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the file cannot be read, and
    /// [`AppError::ImageInput`] if it is too large or not a supported format.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;

        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::image(format!(
                "{} is {} bytes, over the {} byte limit",
                path.display(),
                data.len(),
                MAX_IMAGE_BYTES
            )));
        }

        let format = image::guess_format(&data)
            .map_err(|e| AppError::image(format!("{} is not a recognized image: {}", path.display(), e)))?;

        let mime_type = match format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            other => {
                return Err(AppError::image(format!(
                    "{} has unsupported format {:?}",
                    path.display(),
                    other
                )));
            }
        };

        Ok(Self::new(data, mime_type))
    }

    /// Encodes the image bytes to Base64 for inline transmission.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG header plus IHDR start, enough for format sniffing.
    const PNG_MAGIC: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];

    #[test]
    fn base64_round_trip() {
        let img = SelectedImage::new(vec![1, 2, 3, 255], "image/png");
        assert_eq!(img.to_base64(), "AQID/w==");
    }

    #[test]
    fn sniffs_png_from_magic_bytes() {
        let format = image::guess_format(PNG_MAGIC).unwrap();
        assert_eq!(format, ImageFormat::Png);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SelectedImage::from_path("/nonexistent/meal.jpg").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
