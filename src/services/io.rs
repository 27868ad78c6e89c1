//! Image I/O operations service
//!
//! Decoding with input validation: a size ceiling and an allowed-formats list
//! are checked before any pixel data is decoded.

use crate::{
    error::{RecolorError, Result},
    types::PixelBuffer,
    utils::NumericValidator,
};
use image::ImageFormat;
use std::path::Path;

/// Default input size ceiling (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Input acceptance rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLimits {
    /// Largest accepted encoded input, in bytes
    pub max_file_size: u64,
    /// Formats accepted for decoding
    pub allowed_formats: Vec<ImageFormat>,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_formats: vec![ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP],
        }
    }
}

impl InputLimits {
    /// Reject inputs over the size ceiling
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_file_size {
            return Err(RecolorError::InputTooLarge {
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn allows(&self, format: ImageFormat) -> bool {
        self.allowed_formats.contains(&format)
    }
}

/// Service for loading images into pixel buffers
pub struct ImageIOService;

impl ImageIOService {
    /// Sniff the container format from the leading bytes
    ///
    /// # Errors
    /// - `RecolorError::UnsupportedFormat` if the format is unknown or not allowed
    pub fn detect_format(bytes: &[u8], limits: &InputLimits) -> Result<ImageFormat> {
        let format = image::guess_format(bytes)
            .map_err(|_| RecolorError::unsupported_format("unrecognized image data"))?;

        if !limits.allows(format) {
            return Err(RecolorError::unsupported_format(format!("{:?}", format)));
        }
        Ok(format)
    }

    /// Decode encoded image bytes into an RGBA buffer
    ///
    /// # Errors
    /// - `RecolorError::InputTooLarge` if `bytes` exceeds the size ceiling
    /// - `RecolorError::UnsupportedFormat` if the format is not allowed
    /// - `RecolorError::Image` if decoding fails
    ///
    /// # Examples
    /// ```rust,no_run
    /// use backdrop_tint::services::{ImageIOService, InputLimits};
    ///
    /// let data = std::fs::read("portrait.jpg")?;
    /// let buffer = ImageIOService::decode_bytes(&data, &InputLimits::default())?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode_bytes(bytes: &[u8], limits: &InputLimits) -> Result<PixelBuffer> {
        limits.check_size(bytes.len() as u64)?;
        let format = Self::detect_format(bytes, limits)?;

        let image = image::load_from_memory_with_format(bytes, format)?;
        log::debug!(
            "Decoded {:?} input: {}x{} ({} bytes)",
            format,
            image.width(),
            image.height(),
            bytes.len()
        );
        Ok(image.to_rgba8())
    }

    /// Load and decode an image file
    ///
    /// The size ceiling is checked against file metadata before reading.
    pub fn load_image<P: AsRef<Path>>(path: P, limits: &InputLimits) -> Result<PixelBuffer> {
        let path_ref = path.as_ref();

        let metadata = std::fs::metadata(path_ref)
            .map_err(|e| RecolorError::file_io_error("read image file", path_ref, &e))?;
        limits.check_size(metadata.len())?;

        let data = std::fs::read(path_ref)
            .map_err(|e| RecolorError::file_io_error("read image data", path_ref, &e))?;

        Self::decode_bytes(&data, limits).map_err(|e| match e {
            RecolorError::Image(inner) => RecolorError::processing_stage_error(
                "image loading",
                &inner.to_string(),
                Some(&format!("path: {}", path_ref.display())),
            ),
            other => other,
        })
    }

    /// Wrap raw RGBA8 bytes in a buffer
    ///
    /// # Errors
    /// - `RecolorError::InvalidRange` if `data.len() != width * height * 4`
    pub fn buffer_from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<PixelBuffer> {
        let expected = NumericValidator::rgba_byte_len(width, height)?;
        if data.len() != expected {
            return Err(RecolorError::invalid_range(format!(
                "RGBA data for {}x{} must be {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        PixelBuffer::from_raw(width, height, data).ok_or_else(|| {
            RecolorError::processing(format!("Could not build {}x{} buffer", width, height))
        })
    }

    /// Check if a file path has a supported image extension
    #[must_use]
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "webp"))
    }
}
