//! Core types shared by the classifier, transforms, brush and pipeline

use crate::{config::OutputFormat, error::Result, RecolorError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decoded RGBA8 pixel grid, row-major with a stride of `width * 4`.
pub type PixelBuffer = image::RgbaImage;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    #[must_use]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

impl From<[u8; 3]> for RgbColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HslColor {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl HslColor {
    #[must_use]
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }
}

/// Number of pixels a transform rewrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Pixels classified as background and rewritten
    pub background_pixels: u64,
    /// Pixels visited
    pub total_pixels: u64,
}

impl TransformStats {
    /// Fraction of the buffer classified as background (0.0 for empty buffers)
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.background_pixels as f64 / self.total_pixels as f64
        }
    }
}

/// Wall-clock timings for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingTimings {
    /// Preview downscale (zero for full-resolution runs)
    pub resize_ms: u64,

    /// Classifier-gated transform over every pixel
    pub transform_ms: u64,

    /// Raster encoding of the result
    pub encode_ms: u64,

    /// Total end-to-end processing time
    pub total_ms: u64,
}

impl ProcessingTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line human readable breakdown
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "total {}ms (resize {}ms, transform {}ms, encode {}ms)",
            self.total_ms, self.resize_ms, self.transform_ms, self.encode_ms
        )
    }
}

/// Encoded raster bytes with the format actually used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// MIME type of the encoded bytes
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Write the encoded bytes to disk, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RecolorError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }
        std::fs::write(path_ref, &self.bytes)
            .map_err(|e| RecolorError::file_io_error("write encoded image", path_ref, &e))
    }
}

/// Result of a pipeline run: display-ready buffer plus encoded output
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub buffer: PixelBuffer,
    pub encoded: EncodedImage,
    pub stats: TransformStats,
    pub timings: ProcessingTimings,
}

impl ProcessedImage {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}
