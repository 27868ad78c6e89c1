//! Output format handling service
//!
//! Keeps raster encoding out of the pipeline: the processor hands over an RGBA
//! buffer, this service picks the effective format and produces the bytes.

use crate::{
    config::{OutputFormat, RecolorMode},
    error::Result,
    types::{EncodedImage, PixelBuffer},
};
use image::{
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
    ExtendedColorType, ImageEncoder, RgbImage,
};

/// Service for encoding buffers into output formats
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Format actually used for a mode. Transparency needs an alpha channel,
    /// so it always encodes as PNG.
    ///
    /// ```rust
    /// use backdrop_tint::{services::OutputFormatHandler, OutputFormat, RecolorMode};
    ///
    /// assert_eq!(
    ///     OutputFormatHandler::effective_format(RecolorMode::Transparency, OutputFormat::Jpeg),
    ///     OutputFormat::Png
    /// );
    /// assert_eq!(
    ///     OutputFormatHandler::effective_format(RecolorMode::HueShift, OutputFormat::WebP),
    ///     OutputFormat::WebP
    /// );
    /// ```
    #[must_use]
    pub fn effective_format(mode: RecolorMode, requested: OutputFormat) -> OutputFormat {
        match mode {
            RecolorMode::Transparency => OutputFormat::Png,
            RecolorMode::HueShift | RecolorMode::SolidFill => requested,
        }
    }

    /// Encode a buffer
    ///
    /// `quality` is a 0.0-1.0 factor, mapped to the JPEG encoder's 1-100 scale.
    /// PNG and WebP are written losslessly and ignore it.
    ///
    /// # Errors
    /// - `RecolorError::Image` if the encoder fails
    /// - `RecolorError::UnsupportedFormat` for WebP when built without `webp-support`
    pub fn encode(buffer: &PixelBuffer, format: OutputFormat, quality: f32) -> Result<EncodedImage> {
        let (width, height) = buffer.dimensions();
        let mut bytes = Vec::new();

        match format {
            OutputFormat::Jpeg => {
                let rgb = Self::to_rgb(buffer);
                JpegEncoder::new_with_quality(&mut bytes, Self::jpeg_quality(quality)).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            },
            OutputFormat::Png => {
                PngEncoder::new(&mut bytes).write_image(
                    buffer.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
            },
            OutputFormat::WebP => Self::encode_webp(buffer, &mut bytes)?,
        }

        log::debug!(
            "Encoded {}x{} buffer as {} ({} bytes)",
            width,
            height,
            format,
            bytes.len()
        );

        Ok(EncodedImage {
            bytes,
            format,
            width,
            height,
        })
    }

    #[cfg(feature = "webp-support")]
    fn encode_webp(buffer: &PixelBuffer, bytes: &mut Vec<u8>) -> Result<()> {
        image::codecs::webp::WebPEncoder::new_lossless(bytes).write_image(
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }

    #[cfg(not(feature = "webp-support"))]
    fn encode_webp(_buffer: &PixelBuffer, _bytes: &mut Vec<u8>) -> Result<()> {
        Err(crate::error::RecolorError::unsupported_format(
            "WebP output requires the 'webp-support' feature",
        ))
    }

    /// Drop the alpha channel
    #[must_use]
    pub fn to_rgb(buffer: &PixelBuffer) -> RgbImage {
        let (width, height) = buffer.dimensions();
        let mut rgb_image = RgbImage::new(width, height);

        for (x, y, pixel) in buffer.enumerate_pixels() {
            rgb_image.put_pixel(x, y, image::Rgb([pixel[0], pixel[1], pixel[2]]));
        }

        rgb_image
    }

    /// Map a 0.0-1.0 quality factor onto the JPEG encoder's 1-100 scale
    #[must_use]
    pub fn jpeg_quality(quality: f32) -> u8 {
        if quality.is_nan() {
            return 1;
        }
        (quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// File extension (without the dot) for a format
    ///
    /// ```rust
    /// use backdrop_tint::{services::OutputFormatHandler, OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::WebP => true,
            OutputFormat::Jpeg => false,
        }
    }

    /// Warn when a mode's output would lose information in the chosen format.
    ///
    /// Returns `true` when the pipeline will write a different format than
    /// requested.
    #[must_use]
    pub fn validate_for_mode(mode: RecolorMode, format: OutputFormat) -> bool {
        let effective = Self::effective_format(mode, format);
        if effective == format {
            return false;
        }
        if Self::supports_transparency(format) {
            log::warn!("Transparency output is always {}; ignoring requested {}.", effective, format);
        } else {
            log::warn!(
                "Output format {} does not support transparency; writing {} instead.",
                format,
                effective
            );
        }
        true
    }
}
