//! Per-pixel backdrop classifier
//!
//! Studio backdrops are near-gray with mid-range lightness. A pixel is background
//! when its saturation is at or under the tolerance and its lightness falls inside
//! the configured window. Pure black (shadows, edges), pure white (blown
//! highlights) and saturated subject colors are excluded.
//!
//! There is no spatial reasoning: each pixel is judged alone, so the cost is
//! linear in the pixel count.

use crate::{
    color_space::rgb_to_hsl,
    config::DetectionConfig,
    types::{PixelBuffer, TransformStats},
};

/// Is this pixel part of the backdrop?
///
/// An inverted lightness window (`min_lightness > max_lightness`) never matches.
///
/// ```rust
/// use backdrop_tint::{classifier::is_background, DetectionConfig};
///
/// let config = DetectionConfig::new(30.0, 15.0, 95.0);
/// assert!(is_background(128, 128, 128, &config));
/// assert!(!is_background(255, 0, 0, &config));
/// ```
#[must_use]
pub fn is_background(r: u8, g: u8, b: u8, config: &DetectionConfig) -> bool {
    let hsl = rgb_to_hsl(r, g, b);
    hsl.s <= config.saturation_tolerance
        && hsl.l >= config.min_lightness
        && hsl.l <= config.max_lightness
}

/// Classify every pixel; the mask is row-major like the buffer.
#[must_use]
pub fn background_mask(buffer: &PixelBuffer, config: &DetectionConfig) -> Vec<bool> {
    buffer
        .pixels()
        .map(|pixel| is_background(pixel[0], pixel[1], pixel[2], config))
        .collect()
}

/// Count background pixels without touching the buffer
#[must_use]
pub fn background_coverage(buffer: &PixelBuffer, config: &DetectionConfig) -> TransformStats {
    let background_pixels = buffer
        .pixels()
        .filter(|pixel| is_background(pixel[0], pixel[1], pixel[2], config))
        .count() as u64;

    TransformStats {
        background_pixels,
        total_pixels: u64::from(buffer.width()) * u64::from(buffer.height()),
    }
}
