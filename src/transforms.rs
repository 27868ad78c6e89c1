//! Classifier-gated pixel rewrites
//!
//! Every transform walks the whole buffer, asks the classifier about each pixel
//! and rewrites only background pixels; subject pixels pass through untouched.
//! Buffers are mutated in place and handed back so calls can be chained.

use crate::{
    classifier::is_background,
    color_space::{hsl_to_rgb, rgb_to_hsl},
    config::{DetectionConfig, ProcessorConfig, RecolorConfig, RecolorMode},
    types::{PixelBuffer, RgbColor, TransformStats},
};
use image::Rgba;
use tracing::debug;

/// Apply brightness then contrast to a lightness value.
///
/// Brightness shifts lightness additively; contrast scales the distance from 50
/// by `(100 + contrast) / 100`. The result is clamped to `[0, 100]`, so any
/// input is safe. `contrast = -100` collapses every lightness to 50.
#[must_use]
pub fn adjusted_lightness(lightness: f64, brightness: i32, contrast: i32) -> f64 {
    let factor = (100.0 + f64::from(contrast)) / 100.0;
    let shifted = lightness + f64::from(brightness);
    (50.0 + (shifted - 50.0) * factor).clamp(0.0, 100.0)
}

/// Repaint the backdrop with the target hue and saturation, keeping its shading.
///
/// Only the original lightness survives; the source hue and saturation are
/// discarded. With `preserve_lightness` off, every background pixel gets
/// lightness 50. Alpha is never touched.
pub fn apply_hue_shift<'a>(
    buffer: &'a mut PixelBuffer,
    config: &RecolorConfig,
) -> &'a mut PixelBuffer {
    hue_shift_pixels(buffer, config);
    buffer
}

/// Replace the backdrop with a flat color (no shading preserved).
pub fn apply_color<'a>(
    buffer: &'a mut PixelBuffer,
    color: RgbColor,
    config: &DetectionConfig,
) -> &'a mut PixelBuffer {
    fill_pixels(buffer, color, config);
    buffer
}

/// Make the backdrop fully transparent; RGB is left as is.
///
/// The result must be encoded in an alpha-capable format.
pub fn apply_transparency<'a>(
    buffer: &'a mut PixelBuffer,
    config: &DetectionConfig,
) -> &'a mut PixelBuffer {
    clear_pixels(buffer, config);
    buffer
}

/// Dispatch on the configured mode and report how many pixels were rewritten.
pub fn apply_mode(buffer: &mut PixelBuffer, config: &ProcessorConfig) -> TransformStats {
    let total_pixels = u64::from(buffer.width()) * u64::from(buffer.height());
    let background_pixels = match config.mode {
        RecolorMode::HueShift => hue_shift_pixels(buffer, &config.recolor),
        RecolorMode::SolidFill => fill_pixels(buffer, config.fill_color, config.detection()),
        RecolorMode::Transparency => clear_pixels(buffer, config.detection()),
    };

    TransformStats {
        background_pixels,
        total_pixels,
    }
}

fn hue_shift_pixels(buffer: &mut PixelBuffer, config: &RecolorConfig) -> u64 {
    let rewritten =
        rewrite_background(buffer, &config.detection, |pixel| recolor_pixel(pixel, config));
    debug!(
        rewritten,
        hue = config.target_hue,
        saturation = config.target_saturation,
        "hue shift applied"
    );
    rewritten
}

fn fill_pixels(buffer: &mut PixelBuffer, color: RgbColor, config: &DetectionConfig) -> u64 {
    let rewritten = rewrite_background(buffer, config, |pixel| {
        pixel[0] = color.r;
        pixel[1] = color.g;
        pixel[2] = color.b;
    });
    debug!(rewritten, ?color, "solid fill applied");
    rewritten
}

fn clear_pixels(buffer: &mut PixelBuffer, config: &DetectionConfig) -> u64 {
    let rewritten = rewrite_background(buffer, config, |pixel| pixel[3] = 0);
    debug!(rewritten, "transparency applied");
    rewritten
}

fn recolor_pixel(pixel: &mut Rgba<u8>, config: &RecolorConfig) {
    let lightness = if config.preserve_lightness {
        let original = rgb_to_hsl(pixel[0], pixel[1], pixel[2]).l;
        adjusted_lightness(original, config.brightness, config.contrast)
    } else {
        50.0
    };
    let rgb = hsl_to_rgb(config.target_hue, config.target_saturation, lightness);
    pixel[0] = rgb.r;
    pixel[1] = rgb.g;
    pixel[2] = rgb.b;
}

/// Run `rewrite` on every background pixel; returns how many matched.
fn rewrite_background<F>(buffer: &mut PixelBuffer, config: &DetectionConfig, mut rewrite: F) -> u64
where
    F: FnMut(&mut Rgba<u8>),
{
    let mut rewritten = 0u64;
    for pixel in buffer.pixels_mut() {
        if is_background(pixel[0], pixel[1], pixel[2], config) {
            rewrite(pixel);
            rewritten += 1;
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn studio_recolor() -> RecolorConfig {
        RecolorConfig {
            detection: DetectionConfig::new(30.0, 15.0, 95.0),
            target_hue: 80.0,
            target_saturation: 35.0,
            preserve_lightness: true,
            brightness: 0,
            contrast: 0,
        }
    }

    #[test]
    fn test_adjusted_lightness() {
        assert!((adjusted_lightness(40.0, 0, 0) - 40.0).abs() < 1e-9);
        assert!((adjusted_lightness(40.0, 10, 0) - 50.0).abs() < 1e-9);
        assert!((adjusted_lightness(70.0, 0, 50) - 80.0).abs() < 1e-9);
        assert!((adjusted_lightness(90.0, 20, 100) - 100.0).abs() < 1e-9);
        assert!((adjusted_lightness(5.0, -20, 0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_contrast_minus_100_collapses_to_midpoint() {
        for l in [0.0, 12.5, 50.0, 73.0, 100.0] {
            for brightness in [-100, 0, 100] {
                assert!((adjusted_lightness(l, brightness, -100) - 50.0).abs() < f64::EPSILON);
            }
        }

        let mut buffer = PixelBuffer::from_pixel(3, 1, Rgba([60, 60, 60, 255]));
        buffer.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        let config = RecolorConfig {
            contrast: -100,
            brightness: 30,
            ..studio_recolor()
        };
        apply_hue_shift(&mut buffer, &config);
        let expected = hsl_to_rgb(80.0, 35.0, 50.0);
        for pixel in buffer.pixels() {
            assert_eq!([pixel[0], pixel[1], pixel[2]], [expected.r, expected.g, expected.b]);
        }
    }

    #[test]
    fn test_hue_shift_preserves_lightness() {
        // Grays whose rounded lightness is 20, 40, 50, 65 and 80
        for (gray, lightness) in [(50u8, 20.0), (101, 40.0), (127, 50.0), (165, 65.0), (203, 80.0)] {
            let mut buffer = PixelBuffer::from_pixel(2, 2, Rgba([gray, gray, gray, 200]));
            apply_hue_shift(&mut buffer, &studio_recolor());

            for pixel in buffer.pixels() {
                let hsl = rgb_to_hsl(pixel[0], pixel[1], pixel[2]);
                assert!((hsl.l - lightness).abs() <= 1.0, "lightness {} vs {}", hsl.l, lightness);
                assert!((hsl.h - 80.0).abs() <= 1.0, "hue {}", hsl.h);
                assert!((hsl.s - 35.0).abs() <= 1.0, "saturation {}", hsl.s);
                assert_eq!(pixel[3], 200);
            }
        }
    }

    #[test]
    fn test_hue_shift_flat_lightness() {
        let mut buffer = PixelBuffer::from_pixel(2, 1, Rgba([60, 60, 60, 255]));
        buffer.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        let config = RecolorConfig {
            preserve_lightness: false,
            ..studio_recolor()
        };
        apply_hue_shift(&mut buffer, &config);
        assert_eq!(buffer.get_pixel(0, 0), buffer.get_pixel(1, 0));
        assert_eq!(buffer.get_pixel(0, 0), &Rgba([142, 172, 83, 255]));
    }

    #[test]
    fn test_subject_pixels_pass_through() {
        let subject = Rgba([200, 30, 40, 255]);
        let mut buffer = PixelBuffer::from_pixel(2, 2, subject);
        buffer.put_pixel(0, 0, Rgba([128, 128, 128, 255]));
        let before = buffer.clone();

        apply_hue_shift(&mut buffer, &studio_recolor());
        for (x, y, pixel) in buffer.enumerate_pixels() {
            if (x, y) == (0, 0) {
                assert_ne!(pixel, before.get_pixel(x, y));
            } else {
                assert_eq!(pixel, &subject);
            }
        }
    }

    #[test]
    fn test_solid_fill() {
        let mut buffer = PixelBuffer::from_pixel(2, 1, Rgba([128, 128, 128, 90]));
        buffer.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        let fill = RgbColor::new(10, 20, 30);
        apply_color(&mut buffer, fill, &DetectionConfig::default());
        assert_eq!(buffer.get_pixel(0, 0), &Rgba([10, 20, 30, 90]));
        assert_eq!(buffer.get_pixel(1, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_transparency_only_touches_background_alpha() {
        let mut buffer = PixelBuffer::new(3, 1);
        buffer.put_pixel(0, 0, Rgba([128, 128, 128, 255]));
        buffer.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        buffer.put_pixel(2, 0, Rgba([100, 100, 100, 77]));
        let before = buffer.clone();

        apply_transparency(&mut buffer, &DetectionConfig::default());

        for (x, y, pixel) in buffer.enumerate_pixels() {
            let original = before.get_pixel(x, y);
            assert_eq!(pixel.0[..3], original.0[..3]);
            if is_background(original[0], original[1], original[2], &DetectionConfig::default()) {
                assert_eq!(pixel[3], 0);
            } else {
                assert_eq!(pixel[3], original[3]);
            }
        }
        assert_eq!(buffer.get_pixel(1, 0)[3], 255);
        assert_eq!(buffer.get_pixel(2, 0)[3], 0);
    }

    #[test]
    fn test_chaining_and_empty_result() {
        let mut buffer = PixelBuffer::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let before = buffer.clone();
        let detection = DetectionConfig::default();
        apply_transparency(apply_color(&mut buffer, RgbColor::white(), &detection), &detection);
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_apply_mode_matches_direct_transforms() {
        let mut source = PixelBuffer::from_pixel(4, 4, Rgba([128, 128, 128, 255]));
        source.put_pixel(0, 0, Rgba([20, 200, 20, 255]));

        let config = ProcessorConfig::default();
        let mut via_mode = source.clone();
        let stats = apply_mode(&mut via_mode, &config);
        let mut direct = source.clone();
        apply_hue_shift(&mut direct, &config.recolor);
        assert_eq!(via_mode, direct);
        assert_eq!(stats.background_pixels, 15);
        assert_eq!(stats.total_pixels, 16);

        let config = ProcessorConfig {
            mode: RecolorMode::Transparency,
            ..ProcessorConfig::default()
        };
        let mut via_mode = source.clone();
        let stats = apply_mode(&mut via_mode, &config);
        let mut direct = source.clone();
        apply_transparency(&mut direct, config.detection());
        assert_eq!(via_mode, direct);
        assert_eq!(stats.background_pixels, 15);
        assert_eq!(via_mode.get_pixel(1, 1)[3], 0);
        assert_eq!(via_mode.get_pixel(0, 0)[3], 255);

        let config = ProcessorConfig {
            mode: RecolorMode::SolidFill,
            fill_color: RgbColor::new(1, 2, 3),
            ..ProcessorConfig::default()
        };
        let mut via_mode = source.clone();
        let stats = apply_mode(&mut via_mode, &config);
        let mut direct = source;
        apply_color(&mut direct, config.fill_color, config.detection());
        assert_eq!(via_mode, direct);
        assert_eq!(stats.background_pixels, 15);
        assert_eq!(via_mode.get_pixel(3, 3), &Rgba([1, 2, 3, 255]));
    }
}
