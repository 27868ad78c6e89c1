//! RGB <-> HSL conversion
//!
//! Lightness separates "how light" from "what color", which is what lets the
//! recolor transforms swap the backdrop hue while keeping its shading.
//!
//! All rounding uses [`f64::round`] (half away from zero).

use crate::types::{HslColor, RgbColor};

/// Convert 8-bit RGB to HSL with hue, saturation and lightness rounded to
/// integers. Hue wraps so the result is always in `[0, 360)`.
///
/// This is the form the classifier thresholds are defined against.
#[must_use]
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> HslColor {
    let precise = rgb_to_hsl_precise(r, g, b);
    HslColor {
        h: precise.h.round() % 360.0,
        s: precise.s.round(),
        l: precise.l.round(),
    }
}

/// Convert 8-bit RGB to HSL without rounding.
#[must_use]
#[allow(clippy::float_cmp)] // channels come from u8, equal inputs give equal floats
pub fn rgb_to_hsl_precise(r: u8, g: u8, b: u8) -> HslColor {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return HslColor::new(0.0, 0.0, l * 100.0);
    }

    let delta = max - min;
    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let h = if max == r {
        ((g - b) / delta + if g < b { 6.0 } else { 0.0 }) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    HslColor::new(h * 360.0, s * 100.0, l * 100.0)
}

/// Convert HSL (degrees, percent, percent) to 8-bit RGB.
///
/// Inputs may be fractional; channels are rounded and clamped to `0..=255`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RgbColor {
    let h = h / 360.0;
    let s = s / 100.0;
    let l = l / 100.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    RgbColor::new(to_channel(r), to_channel(g), to_channel(b))
}

/// Convert an [`HslColor`] back to RGB.
#[must_use]
pub fn hsl_color_to_rgb(color: HslColor) -> RgbColor {
    hsl_to_rgb(color.h, color.s, color.l)
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn to_channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
