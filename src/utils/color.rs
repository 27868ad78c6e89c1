//! Hex color parsing and conversion utilities
//!
//! Color pickers hand the engine `#RRGGBB` strings. They are validated here,
//! before any HSL math runs, so a partially parsed color never propagates.

use crate::{
    color_space::{hsl_to_rgb, rgb_to_hsl},
    error::{RecolorError, Result},
    types::RgbColor,
};

/// Utility for parsing and converting colors
pub struct ColorParser;

impl ColorParser {
    /// Parse a `#RRGGBB` hex color string
    ///
    /// The leading `#` is optional. Exactly six hex digits are required;
    /// shorthand `#RGB` is rejected.
    ///
    /// # Examples
    /// ```rust
    /// use backdrop_tint::{utils::ColorParser, RgbColor};
    ///
    /// assert_eq!(ColorParser::parse_hex("#6B8E23").unwrap(), RgbColor::new(107, 142, 35));
    /// assert!(ColorParser::parse_hex("#fff").is_err());
    /// ```
    pub fn parse_hex(hex: &str) -> Result<RgbColor> {
        let digits = Self::digits(hex);

        if !Self::is_valid_hex(digits) {
            return Err(RecolorError::invalid_color(format!(
                "'{}' is not a #RRGGBB color",
                hex
            )));
        }

        let channel = |range: std::ops::Range<usize>, name: &str| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| {
                    RecolorError::invalid_color(format!("Invalid {} component in '{}'", name, hex))
                })
        };

        Ok(RgbColor::new(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    /// Convert a color to a lowercase hex string
    ///
    /// ```rust
    /// use backdrop_tint::{utils::ColorParser, RgbColor};
    ///
    /// let color = RgbColor::new(255, 0, 128);
    /// assert_eq!(ColorParser::to_hex(&color, true), "#ff0080");
    /// assert_eq!(ColorParser::to_hex(&color, false), "ff0080");
    /// ```
    #[must_use]
    pub fn to_hex(color: &RgbColor, include_hash: bool) -> String {
        if include_hash {
            format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
        } else {
            format!("{:02x}{:02x}{:02x}", color.r, color.g, color.b)
        }
    }

    /// Check the `#RRGGBB` format without parsing
    #[must_use]
    pub fn is_valid_hex(hex: &str) -> bool {
        let digits = Self::digits(hex);
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Strip at most one leading `#`
    fn digits(hex: &str) -> &str {
        hex.strip_prefix('#').unwrap_or(hex)
    }

    /// Hue and saturation (rounded) of a hex swatch, for driving a hue shift
    /// from a picked color
    pub fn hex_to_hue_saturation(hex: &str) -> Result<(f64, f64)> {
        let color = Self::parse_hex(hex)?;
        let hsl = rgb_to_hsl(color.r, color.g, color.b);
        Ok((hsl.h, hsl.s))
    }

    /// Swatch hex for a hue/saturation pair at mid lightness
    #[must_use]
    pub fn hue_saturation_to_hex(hue: f64, saturation: f64) -> String {
        Self::to_hex(&hsl_to_rgb(hue, saturation, 50.0), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6_digit() {
        assert_eq!(
            ColorParser::parse_hex("#ffffff").unwrap(),
            RgbColor::white()
        );
        assert_eq!(
            ColorParser::parse_hex("#000000").unwrap(),
            RgbColor::black()
        );
        assert_eq!(
            ColorParser::parse_hex("#FF0000").unwrap(),
            RgbColor::new(255, 0, 0)
        );
    }

    #[test]
    fn test_parse_hex_without_hash() {
        assert_eq!(
            ColorParser::parse_hex("0000ff").unwrap(),
            RgbColor::new(0, 0, 255)
        );
    }

    #[test]
    fn test_parse_hex_invalid() {
        for bad in [
            "#fff", "#gggggg", "#ff", "#fffffff", "", "#", "12345z", "#ffé000", "##6b8e23",
            " #6b8e23", "#6b8e23 ", "#6b 8e23",
        ] {
            let error = ColorParser::parse_hex(bad).unwrap_err();
            assert!(
                matches!(error, RecolorError::InvalidColorFormat(_)),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_is_valid_hex() {
        assert!(ColorParser::is_valid_hex("#ffffff"));
        assert!(ColorParser::is_valid_hex("ABCDEF"));
        assert!(!ColorParser::is_valid_hex("#fff"));
        assert!(!ColorParser::is_valid_hex("#gggggg"));
        assert!(!ColorParser::is_valid_hex("#fffffff"));
        assert!(!ColorParser::is_valid_hex("##ffffff"));
        assert!(!ColorParser::is_valid_hex(" ffffff"));
    }

    #[test]
    fn test_to_hex() {
        let color = RgbColor::new(255, 128, 0);
        assert_eq!(ColorParser::to_hex(&color, true), "#ff8000");
        assert_eq!(ColorParser::to_hex(&color, false), "ff8000");
    }

    #[test]
    fn test_hue_saturation_conversions() {
        let (hue, saturation) = ColorParser::hex_to_hue_saturation("#ff0000").unwrap();
        assert!((hue - 0.0).abs() < f64::EPSILON);
        assert!((saturation - 100.0).abs() < f64::EPSILON);

        assert_eq!(ColorParser::hue_saturation_to_hex(80.0, 35.0), "#8eac53");
        assert_eq!(ColorParser::hue_saturation_to_hex(0.0, 0.0), "#808080");

        assert!(ColorParser::hex_to_hue_saturation("#80808").is_err());
    }
}
