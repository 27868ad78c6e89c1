//! Configuration types for backdrop detection and recoloring

use crate::{
    error::{RecolorError, Result},
    types::RgbColor,
    utils::NumericValidator,
};
use serde::{Deserialize, Serialize};

/// Slider ranges exposed by interactive front ends.
///
/// The engine accepts the wider domains checked by [`ProcessorConfig::validate`];
/// these are the narrower ranges a UI offers.
pub mod ranges {
    use std::ops::RangeInclusive;

    pub const SATURATION_TOLERANCE: RangeInclusive<f64> = 5.0..=60.0;
    pub const MIN_LIGHTNESS: RangeInclusive<f64> = 0.0..=50.0;
    pub const MAX_LIGHTNESS: RangeInclusive<f64> = 50.0..=100.0;
    /// Upper bound is exclusive in practice; 360 wraps to 0.
    pub const TARGET_HUE: RangeInclusive<f64> = 0.0..=359.0;
    pub const TARGET_SATURATION: RangeInclusive<f64> = 0.0..=100.0;
    pub const BRIGHTNESS: RangeInclusive<i32> = -50..=50;
    pub const CONTRAST: RangeInclusive<i32> = -50..=50;
    pub const BRUSH_RADIUS: RangeInclusive<f64> = 5.0..=80.0;
}

/// Default longest edge of interactive previews, in pixels
pub const DEFAULT_PREVIEW_MAX_DIMENSION: u32 = 800;

/// Default encode quality for full-resolution output
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Encode quality used for previews
pub const PREVIEW_QUALITY: f32 = 0.8;

/// Encode quality used when exporting from an editor session
pub const EXPORT_QUALITY: f32 = 0.95;

/// Thresholds deciding which pixels count as backdrop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum HSL saturation (0-100) still considered gray
    pub saturation_tolerance: f64,
    /// Darkest lightness (0-100) counted as backdrop; excludes shadows and edges
    pub min_lightness: f64,
    /// Brightest lightness (0-100) counted as backdrop; excludes blown highlights
    pub max_lightness: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            saturation_tolerance: 30.0,
            min_lightness: 15.0,
            max_lightness: 95.0,
        }
    }
}

impl DetectionConfig {
    #[must_use]
    pub fn new(saturation_tolerance: f64, min_lightness: f64, max_lightness: f64) -> Self {
        Self {
            saturation_tolerance,
            min_lightness,
            max_lightness,
        }
    }

    /// True when the lightness window cannot match anything.
    ///
    /// An inverted window is tolerated: front ends produce it transiently while
    /// a slider is being dragged.
    #[must_use]
    pub fn is_empty_window(&self) -> bool {
        self.min_lightness > self.max_lightness
    }
}

/// Hue-shift parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecolorConfig {
    #[serde(flatten)]
    pub detection: DetectionConfig,
    /// Hue in degrees `[0, 360)`
    pub target_hue: f64,
    /// Saturation `[0, 100]`
    pub target_saturation: f64,
    /// Keep the backdrop's own lightness (shading) instead of a flat 50
    pub preserve_lightness: bool,
    /// Additive lightness shift, `[-100, 100]`
    pub brightness: i32,
    /// Lightness expansion around 50, `[-100, 100]`
    pub contrast: i32,
}

impl Default for RecolorConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            target_hue: 80.0,
            target_saturation: 35.0,
            preserve_lightness: true,
            brightness: 0,
            contrast: 0,
        }
    }
}

/// Which transform the pipeline applies to background pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecolorMode {
    /// Replace hue/saturation, keep lightness-driven texture
    #[default]
    HueShift,
    /// Flat color replacement
    SolidFill,
    /// Cut the backdrop out to alpha 0
    Transparency,
}

impl std::fmt::Display for RecolorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HueShift => write!(f, "hue-shift"),
            Self::SolidFill => write!(f, "solid-fill"),
            Self::Transparency => write!(f, "transparency"),
        }
    }
}

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency)
    #[default]
    Jpeg,
    /// WebP with alpha channel transparency
    WebP,
}

impl OutputFormat {
    /// MIME type for the format
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
        }
    }
}

/// Named backdrop color preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPreset {
    pub name: &'static str,
    pub hue: u16,
    pub saturation: u8,
    /// Swatch used for solid fills
    pub hex: &'static str,
}

/// Built-in backdrop presets
pub static COLOR_PRESETS: [ColorPreset; 6] = [
    ColorPreset {
        name: "olive-green",
        hue: 80,
        saturation: 35,
        hex: "#6B8E23",
    },
    ColorPreset {
        name: "mint-green",
        hue: 150,
        saturation: 40,
        hex: "#98FF98",
    },
    ColorPreset {
        name: "sky-blue",
        hue: 200,
        saturation: 50,
        hex: "#87CEEB",
    },
    ColorPreset {
        name: "pastel-pink",
        hue: 330,
        saturation: 30,
        hex: "#FFB6C1",
    },
    ColorPreset {
        name: "beige",
        hue: 40,
        saturation: 25,
        hex: "#F5DEB3",
    },
    ColorPreset {
        name: "neutral-gray",
        hue: 0,
        saturation: 0,
        hex: "#808080",
    },
];

impl ColorPreset {
    /// Look up a preset by name, ignoring case and `_`/space vs `-`
    #[must_use]
    pub fn find(name: &str) -> Option<&'static ColorPreset> {
        let wanted = name.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        COLOR_PRESETS.iter().find(|preset| preset.name == wanted)
    }
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Transform applied to background pixels
    pub mode: RecolorMode,
    /// Detection thresholds plus hue-shift parameters
    pub recolor: RecolorConfig,
    /// Replacement color for [`RecolorMode::SolidFill`]
    pub fill_color: RgbColor,
    /// Requested encoding; transparency mode overrides it with PNG
    pub output_format: OutputFormat,
    /// Encoder quality in `[0, 1]`, used by lossy formats only
    pub quality: f32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            mode: RecolorMode::default(),
            recolor: RecolorConfig::default(),
            fill_color: RgbColor::new(0x6B, 0x8E, 0x23),
            output_format: OutputFormat::default(),
            quality: DEFAULT_QUALITY,
        }
    }
}

impl ProcessorConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use backdrop_tint::{ProcessorConfig, RecolorMode};
    ///
    /// let config = ProcessorConfig::builder()
    ///     .mode(RecolorMode::HueShift)
    ///     .target_hue(200.0)
    ///     .target_saturation(50.0)
    ///     .brightness(10)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.recolor.brightness, 10);
    /// ```
    #[must_use]
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::default()
    }

    /// Detection thresholds shared by every mode
    #[must_use]
    pub fn detection(&self) -> &DetectionConfig {
        &self.recolor.detection
    }

    /// Validate all configuration parameters against their domains
    ///
    /// An inverted lightness window is accepted; it only makes the classifier
    /// match nothing.
    ///
    /// # Errors
    /// - `RecolorError::InvalidRange` naming the first out-of-domain value
    pub fn validate(&self) -> Result<()> {
        let detection = self.detection();
        NumericValidator::validate_percent(detection.saturation_tolerance, "saturation tolerance")?;
        NumericValidator::validate_percent(detection.min_lightness, "minimum lightness")?;
        NumericValidator::validate_percent(detection.max_lightness, "maximum lightness")?;
        NumericValidator::validate_hue(self.recolor.target_hue)?;
        NumericValidator::validate_percent(self.recolor.target_saturation, "target saturation")?;

        if !(-100..=100).contains(&self.recolor.brightness) {
            return Err(RecolorError::config_value_error(
                "brightness",
                self.recolor.brightness,
                "-100..=100",
                Some(0),
            ));
        }
        if !(-100..=100).contains(&self.recolor.contrast) {
            return Err(RecolorError::config_value_error(
                "contrast",
                self.recolor.contrast,
                "-100..=100",
                Some(0),
            ));
        }

        NumericValidator::validate_quality(self.quality)?;
        Ok(())
    }
}

/// Builder for `ProcessorConfig`
///
/// Setters clamp into each value's domain, so `build` only fails on
/// non-finite input.
#[derive(Debug, Default)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    #[must_use]
    pub fn from_config(config: ProcessorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn mode(mut self, mode: RecolorMode) -> Self {
        self.config.mode = mode;
        self
    }

    #[must_use]
    pub fn detection(mut self, detection: DetectionConfig) -> Self {
        self.config.recolor.detection = detection;
        self
    }

    #[must_use]
    pub fn saturation_tolerance(mut self, tolerance: f64) -> Self {
        self.config.recolor.detection.saturation_tolerance = tolerance.clamp(0.0, 100.0);
        self
    }

    #[must_use]
    pub fn min_lightness(mut self, lightness: f64) -> Self {
        self.config.recolor.detection.min_lightness = lightness.clamp(0.0, 100.0);
        self
    }

    #[must_use]
    pub fn max_lightness(mut self, lightness: f64) -> Self {
        self.config.recolor.detection.max_lightness = lightness.clamp(0.0, 100.0);
        self
    }

    /// Set the target hue; values outside `[0, 360)` wrap around
    #[must_use]
    pub fn target_hue(mut self, hue: f64) -> Self {
        self.config.recolor.target_hue = hue.rem_euclid(360.0);
        self
    }

    #[must_use]
    pub fn target_saturation(mut self, saturation: f64) -> Self {
        self.config.recolor.target_saturation = saturation.clamp(0.0, 100.0);
        self
    }

    #[must_use]
    pub fn preserve_lightness(mut self, preserve: bool) -> Self {
        self.config.recolor.preserve_lightness = preserve;
        self
    }

    #[must_use]
    pub fn brightness(mut self, brightness: i32) -> Self {
        self.config.recolor.brightness = brightness.clamp(-100, 100);
        self
    }

    #[must_use]
    pub fn contrast(mut self, contrast: i32) -> Self {
        self.config.recolor.contrast = contrast.clamp(-100, 100);
        self
    }

    #[must_use]
    pub fn fill_color(mut self, color: RgbColor) -> Self {
        self.config.fill_color = color;
        self
    }

    /// Apply a preset's hue, saturation and fill swatch
    ///
    /// # Errors
    /// - `RecolorError::InvalidColorFormat` if the preset swatch is malformed
    pub fn preset(mut self, preset: &ColorPreset) -> Result<Self> {
        self.config.recolor.target_hue = f64::from(preset.hue);
        self.config.recolor.target_saturation = f64::from(preset.saturation);
        self.config.fill_color = crate::utils::ColorParser::parse_hex(preset.hex)?;
        Ok(self)
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn quality(mut self, quality: f32) -> Self {
        self.config.quality = quality.clamp(0.0, 1.0);
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - `RecolorError::InvalidRange` when a value is NaN or otherwise out of domain
    pub fn build(self) -> Result<ProcessorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_sit_inside_slider_ranges() {
        let config = ProcessorConfig::default();
        let detection = config.detection();
        assert!(ranges::SATURATION_TOLERANCE.contains(&detection.saturation_tolerance));
        assert!(ranges::MIN_LIGHTNESS.contains(&detection.min_lightness));
        assert!(ranges::MAX_LIGHTNESS.contains(&detection.max_lightness));
        assert!(ranges::TARGET_HUE.contains(&config.recolor.target_hue));
        assert!(ranges::TARGET_SATURATION.contains(&config.recolor.target_saturation));
        assert!(ranges::BRIGHTNESS.contains(&config.recolor.brightness));
        assert!(ranges::CONTRAST.contains(&config.recolor.contrast));

        for preset in &COLOR_PRESETS {
            assert!(ranges::TARGET_HUE.contains(&f64::from(preset.hue)));
        }
    }

    #[test]
    fn test_defaults_match_studio_backdrop() {
        let config = ProcessorConfig::default();
        assert_eq!(config.mode, RecolorMode::HueShift);
        assert_eq!(config.recolor.detection, DetectionConfig::new(30.0, 15.0, 95.0));
        assert!((config.recolor.target_hue - 80.0).abs() < f64::EPSILON);
        assert!((config.recolor.target_saturation - 35.0).abs() < f64::EPSILON);
        assert!(config.recolor.preserve_lightness);
        assert_eq!(config.fill_color, RgbColor::new(0x6B, 0x8E, 0x23));
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_clamps_values() {
        let config = ProcessorConfig::builder()
            .brightness(250)
            .contrast(-300)
            .saturation_tolerance(140.0)
            .target_hue(370.0)
            .quality(1.5)
            .build()
            .unwrap();
        assert_eq!(config.recolor.brightness, 100);
        assert_eq!(config.recolor.contrast, -100);
        assert!((config.recolor.detection.saturation_tolerance - 100.0).abs() < f64::EPSILON);
        assert!((config.recolor.target_hue - 10.0).abs() < 1e-9);
        assert!((config.quality - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_reports_out_of_range() {
        let mut config = ProcessorConfig::default();
        config.recolor.contrast = 101;
        let error = config.validate().unwrap_err();
        assert!(matches!(error, RecolorError::InvalidRange(_)));
        assert!(error.to_string().contains("contrast"));
        assert!(error.to_string().contains("101"));

        let mut config = ProcessorConfig::default();
        config.recolor.target_hue = 360.0;
        assert!(config.validate().is_err());

        let mut config = ProcessorConfig::default();
        config.quality = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_lightness_window_is_accepted() {
        let config = ProcessorConfig::builder()
            .min_lightness(70.0)
            .max_lightness(30.0)
            .build()
            .unwrap();
        assert!(config.detection().is_empty_window());
    }

    #[test]
    fn test_preset_lookup() {
        let preset = ColorPreset::find("Sky Blue").unwrap();
        assert_eq!(preset.hue, 200);
        assert_eq!(preset.saturation, 50);
        assert!(ColorPreset::find("olive_green").is_some());
        assert!(ColorPreset::find("magenta").is_none());

        let config = ProcessorConfig::builder()
            .preset(preset)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.fill_color, RgbColor::new(0x87, 0xCE, 0xEB));
    }

    #[test]
    fn test_all_preset_swatches_parse() {
        for preset in &COLOR_PRESETS {
            assert!(crate::utils::ColorParser::is_valid_hex(preset.hex), "{}", preset.name);
        }
    }

    #[test]
    fn test_serde_round_trip_uses_flat_detection_fields() {
        let config = ProcessorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"saturation_tolerance\":30.0"));
        assert!(json.contains("\"mode\":\"hue-shift\""));

        let partial: ProcessorConfig =
            serde_json::from_str(r#"{"mode":"transparency","recolor":{"min_lightness":20.0}}"#)
                .unwrap();
        assert_eq!(partial.mode, RecolorMode::Transparency);
        assert!((partial.recolor.detection.min_lightness - 20.0).abs() < f64::EPSILON);
        assert!((partial.recolor.detection.max_lightness - 95.0).abs() < f64::EPSILON);
    }
}
