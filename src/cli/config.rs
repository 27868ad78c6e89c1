//! Configuration conversion utilities for CLI arguments
//!
//! Layering, lowest to highest priority: built-in defaults, `--settings` JSON
//! file, `--preset`, explicit flags.

use crate::cli::main_impl::{Cli, CliMode, CliOutputFormat};
use crate::{
    config::{ColorPreset, OutputFormat, ProcessorConfig, ProcessorConfigBuilder, RecolorMode},
    utils::ColorParser,
};
use anyhow::{Context, Result};
use std::path::Path;

/// Convert CLI arguments to a `ProcessorConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the processor configuration from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<ProcessorConfig> {
        let base = match &cli.settings {
            Some(path) => Self::load_settings(path)?,
            None => ProcessorConfig::default(),
        };
        let mut builder = ProcessorConfigBuilder::from_config(base);

        if let Some(mode) = cli.mode {
            builder = builder.mode(mode.into());
        }
        let mode = cli.mode.map_or(base.mode, RecolorMode::from);

        if let Some(name) = &cli.preset {
            let preset = ColorPreset::find(name)
                .with_context(|| format!("Unknown preset '{}' (see --list-presets)", name))?;
            builder = builder.preset(preset)?;
        }

        if let Some(hex) = &cli.color {
            builder = match mode {
                RecolorMode::SolidFill => builder.fill_color(
                    ColorParser::parse_hex(hex).context("Invalid --color")?,
                ),
                RecolorMode::HueShift | RecolorMode::Transparency => {
                    let (hue, saturation) =
                        ColorParser::hex_to_hue_saturation(hex).context("Invalid --color")?;
                    builder.target_hue(hue).target_saturation(saturation)
                },
            };
        }

        if let Some(hue) = cli.hue {
            builder = builder.target_hue(hue);
        }
        if let Some(saturation) = cli.saturation {
            builder = builder.target_saturation(saturation);
        }
        if let Some(tolerance) = cli.tolerance {
            builder = builder.saturation_tolerance(tolerance);
        }
        if let Some(lightness) = cli.min_lightness {
            builder = builder.min_lightness(lightness);
        }
        if let Some(lightness) = cli.max_lightness {
            builder = builder.max_lightness(lightness);
        }
        if let Some(brightness) = cli.brightness {
            builder = builder.brightness(brightness);
        }
        if let Some(contrast) = cli.contrast {
            builder = builder.contrast(contrast);
        }
        if cli.flat_lightness {
            builder = builder.preserve_lightness(false);
        }
        if let Some(format) = cli.format {
            builder = builder.output_format(format.into());
        }
        if let Some(quality) = cli.quality {
            builder = builder.quality(quality);
        }

        builder.build().context("Invalid configuration")
    }

    /// Read a JSON settings file (any subset of `ProcessorConfig` fields)
    pub(crate) fn load_settings(path: &Path) -> Result<ProcessorConfig> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let config: ProcessorConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(config)
    }

    /// Validate arguments that clamping would otherwise hide
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if let Some(hex) = &cli.color {
            ColorParser::parse_hex(hex).context("Invalid --color")?;
        }
        if let Some(quality) = cli.quality {
            if !(0.0..=1.0).contains(&quality) {
                anyhow::bail!("--quality must be between 0.0 and 1.0, got {}", quality);
            }
        }
        if cli.preview == Some(0) {
            anyhow::bail!("--preview must be at least 1 pixel");
        }
        Ok(())
    }
}

impl From<CliMode> for RecolorMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::HueShift => RecolorMode::HueShift,
            CliMode::SolidFill => RecolorMode::SolidFill,
            CliMode::Transparency => RecolorMode::Transparency,
        }
    }
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Webp => OutputFormat::WebP,
        }
    }
}
