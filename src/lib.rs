#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
//! # backdrop-tint
//!
//! Recolor the neutral backdrop of studio photos without touching the subject.
//!
//! Every pixel is classified on its own: low saturation plus mid-range
//! lightness means "backdrop". Backdrop pixels are then rewritten by one of
//! three transforms while everything else passes through unchanged.
//!
//! ## Features
//!
//! - **Hue shift**: repaint the backdrop with a target hue and saturation while
//!   keeping its shading (optionally adjusted by brightness and contrast)
//! - **Solid fill**: replace the backdrop with a flat color
//! - **Transparency**: cut the backdrop out (always written as PNG)
//! - **Retouch brush**: soft-edged local restore/apply strokes for the spots
//!   the classifier got wrong
//! - **Preview pipeline**: downscaled previews for interactive editing,
//!   full-resolution export
//! - **Batch processing**: one configuration over many files, continuing past
//!   failures
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use backdrop_tint::{ColorPreset, PixelBuffer, ProcessorConfig, RecolorProcessor};
//! use image::Rgba;
//!
//! # fn main() -> backdrop_tint::Result<()> {
//! let preset = ColorPreset::find("sky-blue").expect("built-in preset");
//! let config = ProcessorConfig::builder().preset(preset)?.build()?;
//! let processor = RecolorProcessor::new(config)?;
//!
//! let photo = PixelBuffer::from_pixel(64, 48, Rgba([128, 128, 128, 255]));
//! let preview = processor.generate_preview(&photo, 32)?;
//! assert_eq!(preview.dimensions(), (32, 24));
//!
//! let export = processor.process(&photo)?;
//! assert_eq!(export.stats.background_pixels, 64 * 48);
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bars and tracing setup
//! - `webp-support` (default): WebP decoding and lossless WebP output
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! backdrop-tint = { version = "0.1", default-features = false, features = ["webp-support"] }
//! ```

pub mod batch;
pub mod brush;
pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color_space;
pub mod config;
pub mod error;
pub mod processor;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod transforms;
pub mod types;
pub mod utils;

// Public API exports
pub use batch::{BatchInput, BatchProcessor, BatchReport, BatchStats};
pub use brush::{paint, BrushMode, BrushStroke, RetouchSession};
pub use classifier::is_background;
pub use color_space::{hsl_to_rgb, rgb_to_hsl, rgb_to_hsl_precise};
pub use config::{
    ColorPreset, DetectionConfig, OutputFormat, ProcessorConfig, ProcessorConfigBuilder,
    RecolorConfig, RecolorMode, COLOR_PRESETS,
};
pub use error::{RecolorError, Result};
pub use processor::{downscale, RecolorProcessor};
pub use services::{
    ImageIOService, InputLimits, NoOpProgressReporter, OutputFormatHandler, ProcessingStage,
    ProgressReporter, ProgressUpdate, TracingProgressReporter,
};
pub use session::EditorSession;
pub use transforms::{apply_color, apply_hue_shift, apply_transparency};
pub use types::{
    EncodedImage, HslColor, PixelBuffer, ProcessedImage, ProcessingTimings, RgbColor,
    TransformStats,
};
pub use utils::{ColorParser, NumericValidator};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Recolor an encoded image held in memory
///
/// Decodes with the default [`InputLimits`] (10 MiB, JPEG/PNG/WebP) and
/// processes at full resolution.
///
/// # Examples
/// ```rust,no_run
/// use backdrop_tint::{recolor_bytes, ProcessorConfig};
///
/// let data = std::fs::read("portrait.jpg")?;
/// let result = recolor_bytes(&data, &ProcessorConfig::default())?;
/// result.encoded.save("portrait_recolored.jpg")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn recolor_bytes(image_bytes: &[u8], config: &ProcessorConfig) -> Result<ProcessedImage> {
    RecolorProcessor::new(*config)?.process_bytes(image_bytes, &InputLimits::default())
}

/// Recolor a decoded buffer at full resolution
pub fn recolor_image(image: &PixelBuffer, config: &ProcessorConfig) -> Result<ProcessedImage> {
    RecolorProcessor::new(*config)?.process(image)
}
