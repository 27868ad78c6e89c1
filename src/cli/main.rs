//! Backdrop recoloring CLI
//!
//! Command-line front end over the batch processor: expands inputs, builds a
//! configuration from flags, runs the batch with a progress bar.

use super::config::CliConfigBuilder;
use crate::{
    batch::{collect_inputs, BatchProcessor},
    config::{OutputFormat, ProcessorConfig, COLOR_PRESETS},
    processor::RecolorProcessor,
    services::{
        ImageIOService, InputLimits, OutputFormatHandler, ProcessingStage, ProgressReporter,
        ProgressUpdate,
    },
    tracing_config::{init_cli_tracing, spans, TracingFormat},
    types::ProcessingTimings,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Studio backdrop recoloring tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "backdrop-tint")]
pub struct Cli {
    /// Input image files or directories
    #[arg(value_name = "INPUT", required_unless_present = "list_presets")]
    pub input: Vec<String>,

    /// Output file (single input) or directory (batch). Defaults to next to each input.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Transform applied to the backdrop [default: hue-shift]
    #[arg(short, long, value_enum)]
    pub mode: Option<CliMode>,

    /// Named color preset (see --list-presets)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Target color as #RRGGBB (hue/saturation for hue-shift, fill for solid-fill)
    #[arg(short, long)]
    pub color: Option<String>,

    /// Target hue in degrees [0, 360)
    #[arg(long)]
    pub hue: Option<f64>,

    /// Target saturation [0, 100]
    #[arg(long)]
    pub saturation: Option<f64>,

    /// Maximum saturation still treated as backdrop [0, 100]
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Darkest lightness treated as backdrop [0, 100]
    #[arg(long)]
    pub min_lightness: Option<f64>,

    /// Brightest lightness treated as backdrop [0, 100]
    #[arg(long)]
    pub max_lightness: Option<f64>,

    /// Lightness offset for the recolored backdrop [-100, 100]
    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<i32>,

    /// Contrast around mid lightness [-100, 100]
    #[arg(long, allow_hyphen_values = true)]
    pub contrast: Option<i32>,

    /// Paint the backdrop at flat mid lightness instead of keeping its shading
    #[arg(long)]
    pub flat_lightness: bool,

    /// Output format [default: jpeg; transparency always writes png]
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Encoder quality for JPEG (0.0-1.0) [default: 0.92]
    #[arg(short, long)]
    pub quality: Option<f32>,

    /// Write downscaled previews instead of full resolution (`--preview` alone: 800px)
    #[arg(
        long,
        value_name = "MAX_DIMENSION",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "800"
    )]
    pub preview: Option<u32>,

    /// JSON settings file used as the base configuration
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// File name pattern for directory inputs (e.g., "*.jpg")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// List the built-in color presets and exit
    #[arg(long)]
    pub list_presets: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliMode {
    HueShift,
    SolidFill,
    Transparency,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Webp,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = init_cli_tracing(cli.verbose, cli.log_format.into())
        .context("Failed to initialize tracing")?;

    if cli.list_presets {
        print_presets();
        return Ok(());
    }

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    let _session = spans::session(&session_id, &config.mode.to_string()).entered();
    info!("Input(s): {}", cli.input.join(", "));
    let format_overridden =
        OutputFormatHandler::validate_for_mode(config.mode, config.output_format);
    debug!(?config, format_overridden, "Resolved configuration");

    let files = gather_inputs(&cli)?;
    if files.is_empty() {
        warn!("No supported image files found in the provided inputs");
        return Ok(());
    }
    info!("Found {} image file(s) to process", files.len());

    if let [single] = files.as_slice() {
        if let Some(output) = cli.output.as_deref().map(Path::new) {
            if ImageIOService::is_supported_format(output) {
                return process_single_file(&cli, config, single, output);
            }
        }
    }

    let output_dir = prepare_output_dir(cli.output.as_deref())?;
    let mut batch = BatchProcessor::new(config)?;
    if let Some(max_dimension) = cli.preview {
        batch = batch.with_preview(max_dimension);
    }
    if files.len() > 1 {
        batch = batch.with_progress_reporter(Box::new(BarProgressReporter::new()?));
    }

    let report = {
        let _span = spans::batch_processing(files.len()).entered();
        batch.process_files(&files, output_dir.as_deref())
    };

    for item in &report.items {
        match &item.result {
            Ok(path) => info!("✅ {} -> {}", item.name, path.display()),
            Err(e) => warn!("❌ {}: {}", item.name, e),
        }
    }
    info!(
        "Processed {} file(s), {} failed",
        report.stats.processed, report.stats.failed
    );

    if report.stats.processed == 0 {
        anyhow::bail!("No images were processed successfully");
    }
    Ok(())
}

fn print_presets() {
    println!("Available color presets:");
    for preset in &COLOR_PRESETS {
        println!(
            "  • {:<14} hue {:>3}, saturation {:>3}%, fill {}",
            preset.name, preset.hue, preset.saturation, preset.hex
        );
    }
}

/// Expand files and directories into a sorted, de-duplicated list of images
fn gather_inputs(cli: &Cli) -> Result<Vec<PathBuf>> {
    let mut all_files = Vec::new();

    for input in &cli.input {
        let path = PathBuf::from(input);

        if path.is_file() {
            if ImageIOService::is_supported_format(&path) {
                all_files.push(path);
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            all_files.extend(find_image_files(&path, cli.recursive, cli.pattern.as_deref())?);
        } else {
            anyhow::bail!(
                "Input path does not exist or is not accessible: {}",
                path.display()
            );
        }
    }

    Ok(collect_inputs(all_files))
}

/// Find all supported images in a directory
fn find_image_files(dir: &Path, recursive: bool, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = pattern
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid --pattern")?;
    let accept = |path: &Path| {
        ImageIOService::is_supported_format(path) && matches_pattern(path, pattern.as_ref())
    };

    let mut files = Vec::new();
    let max_depth = if recursive { usize::MAX } else { 1 };
    for entry in walkdir::WalkDir::new(dir).max_depth(max_depth) {
        let entry = entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
        if entry.file_type().is_file() && accept(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Check if the file name matches the given pattern
fn matches_pattern(path: &Path, pattern: Option<&glob::Pattern>) -> bool {
    match pattern {
        Some(pattern) => path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name)),
        None => true,
    }
}

fn prepare_output_dir(output: Option<&str>) -> Result<Option<PathBuf>> {
    let Some(output) = output else {
        return Ok(None);
    };

    let output_path = PathBuf::from(output);
    if output_path.is_file() {
        anyhow::bail!(
            "Output path exists and is a file, not a directory: {}",
            output_path.display()
        );
    }
    std::fs::create_dir_all(&output_path).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;
    Ok(Some(output_path))
}

fn process_single_file(
    cli: &Cli,
    config: ProcessorConfig,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let processor = RecolorProcessor::new(config)?;
    let source = ImageIOService::load_image(input, &InputLimits::default())
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let result = match cli.preview {
        Some(max_dimension) => processor.generate_preview(&source, max_dimension)?,
        None => processor.process(&source)?,
    };

    if format_from_path(output) != Some(result.encoded.format) {
        warn!(
            "Output extension of {} does not match encoded format {}",
            output.display(),
            result.encoded.format
        );
    }

    result
        .encoded
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "✅ {} -> {} ({:.0}% backdrop, {})",
        input.display(),
        output.display(),
        result.stats.coverage() * 100.0,
        result.timings.summary()
    );
    Ok(())
}

/// Batch progress rendered with an `indicatif` bar
struct BarProgressReporter {
    bar: ProgressBar,
}

impl BarProgressReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        match update.stage {
            ProcessingStage::BatchItemProcessing => {
                self.bar.set_position(u64::from(update.progress));
                self.bar.set_message(update.description);
            },
            ProcessingStage::BatchFinalization => {
                self.bar.set_position(u64::from(update.progress));
                self.bar.finish_with_message("done");
            },
            _ => {},
        }
    }

    fn report_completion(&self, _timings: ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, error: &str) {
        self.bar.println(format!("❌ {}", error));
    }
}

/// Output format implied by a file extension
fn format_from_path(path: &Path) -> Option<OutputFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some(OutputFormat::Png),
        "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
        "webp" => Some(OutputFormat::WebP),
        _ => None,
    }
}
