//! Recolor pipeline
//!
//! `RecolorProcessor` ties the pieces together: optional preview downscale,
//! classifier-gated transform, raster encode. Every run works on a copy of the
//! source buffer, so one decoded image can feed any number of previews.

use crate::{
    config::{OutputFormat, ProcessorConfig, PREVIEW_QUALITY},
    error::Result,
    services::{
        ImageIOService, InputLimits, OutputFormatHandler, ProcessingStage, ProgressReporter,
        ProgressUpdate,
    },
    transforms::apply_mode,
    types::{EncodedImage, PixelBuffer, ProcessedImage, ProcessingTimings},
};
use image::imageops::{self, FilterType};
use instant::Instant;
use tracing::{debug, info, instrument};

/// Resize so the longer side is at most `max_dimension`, keeping the aspect
/// ratio. Never upscales. Dimensions are truncated with a floor of 1.
#[must_use]
pub fn downscale(source: &PixelBuffer, max_dimension: u32) -> PixelBuffer {
    let (width, height) = source.dimensions();
    let longest = width.max(height);
    if longest == 0 {
        return source.clone();
    }

    let scale = (f64::from(max_dimension) / f64::from(longest)).min(1.0);
    if scale >= 1.0 {
        return source.clone();
    }

    let new_width = ((f64::from(width) * scale) as u32).max(1);
    let new_height = ((f64::from(height) * scale) as u32).max(1);
    imageops::resize(source, new_width, new_height, FilterType::Triangle)
}

/// Single-image recolor pipeline
pub struct RecolorProcessor {
    config: ProcessorConfig,
    progress_reporter: Option<Box<dyn ProgressReporter>>,
}

impl std::fmt::Debug for RecolorProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecolorProcessor")
            .field("config", &self.config)
            .field("progress_reporter", &self.progress_reporter.is_some())
            .finish()
    }
}

impl RecolorProcessor {
    /// Create a processor
    ///
    /// # Errors
    /// - `RecolorError::InvalidRange` if the configuration fails validation
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress_reporter: None,
        })
    }

    /// Attach a progress reporter
    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Transform a full-resolution copy of `source` and encode it with the
    /// configured format and quality.
    ///
    /// # Errors
    /// - `RecolorError::Image` if encoding fails
    pub fn process(&self, source: &PixelBuffer) -> Result<ProcessedImage> {
        self.process_with_quality(source, self.config.quality)
    }

    /// Like [`process`](Self::process) with an explicit 0.0-1.0 quality.
    #[instrument(
        skip(self, source),
        fields(
            mode = %self.config.mode,
            dimensions = %format!("{}x{}", source.width(), source.height())
        )
    )]
    pub fn process_with_quality(&self, source: &PixelBuffer, quality: f32) -> Result<ProcessedImage> {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::new();

        let format = OutputFormatHandler::effective_format(self.config.mode, self.config.output_format);
        let processed = self.run(source.clone(), format, quality, total_start, &mut timings)?;

        info!(
            background_pixels = processed.stats.background_pixels,
            total_ms = processed.timings.total_ms,
            "Processed full-resolution image"
        );
        Ok(processed)
    }

    /// Downscale, transform and encode a preview.
    ///
    /// Previews are JPEG at the preview quality, or PNG in transparency mode.
    #[instrument(
        skip(self, source),
        fields(
            mode = %self.config.mode,
            dimensions = %format!("{}x{}", source.width(), source.height())
        )
    )]
    pub fn generate_preview(&self, source: &PixelBuffer, max_dimension: u32) -> Result<ProcessedImage> {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::new();

        self.report(ProcessingStage::Resizing, total_start);
        let resize_start = Instant::now();
        let preview = downscale(source, max_dimension);
        timings.resize_ms = resize_start.elapsed().as_millis() as u64;
        debug!(
            width = preview.width(),
            height = preview.height(),
            resize_ms = timings.resize_ms,
            "Preview downscaled"
        );

        let format = self.preview_format();
        self.run(preview, format, PREVIEW_QUALITY, total_start, &mut timings)
    }

    /// Encode an already transformed buffer (e.g. after retouching) the way
    /// previews are encoded.
    pub fn encode_preview(&self, buffer: &PixelBuffer) -> Result<EncodedImage> {
        OutputFormatHandler::encode(buffer, self.preview_format(), PREVIEW_QUALITY)
    }

    /// Decode encoded bytes and process them at full resolution
    ///
    /// # Errors
    /// - Any decode-side error from [`ImageIOService::decode_bytes`]
    pub fn process_bytes(&self, bytes: &[u8], limits: &InputLimits) -> Result<ProcessedImage> {
        let start = Instant::now();
        self.report(ProcessingStage::ImageLoading, start);
        let source = ImageIOService::decode_bytes(bytes, limits).map_err(|e| {
            self.report_error(ProcessingStage::ImageLoading, &e.to_string());
            e
        })?;
        self.process(&source)
    }

    fn preview_format(&self) -> OutputFormat {
        OutputFormatHandler::effective_format(self.config.mode, OutputFormat::Jpeg)
    }

    fn run(
        &self,
        mut buffer: PixelBuffer,
        format: OutputFormat,
        quality: f32,
        total_start: Instant,
        timings: &mut ProcessingTimings,
    ) -> Result<ProcessedImage> {
        self.report(ProcessingStage::Transforming, total_start);
        let transform_start = Instant::now();
        let stats = apply_mode(&mut buffer, &self.config);
        timings.transform_ms = transform_start.elapsed().as_millis() as u64;
        debug!(
            background_pixels = stats.background_pixels,
            total_pixels = stats.total_pixels,
            transform_ms = timings.transform_ms,
            "Transform applied"
        );

        self.report(ProcessingStage::Encoding, total_start);
        let encode_start = Instant::now();
        let encoded = OutputFormatHandler::encode(&buffer, format, quality).map_err(|e| {
            self.report_error(ProcessingStage::Encoding, &e.to_string());
            e
        })?;
        timings.encode_ms = encode_start.elapsed().as_millis() as u64;
        timings.total_ms = total_start.elapsed().as_millis() as u64;

        if let Some(reporter) = &self.progress_reporter {
            reporter.report_progress(ProgressUpdate::new(ProcessingStage::Completed, total_start));
            reporter.report_completion(timings.clone());
        }

        Ok(ProcessedImage {
            buffer,
            encoded,
            stats,
            timings: timings.clone(),
        })
    }

    fn report(&self, stage: ProcessingStage, start: Instant) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report_progress(ProgressUpdate::new(stage, start));
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report_error(stage, error);
        }
    }
}
