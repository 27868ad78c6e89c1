//! Sequential batch processing
//!
//! One configuration is applied to many inputs, one at a time. A failing item
//! is recorded and skipped; the batch always runs to the end.

use crate::{
    config::{ProcessorConfig, RecolorMode},
    error::Result,
    processor::RecolorProcessor,
    services::{
        ImageIOService, InputLimits, NoOpProgressReporter, OutputFormatHandler, ProcessingStage,
        ProgressReporter, ProgressUpdate,
    },
    types::EncodedImage,
    utils::ColorParser,
};
use instant::Instant;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Encoded input with a display name
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl BatchInput {
    #[must_use]
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Success and failure counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub processed: usize,
    pub failed: usize,
}

impl BatchStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed + self.failed
    }
}

/// Outcome for one batch item
#[derive(Debug)]
pub struct BatchItemResult<T> {
    pub name: String,
    pub result: Result<T>,
}

/// Per-item outcomes in input order, plus counts
#[derive(Debug)]
pub struct BatchReport<T> {
    pub items: Vec<BatchItemResult<T>>,
    pub stats: BatchStats,
}

impl<T> BatchReport<T> {
    /// Items that failed, with their errors
    pub fn failures(&self) -> impl Iterator<Item = &BatchItemResult<T>> {
        self.items.iter().filter(|item| item.result.is_err())
    }
}

/// Applies one configuration to a sequence of inputs
pub struct BatchProcessor {
    processor: RecolorProcessor,
    limits: InputLimits,
    preview_max_dimension: Option<u32>,
    reporter: Box<dyn ProgressReporter>,
}

impl BatchProcessor {
    /// # Errors
    /// - `RecolorError::InvalidRange` if `config` fails validation
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        Ok(Self {
            processor: RecolorProcessor::new(config)?,
            limits: InputLimits::default(),
            preview_max_dimension: None,
            reporter: Box::new(NoOpProgressReporter),
        })
    }

    #[must_use]
    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Write downscaled previews instead of full-resolution results
    #[must_use]
    pub fn with_preview(mut self, max_dimension: u32) -> Self {
        self.preview_max_dimension = Some(max_dimension);
        self
    }

    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        self.processor.config()
    }

    /// Decode, process and encode each input in memory
    pub fn process(&self, inputs: &[BatchInput]) -> BatchReport<EncodedImage> {
        self.run(inputs, |input| input.name.clone(), |input| {
            let processed = self.processor.process_bytes(&input.bytes, &self.limits)?;
            Ok(processed.encoded)
        })
    }

    /// Process files and write the results
    ///
    /// Results go into `output_dir`, or next to each input when it is `None`.
    /// Output names follow [`output_file_name`]. Returns the written paths.
    pub fn process_files(&self, paths: &[PathBuf], output_dir: Option<&Path>) -> BatchReport<PathBuf> {
        self.run(paths, |path| display_name(path), |path| {
            let item_start = Instant::now();
            let source = ImageIOService::load_image(path, &self.limits)?;
            let processed = match self.preview_max_dimension {
                Some(max_dimension) => self.processor.generate_preview(&source, max_dimension)?,
                None => self.processor.process(&source)?,
            };

            let file_name = output_file_name(&display_name(path), self.config());
            let output = match output_dir {
                Some(dir) => dir.join(file_name),
                None => path.with_file_name(file_name),
            };
            self.reporter.report_progress(ProgressUpdate::with_description(
                ProcessingStage::FileSaving,
                format!("Saving {}", output.display()),
                item_start,
            ));
            processed.encoded.save(&output)?;
            Ok(output)
        })
    }

    fn run<S, T, N, F>(&self, inputs: &[S], name_of: N, mut process_one: F) -> BatchReport<T>
    where
        N: Fn(&S) -> String,
        F: FnMut(&S) -> Result<T>,
    {
        let start = Instant::now();
        let total = inputs.len();
        let mut stats = BatchStats::default();
        let mut items = Vec::with_capacity(total);

        for (index, input) in inputs.iter().enumerate() {
            let name = name_of(input);
            self.reporter
                .report_progress(ProgressUpdate::batch_item(index, total, &name, start));

            let result = process_one(input);
            match &result {
                Ok(_) => stats.processed += 1,
                Err(e) => {
                    warn!(item = %name, error = %e, "Batch item failed");
                    self.reporter
                        .report_error(ProcessingStage::BatchItemProcessing, &format!("{}: {}", name, e));
                    stats.failed += 1;
                },
            }
            items.push(BatchItemResult { name, result });
        }

        self.reporter
            .report_progress(ProgressUpdate::new(ProcessingStage::BatchFinalization, start));
        info!(
            processed = stats.processed,
            failed = stats.failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch finished"
        );

        BatchReport { items, stats }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Output file name for an input: `{stem}_recolored_{suffix}.{ext}`.
///
/// The suffix names the applied color (hex without `#`), or `transparent`.
///
/// ```rust
/// use backdrop_tint::{batch::output_file_name, ProcessorConfig};
///
/// assert_eq!(
///     output_file_name("portrait.png", &ProcessorConfig::default()),
///     "portrait_recolored_8eac53.jpg"
/// );
/// ```
#[must_use]
pub fn output_file_name(input_name: &str, config: &ProcessorConfig) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .map_or_else(|| input_name.to_string(), |stem| stem.to_string_lossy().into_owned());

    let suffix = match config.mode {
        RecolorMode::HueShift => ColorParser::hue_saturation_to_hex(
            config.recolor.target_hue,
            config.recolor.target_saturation,
        ),
        RecolorMode::SolidFill => ColorParser::to_hex(&config.fill_color, false),
        RecolorMode::Transparency => "transparent".to_string(),
    };
    let format = OutputFormatHandler::effective_format(config.mode, config.output_format);

    format!(
        "{}_recolored_{}.{}",
        stem,
        suffix.trim_start_matches('#'),
        OutputFormatHandler::get_extension(format)
    )
}

/// Keep supported image files, drop repeated file names and sort by name.
#[must_use]
pub fn collect_inputs<I: IntoIterator<Item = PathBuf>>(paths: I) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut inputs: Vec<PathBuf> = paths
        .into_iter()
        .filter(|path| ImageIOService::is_supported_format(path))
        .filter(|path| seen.insert(display_name(path)))
        .collect();
    inputs.sort_by_key(|path| display_name(path));
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::OutputFormat, types::PixelBuffer, RecolorError, RgbColor};
    use image::Rgba;
    use std::sync::{Arc, Mutex};

    fn gray_png() -> Vec<u8> {
        let buffer = PixelBuffer::from_pixel(4, 4, Rgba([128, 128, 128, 255]));
        OutputFormatHandler::encode(&buffer, OutputFormat::Png, 1.0)
            .unwrap()
            .bytes
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let batch = BatchProcessor::new(ProcessorConfig::default()).unwrap();
        let inputs = vec![
            BatchInput::new("a.png", gray_png()),
            BatchInput::new("broken.png", b"garbage".to_vec()),
            BatchInput::new("c.png", gray_png()),
        ];

        let report = batch.process(&inputs);
        assert_eq!(report.stats, BatchStats { processed: 2, failed: 1 });
        assert_eq!(report.stats.total(), 3);
        assert_eq!(report.items.len(), 3);
        assert!(report.items[0].result.is_ok());
        assert!(matches!(
            report.items[1].result,
            Err(RecolorError::UnsupportedFormat(_))
        ));

        let failures: Vec<_> = report.failures().map(|item| item.name.as_str()).collect();
        assert_eq!(failures, vec!["broken.png"]);
    }

    #[test]
    fn test_batch_respects_limits() {
        let batch = BatchProcessor::new(ProcessorConfig::default())
            .unwrap()
            .with_limits(InputLimits {
                max_file_size: 8,
                ..InputLimits::default()
            });
        let report = batch.process(&[BatchInput::new("a.png", gray_png())]);
        assert_eq!(report.stats.failed, 1);
    }

    #[test]
    fn test_process_files_writes_outputs() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let good = input_dir.path().join("studio.png");
        std::fs::write(&good, gray_png()).unwrap();
        let missing = input_dir.path().join("missing.png");

        let config = ProcessorConfig::builder()
            .mode(RecolorMode::SolidFill)
            .fill_color(RgbColor::new(0x87, 0xCE, 0xEB))
            .output_format(OutputFormat::Png)
            .build()
            .unwrap();
        let batch = BatchProcessor::new(config).unwrap();
        let report = batch.process_files(&[good, missing], Some(output_dir.path()));

        assert_eq!(report.stats, BatchStats { processed: 1, failed: 1 });
        let written = report.items[0].result.as_ref().unwrap();
        assert_eq!(
            written.file_name().unwrap().to_str().unwrap(),
            "studio_recolored_87ceeb.png"
        );
        let decoded = image::open(written).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0x87, 0xCE, 0xEB, 255]));
    }

    #[derive(Clone, Default)]
    struct StageRecorder {
        stages: Arc<Mutex<Vec<ProcessingStage>>>,
    }

    impl ProgressReporter for StageRecorder {
        fn report_progress(&self, update: ProgressUpdate) {
            self.stages.lock().unwrap().push(update.stage);
        }

        fn report_completion(&self, _timings: crate::ProcessingTimings) {}

        fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
    }

    #[test]
    fn test_process_files_reports_saving() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("studio.png");
        std::fs::write(&input, gray_png()).unwrap();
        let missing = dir.path().join("missing.png");

        let recorder = StageRecorder::default();
        let batch = BatchProcessor::new(ProcessorConfig::default())
            .unwrap()
            .with_progress_reporter(Box::new(recorder.clone()));
        let report = batch.process_files(&[input, missing], None);
        assert_eq!(report.stats, BatchStats { processed: 1, failed: 1 });

        assert_eq!(
            *recorder.stages.lock().unwrap(),
            vec![
                ProcessingStage::BatchItemProcessing,
                ProcessingStage::FileSaving,
                ProcessingStage::BatchItemProcessing,
                ProcessingStage::BatchFinalization,
            ]
        );
    }

    #[test]
    fn test_process_files_beside_inputs_as_previews() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("large.png");
        let buffer = PixelBuffer::from_pixel(40, 20, Rgba([128, 128, 128, 255]));
        OutputFormatHandler::encode(&buffer, OutputFormat::Png, 1.0)
            .unwrap()
            .save(&input)
            .unwrap();

        let batch = BatchProcessor::new(ProcessorConfig::default())
            .unwrap()
            .with_preview(10);
        let report = batch.process_files(&[input], None);
        let written = report.items[0].result.as_ref().unwrap();
        assert_eq!(written, &dir.path().join("large_recolored_8eac53.jpg"));
        assert_eq!(image::open(written).unwrap().width(), 10);
    }

    #[test]
    fn test_output_file_names() {
        let transparent = ProcessorConfig::builder()
            .mode(RecolorMode::Transparency)
            .build()
            .unwrap();
        assert_eq!(
            output_file_name("shot.final.jpeg", &transparent),
            "shot.final_recolored_transparent.png"
        );
    }

    #[test]
    fn test_collect_inputs() {
        let inputs = collect_inputs(vec![
            PathBuf::from("b/z.jpg"),
            PathBuf::from("notes.txt"),
            PathBuf::from("a/a.png"),
            PathBuf::from("c/z.jpg"),
        ]);
        assert_eq!(inputs, vec![PathBuf::from("a/a.png"), PathBuf::from("b/z.jpg")]);
    }
}
