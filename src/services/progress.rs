//! Progress reporting service
//!
//! Pipeline and batch code report stages through a trait object so each front
//! end (CLI progress bar, log lines, nothing at all) can render them its own way.

use crate::types::ProcessingTimings;
use instant::Instant;

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Reading and decoding input
    ImageLoading,
    /// Downscaling for preview
    Resizing,
    /// Classifier-gated transform
    Transforming,
    /// Encoding the result
    Encoding,
    /// Writing the result to disk
    FileSaving,
    /// Done
    Completed,
    /// Processing one item of a batch
    BatchItemProcessing,
    /// All batch items visited
    BatchFinalization,
}

impl ProcessingStage {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::ImageLoading => "Loading input image",
            ProcessingStage::Resizing => "Resizing for preview",
            ProcessingStage::Transforming => "Recoloring backdrop",
            ProcessingStage::Encoding => "Encoding output",
            ProcessingStage::FileSaving => "Saving result",
            ProcessingStage::Completed => "Processing completed",
            ProcessingStage::BatchItemProcessing => "Processing batch item",
            ProcessingStage::BatchFinalization => "Finalizing batch",
        }
    }

    /// Typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::ImageLoading => 10,
            ProcessingStage::Resizing => 20,
            ProcessingStage::Transforming => 70,
            ProcessingStage::Encoding => 90,
            ProcessingStage::FileSaving => 98,
            ProcessingStage::Completed | ProcessingStage::BatchFinalization => 100,
            ProcessingStage::BatchItemProcessing => 50,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self::with_description(stage, stage.description().to_string(), start_time)
    }

    #[must_use]
    pub fn with_description(
        stage: ProcessingStage,
        description: String,
        start_time: Instant,
    ) -> Self {
        Self {
            progress: stage.progress_percentage(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
            description,
        }
    }

    /// Batch item update: progress is the share of items already finished
    #[must_use]
    pub fn batch_item(index: usize, total: usize, name: &str, start_time: Instant) -> Self {
        let progress = if total == 0 {
            100
        } else {
            ((index * 100) / total).min(100) as u8
        };
        Self {
            progress,
            description: format!("[{}/{}] {}", index + 1, total, name),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage: ProcessingStage::BatchItemProcessing,
        }
    }
}

/// Trait for reporting progress during recoloring operations
pub trait ProgressReporter: Send + Sync {
    fn report_progress(&self, update: ProgressUpdate);

    /// Report completion with final timings
    fn report_completion(&self, timings: ProcessingTimings);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// Discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _timings: ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Emits progress as `tracing` events
pub struct TracingProgressReporter {
    verbose: bool,
}

impl TracingProgressReporter {
    /// `verbose` adds elapsed time and the timing breakdown
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for TracingProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            tracing::info!(
                stage = ?update.stage,
                elapsed_ms = update.elapsed_ms,
                "[{}%] {}",
                update.progress,
                update.description
            );
        } else {
            tracing::info!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_completion(&self, timings: ProcessingTimings) {
        if self.verbose {
            tracing::info!("Recoloring completed: {}", timings.summary());
        } else {
            tracing::info!("Recoloring completed in {}ms", timings.total_ms);
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        tracing::error!(stage = ?stage, "Error during {}: {}", stage.description(), error);
    }
}
