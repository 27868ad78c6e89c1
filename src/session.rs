//! Interactive editing session
//!
//! Owns everything an editor front end needs between user actions: the decoded
//! full-resolution source, its downscaled preview, the current configuration and
//! the retouch buffers. Settings changes re-render the preview and discard
//! strokes; export re-processes the full-resolution source.

use crate::{
    brush::{BrushStroke, RetouchSession},
    config::{ProcessorConfig, EXPORT_QUALITY},
    error::Result,
    processor::{downscale, RecolorProcessor},
    types::{EncodedImage, PixelBuffer, ProcessedImage, TransformStats},
};
use tracing::{debug, info};

#[derive(Debug)]
pub struct EditorSession {
    source: PixelBuffer,
    processor: RecolorProcessor,
    preview_max_dimension: u32,
    retouch: RetouchSession,
    stats: TransformStats,
}

impl EditorSession {
    /// Open a session on a decoded image and render the first preview.
    ///
    /// # Errors
    /// - `RecolorError::InvalidRange` if `config` fails validation
    pub fn new(source: PixelBuffer, config: ProcessorConfig, preview_max_dimension: u32) -> Result<Self> {
        let processor = RecolorProcessor::new(config)?;
        let preview_source = downscale(&source, preview_max_dimension);
        let preview = processor.generate_preview(&source, preview_max_dimension)?;
        let retouch = RetouchSession::new(preview_source, preview.buffer)?;

        info!(
            width = source.width(),
            height = source.height(),
            preview_width = retouch.dimensions().0,
            preview_height = retouch.dimensions().1,
            "Editor session opened"
        );

        Ok(Self {
            source,
            processor,
            preview_max_dimension,
            retouch,
            stats: preview.stats,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        self.processor.config()
    }

    /// Apply new settings: re-render the preview and reseed the retouch
    /// buffers from it. Existing strokes are discarded.
    ///
    /// On error the session keeps its previous configuration.
    pub fn update_config(&mut self, config: ProcessorConfig) -> Result<()> {
        let processor = RecolorProcessor::new(config)?;
        let preview = processor.generate_preview(&self.source, self.preview_max_dimension)?;
        self.retouch.replace_transformed(preview.buffer)?;
        self.processor = processor;
        self.stats = preview.stats;
        debug!(
            mode = %self.processor.config().mode,
            background_pixels = self.stats.background_pixels,
            "Preview re-rendered"
        );
        Ok(())
    }

    /// Apply one brush stroke to the preview (canvas coordinates)
    pub fn paint(&mut self, stroke: &BrushStroke) -> Result<()> {
        self.retouch.stroke(stroke)
    }

    pub fn clear_strokes(&mut self) {
        self.retouch.clear_strokes();
    }

    /// Show the untouched preview everywhere
    pub fn reset_to_original(&mut self) {
        self.retouch.reset_to_original();
    }

    /// The retouched preview as it should be displayed
    #[must_use]
    pub fn working(&self) -> &PixelBuffer {
        self.retouch.working()
    }

    #[must_use]
    pub fn retouch(&self) -> &RetouchSession {
        &self.retouch
    }

    #[must_use]
    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    /// Background coverage of the current preview
    #[must_use]
    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// Encode the retouched preview with the preview encoding
    pub fn encode_working(&self) -> Result<EncodedImage> {
        self.processor.encode_preview(self.retouch.working())
    }

    /// Re-process the full-resolution source with the current settings at
    /// export quality.
    ///
    /// Strokes are made on the preview and are not carried over.
    pub fn export(&self) -> Result<ProcessedImage> {
        self.processor.process_with_quality(&self.source, EXPORT_QUALITY)
    }
}
