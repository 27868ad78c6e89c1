//! Error types for backdrop detection and recoloring operations

use thiserror::Error;

/// Result type alias for recoloring operations
pub type Result<T> = std::result::Result<T, RecolorError>;

/// Error types for recoloring operations
#[derive(Error, Debug)]
pub enum RecolorError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed hex color string
    #[error("Invalid color format: {0}")]
    InvalidColorFormat(String),

    /// Configuration value outside its documented domain
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Two buffers that must describe the same canvas have different dimensions
    #[error("Buffer size mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    BufferSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Encoded input exceeds the accepted size ceiling
    #[error("Input too large: {size} bytes (limit: {limit} bytes)")]
    InputTooLarge { size: u64, limit: u64 },

    /// Unsupported file format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Pipeline stage failure
    #[error("Processing error: {0}")]
    Processing(String),
}

impl RecolorError {
    /// Create a new invalid color format error
    pub fn invalid_color<S: Into<String>>(msg: S) -> Self {
        Self::InvalidColorFormat(msg.into())
    }

    /// Create a new invalid range error
    pub fn invalid_range<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a buffer size mismatch error from two dimension pairs
    #[must_use]
    pub fn size_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::BufferSizeMismatch { expected, actual }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidRange(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create processing error with stage context
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }
}
