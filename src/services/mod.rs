//! Services separating I/O, encoding and progress reporting from pixel logic

pub mod format;
pub mod io;
pub mod progress;

pub use format::OutputFormatHandler;
pub use io::{ImageIOService, InputLimits, DEFAULT_MAX_FILE_SIZE};
pub use progress::{
    NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate,
    TracingProgressReporter,
};
