//! Shared helpers for color parsing and value validation

pub mod color;
pub mod validation;

pub use color::ColorParser;
pub use validation::NumericValidator;
