//! Validation utilities

mod numeric;

pub use numeric::NumericValidator;
