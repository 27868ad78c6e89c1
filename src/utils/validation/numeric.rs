//! Numeric validation utilities
//!
//! Range checks for configuration values and overflow-safe size arithmetic
//! for pixel buffers.

use crate::error::{RecolorError, Result};

/// Validator for numeric configuration values and conversions
pub struct NumericValidator;

impl NumericValidator {
    /// Validate a percentage value (0.0 to 100.0 inclusive, finite)
    pub fn validate_percent(value: f64, name: &str) -> Result<f64> {
        if !value.is_finite() {
            return Err(RecolorError::invalid_range(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        Self::validate_range(value, 0.0, 100.0, name)
    }

    /// Validate a hue in degrees (`[0, 360)`, finite)
    pub fn validate_hue(value: f64) -> Result<f64> {
        if !value.is_finite() || !(0.0..360.0).contains(&value) {
            return Err(RecolorError::config_value_error(
                "target hue",
                value,
                "0..360",
                None,
            ));
        }
        Ok(value)
    }

    /// Validate encoder quality (0.0 to 1.0 inclusive, finite)
    pub fn validate_quality(value: f32) -> Result<f32> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(RecolorError::config_value_error(
                "quality",
                value,
                "0.0-1.0",
                Some(0.92),
            ));
        }
        Ok(value)
    }

    /// Validate numeric range (inclusive)
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> Result<T>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(RecolorError::invalid_range(format!(
                "{} must be between {} and {}, got {}",
                name, min, max, value
            )));
        }
        Ok(value)
    }

    /// Byte length of an RGBA8 buffer, checking for overflow
    pub fn rgba_byte_len(width: u32, height: u32) -> Result<usize> {
        let pixels = u64::from(width) * u64::from(height);
        pixels
            .checked_mul(4)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(|| {
                RecolorError::processing(format!(
                    "Buffer of {}x{} pixels exceeds addressable memory",
                    width, height
                ))
            })
    }
}
