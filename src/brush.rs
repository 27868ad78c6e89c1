//! Retouch brush: local soft-edged blends between two buffers
//!
//! A stroke copies a circular region from a source buffer into the working
//! buffer. The inner 70% of the radius is copied at full strength, the outer 30%
//! fades linearly to zero so corrections never leave a hard seam. Only RGB is
//! blended; the working buffer keeps its own alpha.

use crate::{
    error::{RecolorError, Result},
    types::PixelBuffer,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Fraction of the radius painted at full strength
pub const FULL_STRENGTH_RATIO: f64 = 0.7;

/// Where a stroke reads its pixels from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// Paint back the untouched original (undo the transform locally)
    #[default]
    Restore,
    /// Paint the fully transformed result (redo the transform locally)
    Apply,
}

/// One dab of the brush, in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStroke {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub mode: BrushMode,
}

impl BrushStroke {
    #[must_use]
    pub fn new(center_x: f64, center_y: f64, radius: f64, mode: BrushMode) -> Self {
        Self {
            center_x,
            center_y,
            radius,
            mode,
        }
    }

    /// Map a pointer position and brush diameter given in display pixels onto
    /// the canvas. `canvas_per_display` is canvas width / displayed width.
    #[must_use]
    pub fn from_display(
        display_x: f64,
        display_y: f64,
        brush_size: f64,
        canvas_per_display: f64,
        mode: BrushMode,
    ) -> Self {
        Self::new(
            display_x * canvas_per_display,
            display_y * canvas_per_display,
            brush_size / 2.0 * canvas_per_display,
            mode,
        )
    }
}

/// Blend weight for a pixel `distance` away from the stroke center.
///
/// 1.0 up to 70% of the radius, then a linear ramp to 0.0 at the radius.
/// Pixels beyond the radius get 0.0.
#[must_use]
pub fn brush_weight(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 || distance > radius {
        0.0
    } else if distance <= radius * FULL_STRENGTH_RATIO {
        1.0
    } else {
        (radius - distance) / (radius * (1.0 - FULL_STRENGTH_RATIO))
    }
}

/// Blend `source` into `working` under a circular soft-edged stroke.
///
/// # Errors
/// - `RecolorError::BufferSizeMismatch` if the buffers differ in size
pub fn paint(working: &mut PixelBuffer, source: &PixelBuffer, stroke: &BrushStroke) -> Result<()> {
    if working.dimensions() != source.dimensions() {
        return Err(RecolorError::size_mismatch(
            working.dimensions(),
            source.dimensions(),
        ));
    }

    let radius = stroke.radius;
    if !radius.is_finite() || radius <= 0.0 {
        return Ok(());
    }

    let (width, height) = working.dimensions();
    let Some((x_range, y_range)) = clipped_bounds(stroke, width, height) else {
        return Ok(());
    };

    let mut touched = 0u32;
    for py in y_range {
        for px in x_range.clone() {
            let dx = f64::from(px) - stroke.center_x;
            let dy = f64::from(py) - stroke.center_y;
            let weight = brush_weight((dx * dx + dy * dy).sqrt(), radius);
            if weight <= 0.0 {
                continue;
            }

            let from = source.get_pixel(px, py);
            let to = working.get_pixel_mut(px, py);
            for channel in 0..3 {
                to[channel] = blend(to[channel], from[channel], weight);
            }
            touched += 1;
        }
    }

    trace!(
        x = stroke.center_x,
        y = stroke.center_y,
        radius,
        mode = ?stroke.mode,
        touched,
        "brush stroke"
    );
    Ok(())
}

fn blend(dest: u8, source: u8, weight: f64) -> u8 {
    (f64::from(dest) * (1.0 - weight) + f64::from(source) * weight)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Stroke bounding box clipped to the canvas, or `None` when fully off-canvas.
fn clipped_bounds(
    stroke: &BrushStroke,
    width: u32,
    height: u32,
) -> Option<(std::ops::RangeInclusive<u32>, std::ops::RangeInclusive<u32>)> {
    if width == 0 || height == 0 {
        return None;
    }

    let clip = |low: f64, high: f64, size: u32| {
        let max = f64::from(size - 1);
        let low = low.floor().max(0.0);
        let high = high.ceil().min(max);
        (low <= high).then(|| (low as u32)..=(high as u32))
    };

    let x_range = clip(
        stroke.center_x - stroke.radius,
        stroke.center_x + stroke.radius,
        width,
    )?;
    let y_range = clip(
        stroke.center_y - stroke.radius,
        stroke.center_y + stroke.radius,
        height,
    )?;
    Some((x_range, y_range))
}

/// The three buffers a retouch needs, owned together.
///
/// `working` is always seeded from either `original` or `transformed`; it is
/// reseeded whenever `transformed` is replaced, so it never mixes strokes from
/// one preview generation with pixels of another.
#[derive(Debug, Clone)]
pub struct RetouchSession {
    original: PixelBuffer,
    transformed: PixelBuffer,
    working: PixelBuffer,
}

impl RetouchSession {
    /// Start a session; `working` begins as a copy of `transformed`.
    ///
    /// # Errors
    /// - `RecolorError::BufferSizeMismatch` if the buffers differ in size
    pub fn new(original: PixelBuffer, transformed: PixelBuffer) -> Result<Self> {
        if original.dimensions() != transformed.dimensions() {
            return Err(RecolorError::size_mismatch(
                original.dimensions(),
                transformed.dimensions(),
            ));
        }
        let working = transformed.clone();
        Ok(Self {
            original,
            transformed,
            working,
        })
    }

    /// Apply one stroke, reading from the buffer selected by its mode.
    pub fn stroke(&mut self, stroke: &BrushStroke) -> Result<()> {
        let source = match stroke.mode {
            BrushMode::Restore => &self.original,
            BrushMode::Apply => &self.transformed,
        };
        paint(&mut self.working, source, stroke)
    }

    /// Drop all strokes.
    pub fn clear_strokes(&mut self) {
        self.working.clone_from(&self.transformed);
    }

    /// Show the untouched original everywhere.
    pub fn reset_to_original(&mut self) {
        self.working.clone_from(&self.original);
    }

    /// Swap in a new transform result (e.g. after a settings change) and
    /// reseed `working` from it.
    ///
    /// # Errors
    /// - `RecolorError::BufferSizeMismatch` if `transformed` differs in size
    pub fn replace_transformed(&mut self, transformed: PixelBuffer) -> Result<()> {
        if transformed.dimensions() != self.original.dimensions() {
            return Err(RecolorError::size_mismatch(
                self.original.dimensions(),
                transformed.dimensions(),
            ));
        }
        self.transformed = transformed;
        self.clear_strokes();
        Ok(())
    }

    #[must_use]
    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    #[must_use]
    pub fn transformed(&self) -> &PixelBuffer {
        &self.transformed
    }

    #[must_use]
    pub fn working(&self) -> &PixelBuffer {
        &self.working
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.working.dimensions()
    }

    /// Consume the session, keeping only the retouched buffer
    #[must_use]
    pub fn into_working(self) -> PixelBuffer {
        self.working
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn distance(x: u32, y: u32, cx: f64, cy: f64) -> f64 {
        ((f64::from(x) - cx).powi(2) + (f64::from(y) - cy).powi(2)).sqrt()
    }

    #[test]
    fn test_brush_weight_profile() {
        assert!((brush_weight(0.0, 20.0) - 1.0).abs() < f64::EPSILON);
        assert!((brush_weight(14.0, 20.0) - 1.0).abs() < f64::EPSILON);
        assert!((brush_weight(17.0, 20.0) - 0.5).abs() < 1e-9);
        assert!(brush_weight(20.0, 20.0).abs() < f64::EPSILON);
        assert!(brush_weight(20.5, 20.0).abs() < f64::EPSILON);
        assert!(brush_weight(0.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_restore_stroke_regions() {
        let mut working = PixelBuffer::from_pixel(100, 100, Rgba([10, 20, 30, 255]));
        working.put_pixel(3, 3, Rgba([1, 2, 3, 4]));
        let mut source = PixelBuffer::new(100, 100);
        for (x, y, pixel) in source.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 2) as u8, (y * 2) as u8, 200, 17]);
        }
        let before = working.clone();

        let stroke = BrushStroke::new(50.0, 50.0, 20.0, BrushMode::Restore);
        paint(&mut working, &source, &stroke).unwrap();

        for (x, y, pixel) in working.enumerate_pixels() {
            let d = distance(x, y, 50.0, 50.0);
            let prior = before.get_pixel(x, y);
            if d > 20.0 {
                assert_eq!(pixel, prior, "({x}, {y}) outside the stroke changed");
            } else if d <= 14.0 {
                let expected = source.get_pixel(x, y);
                assert_eq!(pixel.0[..3], expected.0[..3], "({x}, {y}) not fully restored");
                assert_eq!(pixel[3], prior[3]);
            }
        }
    }

    #[test]
    fn test_soft_edge_blends_halfway() {
        let mut working = PixelBuffer::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let source = PixelBuffer::from_pixel(100, 100, Rgba([200, 100, 50, 9]));
        paint(
            &mut working,
            &source,
            &BrushStroke::new(50.0, 50.0, 20.0, BrushMode::Apply),
        )
        .unwrap();

        // 17px out: weight (20 - 17) / 6 = 0.5
        assert_eq!(working.get_pixel(67, 50), &Rgba([100, 50, 25, 255]));
        assert_eq!(working.get_pixel(70, 50), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_clipped_at_edges() {
        let mut working = PixelBuffer::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let source = PixelBuffer::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        paint(
            &mut working,
            &source,
            &BrushStroke::new(0.0, 9.0, 5.0, BrushMode::Restore),
        )
        .unwrap();
        assert_eq!(working.get_pixel(0, 9), &Rgba([255, 255, 255, 255]));
        assert_eq!(working.get_pixel(9, 0), &Rgba([0, 0, 0, 255]));

        // Entirely off-canvas strokes are no-ops
        let before = working.clone();
        paint(
            &mut working,
            &source,
            &BrushStroke::new(-50.0, -50.0, 10.0, BrushMode::Restore),
        )
        .unwrap();
        paint(
            &mut working,
            &source,
            &BrushStroke::new(500.0, 5.0, 10.0, BrushMode::Restore),
        )
        .unwrap();
        paint(
            &mut working,
            &source,
            &BrushStroke::new(5.0, 5.0, 0.0, BrushMode::Restore),
        )
        .unwrap();
        assert_eq!(working, before);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let mut working = PixelBuffer::new(10, 10);
        let source = PixelBuffer::new(10, 11);
        let error = paint(
            &mut working,
            &source,
            &BrushStroke::new(5.0, 5.0, 3.0, BrushMode::Restore),
        )
        .unwrap_err();
        assert!(matches!(error, RecolorError::BufferSizeMismatch { .. }));

        assert!(RetouchSession::new(PixelBuffer::new(2, 2), PixelBuffer::new(3, 2)).is_err());
    }

    #[test]
    fn test_from_display_scales_to_canvas() {
        let stroke = BrushStroke::from_display(10.0, 20.0, 40.0, 2.0, BrushMode::Apply);
        assert_eq!(stroke, BrushStroke::new(20.0, 40.0, 40.0, BrushMode::Apply));
    }

    #[test]
    fn test_session_restore_then_apply() {
        let original = PixelBuffer::from_pixel(40, 40, Rgba([128, 128, 128, 255]));
        let transformed = PixelBuffer::from_pixel(40, 40, Rgba([142, 172, 83, 255]));
        let mut session = RetouchSession::new(original.clone(), transformed.clone()).unwrap();
        assert_eq!(session.working(), &transformed);

        session
            .stroke(&BrushStroke::new(20.0, 20.0, 10.0, BrushMode::Restore))
            .unwrap();
        assert_eq!(session.working().get_pixel(20, 20), original.get_pixel(20, 20));
        assert_eq!(session.working().get_pixel(0, 0), transformed.get_pixel(0, 0));

        session
            .stroke(&BrushStroke::new(20.0, 20.0, 10.0, BrushMode::Apply))
            .unwrap();
        // the full-strength core is back to transformed; the soft ring blended
        // twice and only lands near it
        for (x, y, pixel) in session.working().enumerate_pixels() {
            let d = (f64::from(x) - 20.0).hypot(f64::from(y) - 20.0);
            if d <= 10.0 * FULL_STRENGTH_RATIO || d > 10.0 {
                assert_eq!(pixel, transformed.get_pixel(x, y), "at ({x}, {y})");
            }
        }
        assert_ne!(session.working().get_pixel(28, 20), transformed.get_pixel(28, 20));

        session.reset_to_original();
        assert_eq!(session.working(), &original);
        session.clear_strokes();
        assert_eq!(session.working(), &transformed);
    }

    #[test]
    fn test_replace_transformed_reseeds_working() {
        let original = PixelBuffer::from_pixel(8, 8, Rgba([128, 128, 128, 255]));
        let first = PixelBuffer::from_pixel(8, 8, Rgba([1, 1, 1, 255]));
        let second = PixelBuffer::from_pixel(8, 8, Rgba([2, 2, 2, 255]));
        let mut session = RetouchSession::new(original, first).unwrap();
        session
            .stroke(&BrushStroke::new(4.0, 4.0, 3.0, BrushMode::Restore))
            .unwrap();

        session.replace_transformed(second.clone()).unwrap();
        assert_eq!(session.working(), &second);
        assert_eq!(session.transformed(), &second);
        assert!(session.replace_transformed(PixelBuffer::new(4, 4)).is_err());
        assert_eq!(session.dimensions(), (8, 8));
        assert_eq!(session.into_working(), second);
    }
}
