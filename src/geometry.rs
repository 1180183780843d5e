//! Geometry helpers shared by gesture classification and pointer control.

use nalgebra::Point2;

/// A position in absolute screen pixels
pub type ScreenPoint = Point2<f64>;

/// Euclidean distance between two normalized points measured in frame pixels
///
/// Each axis is scaled by the frame dimension first, so the result is
/// comparable against pixel thresholds regardless of aspect ratio.
pub fn pixel_distance(a: Point2<f64>, b: Point2<f64>, width: u32, height: u32) -> f64 {
    let dx = (a.x - b.x) * f64::from(width);
    let dy = (a.y - b.y) * f64::from(height);
    dx.hypot(dy)
}

/// Whether a fingertip sits above its base joint in image coordinates
pub fn is_extended(tip: Point2<f64>, base: Point2<f64>) -> bool {
    tip.y < base.y
}

/// Clamp and convert f64 to i32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pixel_distance_scales_axes() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(0.5, 0.5);
        // 320 x 240 pixel legs
        assert!((pixel_distance(a, b, 640, 480) - 400.0).abs() < 1e-9);
        assert_eq!(pixel_distance(a, a, 640, 480), 0.0);
    }

    #[test]
    fn test_pixel_distance_aspect_ratio() {
        let a = Point2::new(0.1, 0.1);
        let horizontal = Point2::new(0.2, 0.1);
        let vertical = Point2::new(0.1, 0.2);
        // Same normalized step, different pixel length on a wide frame
        assert!(pixel_distance(a, horizontal, 1280, 720) > pixel_distance(a, vertical, 1280, 720));
    }

    #[test]
    fn test_is_extended() {
        assert!(is_extended(Point2::new(0.5, 0.2), Point2::new(0.5, 0.6)));
        assert!(!is_extended(Point2::new(0.5, 0.7), Point2::new(0.5, 0.6)));
        // Level with the base is not extended
        assert!(!is_extended(Point2::new(0.5, 0.6), Point2::new(0.1, 0.6)));
    }

    #[test]
    fn test_f64_to_i32_clamp() {
        assert_eq!(f64_to_i32_clamp(50.4, 0, 100), 50);
        assert_eq!(f64_to_i32_clamp(50.6, 0, 100), 51);
        assert_eq!(f64_to_i32_clamp(-10.0, 0, 100), 0);
        assert_eq!(f64_to_i32_clamp(150.0, 0, 100), 100);
        assert_eq!(f64_to_i32_clamp(f64::NAN, 0, 100), 0);
        assert_eq!(f64_to_i32_clamp(f64::INFINITY, 0, 100), 0);
        assert_eq!(f64_to_i32_clamp(5.0, 100, 0), 5);
    }

    proptest! {
        #[test]
        fn prop_pixel_distance_symmetric(
            ax in 0.0..1.0f64, ay in 0.0..1.0f64,
            bx in 0.0..1.0f64, by in 0.0..1.0f64,
            w in 1u32..4096, h in 1u32..4096
        ) {
            let a = Point2::new(ax, ay);
            let b = Point2::new(bx, by);
            let d1 = pixel_distance(a, b, w, h);
            let d2 = pixel_distance(b, a, w, h);
            prop_assert!(d1 >= 0.0);
            prop_assert!((d1 - d2).abs() < 1e-9);
        }

        #[test]
        fn prop_clamp_within_bounds(value in any::<f64>(), min in -10_000i32..10_000, max in -10_000i32..10_000) {
            let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
            let result = f64_to_i32_clamp(value, min, max);
            prop_assert!(result >= lo && result <= hi);
        }
    }
}
