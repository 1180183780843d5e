//! Exponential smoothing of the cursor target.

use crate::geometry::ScreenPoint;

/// Single-pole exponential filter for cursor positions
///
/// The filter holds no history of its own; the previous output lives in the
/// pointer state and is passed in on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSmoother {
    alpha: f64,
}

impl MotionSmoother {
    /// Create a smoother with weight `alpha` for the newest target
    ///
    /// `1.0` disables smoothing and `0.0` freezes the cursor.
    pub fn new(alpha: f64) -> Self {
        assert!((0.0..=1.0).contains(&alpha), "Alpha must be in [0, 1]");
        Self { alpha }
    }

    /// Move `previous` toward `target` by the smoothing factor
    pub fn smooth(&self, previous: ScreenPoint, target: ScreenPoint) -> ScreenPoint {
        previous + (target - previous) * self.alpha
    }
}
