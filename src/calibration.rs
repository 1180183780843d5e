//! Mapping from camera landmark space to screen pixels.
//!
//! Two mappers are available, chosen once from configuration:
//! - [`CornerMapper`] stretches the rectangle between the calibrated
//!   Top-Left and Bottom-Right points onto the screen (unclamped).
//! - [`ActiveZoneMapper`] stretches a fixed inset of the camera frame onto
//!   the screen and clamps to the screen edges.
//!
//! This module also holds the persisted [`CalibrationRecord`] and the
//! pinch-to-confirm [`CalibrationCapture`] flow that produces it.

use crate::{
    constants::EPSILON,
    geometry::ScreenPoint,
    gesture::GestureClassifier,
    landmarks::{HandJoint, LandmarkFrame},
    Error, Result,
};
use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::{
    path::Path,
    time::{Duration, Instant},
};

/// How landmark positions are mapped onto the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMode {
    /// Use the persisted calibration corners
    Corners,
    /// Use a fixed inset of the camera frame
    ActiveZone,
}

/// Screen corner designated during calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Capture order
    pub const ORDER: [Self; 4] = [Self::TopLeft, Self::TopRight, Self::BottomRight, Self::BottomLeft];

    /// Name used in the persisted record
    pub const fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "Top-Left",
            Self::TopRight => "Top-Right",
            Self::BottomRight => "Bottom-Right",
            Self::BottomLeft => "Bottom-Left",
        }
    }
}

/// A normalized landmark-space position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point2<f64>> for CornerPoint {
    fn from(p: Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<CornerPoint> for Point2<f64> {
    fn from(c: CornerPoint) -> Self {
        Self::new(c.x, c.y)
    }
}

/// Persisted calibration corners
///
/// Only Top-Left and Bottom-Right drive the mapping; the other two corners
/// are recorded when captured but are optional on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationRecord {
    #[serde(rename = "Top-Left")]
    pub top_left: CornerPoint,

    #[serde(rename = "Top-Right", default, skip_serializing_if = "Option::is_none")]
    pub top_right: Option<CornerPoint>,

    #[serde(rename = "Bottom-Right")]
    pub bottom_right: CornerPoint,

    #[serde(rename = "Bottom-Left", default, skip_serializing_if = "Option::is_none")]
    pub bottom_left: Option<CornerPoint>,
}

impl CalibrationRecord {
    /// Record holding only the two corners used for mapping
    pub const fn from_diagonal(top_left: CornerPoint, bottom_right: CornerPoint) -> Self {
        Self {
            top_left,
            top_right: None,
            bottom_right,
            bottom_left: None,
        }
    }

    /// Load a calibration record from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::CalibrationMissing(format!("Cannot read {}: {e}", path.display()))
        })?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse calibration {}: {e}", path.display())))
    }

    /// Save the calibration record to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize calibration: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Converts a normalized landmark position into a screen target
pub trait ScreenMapper: Send + Sync {
    /// Map a normalized point seen in a frame of the given pixel size
    fn map(&self, point: Point2<f64>, frame_width: u32, frame_height: u32) -> ScreenPoint;

    /// Get mapper name
    fn name(&self) -> &str;
}

/// Per-axis spans between the mapping corners
///
/// # Errors
///
/// Returns `DegenerateCalibration` if either span is zero or not finite.
fn corner_spans(top_left: Point2<f64>, bottom_right: Point2<f64>) -> Result<(f64, f64)> {
    let span_x = bottom_right.x - top_left.x;
    let span_y = bottom_right.y - top_left.y;
    if !span_x.is_finite() || span_x.abs() < EPSILON {
        return Err(Error::DegenerateCalibration { axis: "x" });
    }
    if !span_y.is_finite() || span_y.abs() < EPSILON {
        return Err(Error::DegenerateCalibration { axis: "y" });
    }
    Ok((span_x, span_y))
}

/// Linear per-axis mapping between two calibrated corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerMapper {
    origin: Point2<f64>,
    span_x: f64,
    span_y: f64,
    screen_width: f64,
    screen_height: f64,
}

impl CornerMapper {
    /// Build a mapper from the Top-Left and Bottom-Right corners
    ///
    /// # Errors
    ///
    /// Returns `DegenerateCalibration` if the corners share an x or y value.
    pub fn new(top_left: Point2<f64>, bottom_right: Point2<f64>, screen_width: u32, screen_height: u32) -> Result<Self> {
        let (span_x, span_y) = corner_spans(top_left, bottom_right)?;

        Ok(Self {
            origin: top_left,
            span_x,
            span_y,
            screen_width: f64::from(screen_width),
            screen_height: f64::from(screen_height),
        })
    }

    /// Build a mapper from a persisted record
    pub fn from_record(record: &CalibrationRecord, screen_width: u32, screen_height: u32) -> Result<Self> {
        Self::new(record.top_left.into(), record.bottom_right.into(), screen_width, screen_height)
    }
}

impl ScreenMapper for CornerMapper {
    fn map(&self, point: Point2<f64>, _frame_width: u32, _frame_height: u32) -> ScreenPoint {
        ScreenPoint::new(
            (point.x - self.origin.x) / self.span_x * self.screen_width,
            (point.y - self.origin.y) / self.span_y * self.screen_height,
        )
    }

    fn name(&self) -> &str {
        "CornerMapper"
    }
}

/// Whether a margin on both sides of a frame axis leaves a non-empty zone
pub fn margin_leaves_zone(margin: f64, frame_dim: u32) -> bool {
    f64::from(frame_dim) - 2.0 * margin > 0.0
}

/// Fixed inset rectangle of the camera frame stretched onto the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveZoneMapper {
    margin: f64,
    screen_width: f64,
    screen_height: f64,
}

impl ActiveZoneMapper {
    /// Create a mapper with a margin in frame pixels from each edge
    pub fn new(margin: f64, screen_width: u32, screen_height: u32) -> Self {
        Self {
            margin: margin.max(0.0),
            screen_width: f64::from(screen_width),
            screen_height: f64::from(screen_height),
        }
    }

    /// Position along one axis of the zone, in `[0, 1]`
    ///
    /// A margin that leaves no zone on this axis is ignored.
    fn zone_fraction(&self, normalized: f64, frame_dim: u32) -> f64 {
        let dim = f64::from(frame_dim);
        let margin = if margin_leaves_zone(self.margin, frame_dim) { self.margin } else { 0.0 };
        let pixel = normalized * dim;
        ((pixel - margin) / (dim - 2.0 * margin)).clamp(0.0, 1.0)
    }
}

impl ScreenMapper for ActiveZoneMapper {
    fn map(&self, point: Point2<f64>, frame_width: u32, frame_height: u32) -> ScreenPoint {
        ScreenPoint::new(
            self.zone_fraction(point.x, frame_width) * self.screen_width,
            self.zone_fraction(point.y, frame_height) * self.screen_height,
        )
    }

    fn name(&self) -> &str {
        "ActiveZoneMapper"
    }
}

/// Create the configured screen mapper
///
/// # Errors
///
/// Corner mode fails if no record is given or the record is degenerate.
pub fn create_mapper(
    mode: CalibrationMode,
    margin: f64,
    record: Option<&CalibrationRecord>,
    screen_width: u32,
    screen_height: u32,
) -> Result<Box<dyn ScreenMapper>> {
    match mode {
        CalibrationMode::Corners => {
            let record = record.ok_or_else(|| {
                Error::CalibrationMissing("Corner mapping needs a calibration record; run with --calibrate".to_string())
            })?;
            Ok(Box::new(CornerMapper::from_record(record, screen_width, screen_height)?))
        }
        CalibrationMode::ActiveZone => Ok(Box::new(ActiveZoneMapper::new(margin, screen_width, screen_height))),
    }
}

/// Progress of an interactive calibration
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureProgress {
    /// Waiting for a pinch at this corner
    Waiting(Corner),
    /// This corner was confirmed in the current frame
    Captured(Corner, CornerPoint),
    /// All corners captured
    Complete(CalibrationRecord),
    /// The corners span no distance on an axis; capture starts over
    Rejected { axis: &'static str },
}

/// Pinch-to-confirm capture of the four calibration corners
///
/// Each corner is confirmed by a fresh pinch: the thumb and index tips must
/// separate between two confirmations and a cooldown must have passed.
#[derive(Debug, Clone)]
pub struct CalibrationCapture {
    classifier: GestureClassifier,
    confirm_cooldown: Duration,
    captured: Vec<CornerPoint>,
    pinch_latched: bool,
    last_confirm: Option<Instant>,
}

impl CalibrationCapture {
    pub fn new(pinch_threshold: f64, confirm_cooldown: Duration) -> Self {
        Self {
            classifier: GestureClassifier::new(pinch_threshold),
            confirm_cooldown,
            captured: Vec::with_capacity(Corner::ORDER.len()),
            pinch_latched: false,
            last_confirm: None,
        }
    }

    /// Corner currently awaiting confirmation
    pub fn current_corner(&self) -> Option<Corner> {
        Corner::ORDER.get(self.captured.len()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.captured.len() == Corner::ORDER.len()
    }

    /// Feed one frame's landmarks (or none) into the capture flow
    pub fn update(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> CaptureProgress {
        let Some(corner) = self.current_corner() else {
            return CaptureProgress::Complete(self.record());
        };

        let Some(frame) = frame else {
            self.pinch_latched = false;
            return CaptureProgress::Waiting(corner);
        };

        let predicates = self.classifier.classify(frame);
        if !predicates.is_pinching {
            self.pinch_latched = false;
            return CaptureProgress::Waiting(corner);
        }

        let cooled_down = self
            .last_confirm
            .map_or(true, |last| now.duration_since(last) >= self.confirm_cooldown);
        if self.pinch_latched || !cooled_down {
            return CaptureProgress::Waiting(corner);
        }

        let point = CornerPoint::from(frame.point(HandJoint::IndexTip));
        self.captured.push(point);
        self.pinch_latched = true;
        self.last_confirm = Some(now);
        info!("Captured {} at ({:.3}, {:.3})", corner.name(), point.x, point.y);

        if self.is_complete() {
            let record = self.record();
            if let Err(Error::DegenerateCalibration { axis }) =
                corner_spans(record.top_left.into(), record.bottom_right.into())
            {
                warn!("Calibration corners span no {} distance, starting over", axis);
                self.captured.clear();
                return CaptureProgress::Rejected { axis };
            }
            CaptureProgress::Complete(record)
        } else {
            CaptureProgress::Captured(corner, point)
        }
    }

    fn record(&self) -> CalibrationRecord {
        CalibrationRecord {
            top_left: self.captured[0],
            top_right: Some(self.captured[1]),
            bottom_right: self.captured[2],
            bottom_left: Some(self.captured[3]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_corner_mapping_center() {
        let mapper = CornerMapper::new(Point2::new(0.2, 0.2), Point2::new(0.8, 0.8), 1000, 1000).unwrap();
        let p = mapper.map(Point2::new(0.5, 0.5), 640, 480);
        assert!((p.x - 500.0).abs() < 1e-9);
        assert!((p.y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_mapping_corners() {
        let mapper = CornerMapper::new(Point2::new(0.1, 0.3), Point2::new(0.9, 0.7), 1920, 1080).unwrap();
        assert_eq!(mapper.map(Point2::new(0.1, 0.3), 640, 480), ScreenPoint::new(0.0, 0.0));
        let br = mapper.map(Point2::new(0.9, 0.7), 640, 480);
        assert!((br.x - 1920.0).abs() < 1e-9);
        assert!((br.y - 1080.0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_mapping_is_unclamped() {
        let mapper = CornerMapper::new(Point2::new(0.2, 0.2), Point2::new(0.8, 0.8), 1000, 1000).unwrap();
        let p = mapper.map(Point2::new(0.0, 1.0), 640, 480);
        assert!(p.x < 0.0);
        assert!(p.y > 1000.0);
    }

    #[test]
    fn test_degenerate_calibration() {
        let same = Point2::new(0.4, 0.4);
        assert!(matches!(
            CornerMapper::new(same, same, 1000, 1000),
            Err(Error::DegenerateCalibration { axis: "x" })
        ));
        assert!(matches!(
            CornerMapper::new(Point2::new(0.2, 0.4), Point2::new(0.8, 0.4), 1000, 1000),
            Err(Error::DegenerateCalibration { axis: "y" })
        ));
    }

    #[test]
    fn test_active_zone_mapping() {
        let mapper = ActiveZoneMapper::new(100.0, 1920, 1080);
        // Frame 640x480: zone is x in [100, 540], y in [100, 380]
        let center = mapper.map(Point2::new(0.5, 0.5), 640, 480);
        assert!((center.x - 960.0).abs() < 1e-9);
        assert!((center.y - 540.0).abs() < 1e-9);

        let outside = mapper.map(Point2::new(0.01, 0.99), 640, 480);
        assert_eq!(outside, ScreenPoint::new(0.0, 1080.0));
    }

    #[test]
    fn test_active_zone_oversized_margin() {
        let mapper = ActiveZoneMapper::new(400.0, 1000, 1000);
        let p = mapper.map(Point2::new(0.25, 0.75), 640, 480);
        assert!((p.x - 250.0).abs() < 1e-9);
        assert!((p.y - 750.0).abs() < 1e-9);
    }

    #[test]
    fn test_create_mapper() {
        assert!(create_mapper(CalibrationMode::ActiveZone, 50.0, None, 800, 600).is_ok());
        assert!(matches!(
            create_mapper(CalibrationMode::Corners, 50.0, None, 800, 600),
            Err(Error::CalibrationMissing(_))
        ));
        let record = CalibrationRecord::from_diagonal(
            CornerPoint { x: 0.2, y: 0.2 },
            CornerPoint { x: 0.8, y: 0.8 },
        );
        let mapper = create_mapper(CalibrationMode::Corners, 50.0, Some(&record), 800, 600).unwrap();
        assert_eq!(mapper.name(), "CornerMapper");
    }

    #[test]
    fn test_record_yaml_names() {
        let record = CalibrationRecord::from_diagonal(
            CornerPoint { x: 0.2, y: 0.25 },
            CornerPoint { x: 0.8, y: 0.75 },
        );
        let yaml = serde_yaml::to_string(&record).unwrap();
        assert!(yaml.contains("Top-Left"));
        assert!(yaml.contains("Bottom-Right"));
        assert!(!yaml.contains("Top-Right"));
        let parsed: CalibrationRecord = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_margin_leaves_zone() {
        assert!(margin_leaves_zone(100.0, 480));
        assert!(!margin_leaves_zone(240.0, 480));
        assert!(!margin_leaves_zone(300.0, 480));
        assert!(margin_leaves_zone(0.0, 1));
    }

    fn pinch_at(x: f64, y: f64) -> LandmarkFrame {
        let mut points = vec![Point2::new(0.9, 0.9); crate::constants::NUM_HAND_LANDMARKS];
        points[HandJoint::IndexTip.index()] = Point2::new(x, y);
        points[HandJoint::ThumbTip.index()] = Point2::new(x + 0.01, y);
        LandmarkFrame::new(&points, 640, 480).unwrap()
    }

    #[test]
    fn test_capture_restarts_on_degenerate_corners() {
        let mut capture = CalibrationCapture::new(40.0, Duration::ZERO);
        let t0 = Instant::now();
        // Top-Left and Bottom-Right share x = 0.5
        let corners = [(0.5, 0.2), (0.8, 0.2), (0.5, 0.8), (0.2, 0.8)];

        let mut last = None;
        for (i, (x, y)) in corners.iter().enumerate() {
            let now = t0 + Duration::from_secs(i as u64);
            capture.update(None, now);
            last = Some(capture.update(Some(&pinch_at(*x, *y)), now));
        }

        assert_eq!(last, Some(CaptureProgress::Rejected { axis: "x" }));
        assert!(!capture.is_complete());
        assert_eq!(capture.current_corner(), Some(Corner::TopLeft));
    }

    proptest! {
        #[test]
        fn prop_active_zone_stays_on_screen(x in -1.0..2.0f64, y in -1.0..2.0f64, margin in 0.0..300.0f64) {
            let mapper = ActiveZoneMapper::new(margin, 1920, 1080);
            let p = mapper.map(Point2::new(x, y), 640, 480);
            prop_assert!((0.0..=1920.0).contains(&p.x));
            prop_assert!((0.0..=1080.0).contains(&p.y));
        }
    }
}
