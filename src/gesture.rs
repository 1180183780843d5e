//! Gesture classification from a single frame of hand landmarks.
//!
//! The classifier is a pure function of one [`LandmarkFrame`]: it measures
//! pinch distances in frame pixels and checks which fingers are extended.
//! All temporal reasoning (cooldowns, latches, hold times) belongs to the
//! pointer state machine.

use crate::{
    geometry::{is_extended, pixel_distance},
    landmarks::{Finger, HandJoint, LandmarkFrame},
};

/// Per-frame gesture snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GesturePredicates {
    /// Thumb tip to index tip distance in pixels
    pub pinch_distance: f64,
    /// Index tip to middle tip distance in pixels
    pub index_middle_distance: f64,
    /// Thumb and index tips within the pinch threshold
    pub is_pinching: bool,
    /// Thumb, index and middle tips pinched together
    pub is_three_finger_pinch: bool,
    /// No finger extended
    pub is_fist: bool,
    /// All four fingers extended
    pub is_open_palm: bool,
    /// Index and middle extended, ring and pinky curled
    pub is_two_finger_up: bool,
}

/// Threshold-based gesture classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureClassifier {
    pinch_threshold: f64,
}

impl GestureClassifier {
    /// Create a classifier with a pinch threshold in frame pixels
    pub const fn new(pinch_threshold: f64) -> Self {
        Self { pinch_threshold }
    }

    /// Derive gesture predicates from one hand's landmarks
    pub fn classify(&self, frame: &LandmarkFrame) -> GesturePredicates {
        let (width, height) = (frame.width(), frame.height());
        let thumb_tip = frame.point(HandJoint::ThumbTip);
        let index_tip = frame.point(HandJoint::IndexTip);
        let middle_tip = frame.point(HandJoint::MiddleTip);

        let pinch_distance = pixel_distance(thumb_tip, index_tip, width, height);
        let index_middle_distance = pixel_distance(index_tip, middle_tip, width, height);
        let is_pinching = pinch_distance < self.pinch_threshold;

        let [index, middle, ring, pinky] =
            Finger::ALL.map(|finger| is_extended(frame.point(finger.tip()), frame.point(finger.base())));

        GesturePredicates {
            pinch_distance,
            index_middle_distance,
            is_pinching,
            is_three_finger_pinch: is_pinching && index_middle_distance < self.pinch_threshold,
            is_fist: !index && !middle && !ring && !pinky,
            is_open_palm: index && middle && ring && pinky,
            is_two_finger_up: index && middle && !ring && !pinky,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_HAND_LANDMARKS;
    use nalgebra::Point2;

    /// Hand with every base joint at y=0.6 and tips placed per finger
    fn hand(extended: [bool; 4]) -> Vec<Point2<f64>> {
        let mut points = vec![Point2::new(0.5, 0.8); NUM_HAND_LANDMARKS];
        for (i, finger) in Finger::ALL.iter().enumerate() {
            let x = 0.4 + 0.05 * i as f64;
            points[finger.base().index()] = Point2::new(x, 0.6);
            let tip_y = if extended[i] { 0.3 } else { 0.7 };
            points[finger.tip().index()] = Point2::new(x, tip_y);
        }
        points[HandJoint::ThumbTip.index()] = Point2::new(0.2, 0.6);
        points
    }

    fn classify(points: &[Point2<f64>]) -> GesturePredicates {
        let frame = LandmarkFrame::new(points, 640, 480).unwrap();
        GestureClassifier::new(40.0).classify(&frame)
    }

    #[test]
    fn test_fist() {
        let p = classify(&hand([false; 4]));
        assert!(p.is_fist);
        assert!(!p.is_open_palm);
        assert!(!p.is_two_finger_up);
    }

    #[test]
    fn test_open_palm() {
        let p = classify(&hand([true; 4]));
        assert!(p.is_open_palm);
        assert!(!p.is_fist);
        assert!(!p.is_two_finger_up);
    }

    #[test]
    fn test_two_finger_up() {
        let p = classify(&hand([true, true, false, false]));
        assert!(p.is_two_finger_up);
        assert!(!p.is_fist);
        assert!(!p.is_open_palm);
    }

    #[test]
    fn test_pointing_is_no_pose() {
        let p = classify(&hand([true, false, false, false]));
        assert!(!p.is_two_finger_up && !p.is_fist && !p.is_open_palm);
    }

    #[test]
    fn test_pinch_distance() {
        let mut points = hand([true, false, false, false]);
        points[HandJoint::ThumbTip.index()] = points[HandJoint::IndexTip.index()];
        let p = classify(&points);
        assert_eq!(p.pinch_distance, 0.0);
        assert!(p.is_pinching);
        // Middle tip is curled far below the index tip
        assert!(!p.is_three_finger_pinch);
    }

    #[test]
    fn test_three_finger_pinch() {
        let mut points = hand([true, true, false, false]);
        let index = points[HandJoint::IndexTip.index()];
        points[HandJoint::ThumbTip.index()] = Point2::new(index.x + 0.01, index.y);
        points[HandJoint::MiddleTip.index()] = Point2::new(index.x - 0.01, index.y);
        let p = classify(&points);
        assert!(p.is_pinching);
        assert!(p.is_three_finger_pinch);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut points = hand([true; 4]);
        let index = points[HandJoint::IndexTip.index()];
        // Exactly 40 px to the right on a 640 px wide frame
        points[HandJoint::ThumbTip.index()] = Point2::new(index.x + 40.0 / 640.0, index.y);
        let p = classify(&points);
        assert!((p.pinch_distance - 40.0).abs() < 1e-9);
        let strict = GestureClassifier::new(p.pinch_distance).classify(
            &LandmarkFrame::new(&points, 640, 480).unwrap(),
        );
        assert!(!strict.is_pinching);
    }
}
