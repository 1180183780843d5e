//! Hand landmark types.
//!
//! A [`LandmarkFrame`] holds the 21 normalized joint positions reported for one
//! detected hand in one camera frame, together with the frame's pixel size.
//! Joints are addressed through [`HandJoint`] rather than raw indices.

use crate::{constants::NUM_HAND_LANDMARKS, Error, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Named hand joints in landmark-model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandJoint {
    Wrist = 0,
    ThumbBase = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexBase = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleBase = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingBase = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyBase = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandJoint {
    /// All joints, ordered by landmark index
    pub const ALL: [Self; NUM_HAND_LANDMARKS] = [
        Self::Wrist,
        Self::ThumbBase,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexBase,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleBase,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingBase,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyBase,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    /// Landmark index of this joint
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A non-thumb finger, with its tip and base joints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// The four fingers used for pose classification
    pub const ALL: [Self; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    pub const fn tip(self) -> HandJoint {
        match self {
            Self::Index => HandJoint::IndexTip,
            Self::Middle => HandJoint::MiddleTip,
            Self::Ring => HandJoint::RingTip,
            Self::Pinky => HandJoint::PinkyTip,
        }
    }

    pub const fn base(self) -> HandJoint {
        match self {
            Self::Index => HandJoint::IndexBase,
            Self::Middle => HandJoint::MiddleBase,
            Self::Ring => HandJoint::RingBase,
            Self::Pinky => HandJoint::PinkyBase,
        }
    }
}

/// One hand's landmarks for one frame
///
/// Points are normalized to `[0, 1]` with the origin at the top-left of the
/// (mirrored) camera image.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [Point2<f64>; NUM_HAND_LANDMARKS],
    width: u32,
    height: u32,
}

impl LandmarkFrame {
    /// Build a frame from exactly 21 normalized points
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the point count is not 21 or the frame has a
    /// zero dimension.
    pub fn new(points: &[Point2<f64>], width: u32, height: u32) -> Result<Self> {
        let points: [Point2<f64>; NUM_HAND_LANDMARKS] = points.try_into().map_err(|_| {
            Error::InvalidInput(format!(
                "Expected {NUM_HAND_LANDMARKS} hand landmarks, got {}",
                points.len()
            ))
        })?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "Frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { points, width, height })
    }

    /// Normalized position of a joint
    pub fn point(&self, joint: HandJoint) -> Point2<f64> {
        self.points[joint.index()]
    }

    /// Position of a joint in frame pixels
    pub fn pixel(&self, joint: HandJoint) -> Point2<f64> {
        let p = self.point(joint);
        Point2::new(p.x * f64::from(self.width), p.y * f64::from(self.height))
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_indices() {
        assert_eq!(HandJoint::Wrist.index(), 0);
        assert_eq!(HandJoint::ThumbTip.index(), 4);
        assert_eq!(HandJoint::IndexTip.index(), 8);
        assert_eq!(HandJoint::MiddleBase.index(), 9);
        assert_eq!(HandJoint::PinkyTip.index(), 20);
        for (i, joint) in HandJoint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn test_finger_joints() {
        assert_eq!(Finger::Ring.tip(), HandJoint::RingTip);
        assert_eq!(Finger::Ring.base(), HandJoint::RingBase);
        assert_eq!(Finger::Pinky.base().index(), 17);
    }

    #[test]
    fn test_frame_rejects_wrong_count() {
        let points = vec![Point2::new(0.5, 0.5); 20];
        assert!(matches!(
            LandmarkFrame::new(&points, 640, 480),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_frame_rejects_empty_dimensions() {
        let points = vec![Point2::new(0.5, 0.5); NUM_HAND_LANDMARKS];
        assert!(LandmarkFrame::new(&points, 0, 480).is_err());
    }

    #[test]
    fn test_pixel_scaling() {
        let mut points = vec![Point2::new(0.0, 0.0); NUM_HAND_LANDMARKS];
        points[HandJoint::IndexTip.index()] = Point2::new(0.5, 0.25);
        let frame = LandmarkFrame::new(&points, 640, 480).unwrap();
        let p = frame.pixel(HandJoint::IndexTip);
        assert_eq!(p, Point2::new(320.0, 120.0));
    }

    #[test]
    fn test_joint_serde_names() {
        let joint: HandJoint = serde_yaml::from_str("middle_base").unwrap();
        assert_eq!(joint, HandJoint::MiddleBase);
        assert_eq!(serde_yaml::to_string(&HandJoint::IndexTip).unwrap().trim(), "index_tip");
    }
}
