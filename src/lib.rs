//! Hand gesture pointer control from webcam hand landmarks.
//!
//! Each camera frame yields 21 normalized hand landmarks. From those the
//! library:
//! - maps the index fingertip to screen coordinates (corner calibration or
//!   an active zone inside the frame),
//! - smooths the cursor with exponential smoothing,
//! - classifies gestures (pinch, three-finger pinch, fist, open palm, two fingers up),
//! - runs a pointer state machine that emits moves, clicks, drags and scrolls.
//!
//! Commands go to an [`input::InputSink`]; the X11 sink injects them through XTEST.
//!
//! # Examples
//!
//! ```no_run
//! use hand_pointer::{
//!     calibration::ActiveZoneMapper,
//!     gesture::GestureClassifier,
//!     landmarks::LandmarkFrame,
//!     pointer::{PointerController, PointerSettings, PointerState},
//!     smoother::MotionSmoother,
//! };
//! use nalgebra::Point2;
//! use std::time::Instant;
//!
//! # fn main() -> hand_pointer::Result<()> {
//! let controller = PointerController::new(
//!     GestureClassifier::new(40.0),
//!     Box::new(ActiveZoneMapper::new(100.0, 1920, 1080)),
//!     MotionSmoother::new(0.2),
//!     PointerSettings::default(),
//! );
//! let mut state = PointerState::new(1920, 1080);
//!
//! let points = vec![Point2::new(0.5, 0.5); 21];
//! let frame = LandmarkFrame::new(&points, 640, 480)?;
//! for command in controller.update(&mut state, Some(&frame), Instant::now()) {
//!     println!("{command:?}");
//! }
//! # Ok(())
//! # }
//! ```

/// Hand landmark types and joint indices
pub mod landmarks;

/// Pixel distances and finger extension tests
pub mod geometry;

/// Landmark to screen mapping and calibration capture
pub mod calibration;

/// Exponential cursor smoothing
pub mod smoother;

/// Gesture predicates from one landmark frame
pub mod gesture;

/// Pointer state machine
pub mod pointer;

/// Operating-system input injection
pub mod input;

/// Hand landmark estimation
pub mod detection;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Command-line arguments
pub mod cli;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
