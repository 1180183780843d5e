//! Configuration management for the hand pointer application
//!
//! A configuration file must be complete: every section and field is
//! required and unknown fields are rejected. [`Config::load`] parses and
//! validates in one step, so a loaded `Config` is always fully usable.

use crate::{
    calibration::{create_mapper, CalibrationMode, CalibrationRecord},
    constants::{
        DEFAULT_ACTIVE_ZONE_MARGIN_PX, DEFAULT_CLICK_COOLDOWN_S, DEFAULT_DRAG_HOLD_S, DEFAULT_PINCH_THRESHOLD_PX,
        DEFAULT_PRESENCE_THRESHOLD, DEFAULT_RIGHT_CLICK_COOLDOWN_S, DEFAULT_SCROLL_SENSITIVITY,
        DEFAULT_SMOOTHING_ALPHA,
    },
    gesture::GestureClassifier,
    landmarks::HandJoint,
    pointer::{PointerController, PointerSettings},
    smoother::MotionSmoother,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Cursor driving configuration
    pub cursor: CursorConfig,

    /// Gesture thresholds and timings
    pub gestures: GestureConfig,

    /// Landmark-to-screen mapping
    pub calibration: CalibrationConfig,

    /// Camera and landmark model
    pub camera: CameraConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Cursor driving configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CursorConfig {
    /// Joint that drives the cursor
    pub landmark: HandJoint,

    /// Joint that drives the cursor while dragging
    pub drag_landmark: HandJoint,

    /// Smoothing factor in (0, 1]; 1 disables smoothing
    pub smoothing: f64,
}

/// Gesture thresholds and timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GestureConfig {
    /// Pinch distance threshold in camera pixels
    pub pinch_threshold_px: f64,

    /// Minimum seconds between two left clicks
    pub click_cooldown_s: f64,

    /// Minimum seconds between two right clicks
    pub right_click_cooldown_s: f64,

    /// Seconds a fist must be held before it drags
    pub drag_hold_s: f64,

    /// Scroll steps per pixel of index-tip movement
    pub scroll_sensitivity: f64,
}

/// Landmark-to-screen mapping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationConfig {
    /// Mapping mode
    pub mode: CalibrationMode,

    /// Active zone inset from each frame edge, in pixels
    pub margin_px: f64,

    /// Persisted calibration record
    pub file: PathBuf,
}

/// Camera and model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Camera index
    pub index: i32,

    /// Mirror the image horizontally
    pub mirror: bool,

    /// Path to the hand landmark ONNX model
    pub model: PathBuf,

    /// Minimum hand presence score (0.0-1.0)
    pub presence_threshold: f32,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Show the annotated camera window
    pub show_window: bool,

    /// Window title
    pub window_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cursor: CursorConfig::default(),
            gestures: GestureConfig::default(),
            calibration: CalibrationConfig::default(),
            camera: CameraConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            landmark: HandJoint::IndexTip,
            drag_landmark: HandJoint::MiddleBase,
            smoothing: DEFAULT_SMOOTHING_ALPHA,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold_px: DEFAULT_PINCH_THRESHOLD_PX,
            click_cooldown_s: DEFAULT_CLICK_COOLDOWN_S,
            right_click_cooldown_s: DEFAULT_RIGHT_CLICK_COOLDOWN_S,
            drag_hold_s: DEFAULT_DRAG_HOLD_S,
            scroll_sensitivity: DEFAULT_SCROLL_SENSITIVITY,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            mode: CalibrationMode::ActiveZone,
            margin_px: DEFAULT_ACTIVE_ZONE_MARGIN_PX,
            file: PathBuf::from("calibration.yaml"),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            mirror: true,
            model: PathBuf::from("assets/hand_landmark.onnx"),
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_window: true,
            window_name: "Hand Pointer".to_string(),
        }
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|e| Error::ConfigError(format!("{name} is not a valid duration: {e}")))
}

impl Config {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML file, without validation
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        Self::from_yaml(&content)
    }

    /// Parse a configuration from YAML text, without validation
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let smoothing = self.cursor.smoothing;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(Error::ConfigError(
                "Cursor smoothing must be in (0.0, 1.0]".to_string(),
            ));
        }

        let gestures = &self.gestures;
        if !(gestures.pinch_threshold_px.is_finite() && gestures.pinch_threshold_px > 0.0) {
            return Err(Error::ConfigError(
                "Pinch threshold must be a positive number of pixels".to_string(),
            ));
        }
        for (name, value) in [
            ("click_cooldown_s", gestures.click_cooldown_s),
            ("right_click_cooldown_s", gestures.right_click_cooldown_s),
            ("drag_hold_s", gestures.drag_hold_s),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::ConfigError(format!("{name} must be zero or more seconds")));
            }
        }
        if !gestures.scroll_sensitivity.is_finite() {
            return Err(Error::ConfigError("Scroll sensitivity must be finite".to_string()));
        }

        if !(self.calibration.margin_px.is_finite() && self.calibration.margin_px >= 0.0) {
            return Err(Error::ConfigError(
                "Active zone margin must be zero or more pixels".to_string(),
            ));
        }
        if self.calibration.mode == CalibrationMode::Corners && self.calibration.file.as_os_str().is_empty() {
            return Err(Error::ConfigError(
                "Corner calibration needs a calibration file".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.camera.presence_threshold) {
            return Err(Error::ConfigError(
                "Presence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.camera.index < 0 {
            return Err(Error::ConfigError("Camera index must not be negative".to_string()));
        }

        if self.display.show_window && self.display.window_name.trim().is_empty() {
            return Err(Error::ConfigError("Window name must not be empty".to_string()));
        }

        Ok(())
    }

    /// State machine timings and landmark choices
    pub fn pointer_settings(&self) -> Result<PointerSettings> {
        Ok(PointerSettings {
            cursor_joint: self.cursor.landmark,
            drag_joint: self.cursor.drag_landmark,
            click_cooldown: seconds("click_cooldown_s", self.gestures.click_cooldown_s)?,
            right_click_cooldown: seconds("right_click_cooldown_s", self.gestures.right_click_cooldown_s)?,
            drag_hold: seconds("drag_hold_s", self.gestures.drag_hold_s)?,
            scroll_sensitivity: self.gestures.scroll_sensitivity,
        })
    }

    pub const fn classifier(&self) -> GestureClassifier {
        GestureClassifier::new(self.gestures.pinch_threshold_px)
    }

    /// Load the calibration record when corner mapping is configured
    pub fn load_calibration(&self) -> Result<Option<CalibrationRecord>> {
        match self.calibration.mode {
            CalibrationMode::Corners => CalibrationRecord::from_file(&self.calibration.file).map(Some),
            CalibrationMode::ActiveZone => Ok(None),
        }
    }

    /// Assemble the pointer controller for a screen
    ///
    /// # Errors
    ///
    /// Fails on invalid settings, or in corner mode when the record is
    /// missing or degenerate.
    pub fn build_controller(
        &self,
        record: Option<&CalibrationRecord>,
        screen_width: u32,
        screen_height: u32,
    ) -> Result<PointerController> {
        self.validate()?;
        let mapper = create_mapper(
            self.calibration.mode,
            self.calibration.margin_px,
            record,
            screen_width,
            screen_height,
        )?;

        Ok(PointerController::new(
            self.classifier(),
            mapper,
            MotionSmoother::new(self.cursor.smoothing),
            self.pointer_settings()?,
        ))
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Pointer Configuration

# Cursor driving
cursor:
  landmark: index_tip
  drag_landmark: middle_base
  smoothing: 0.2

# Gesture thresholds (pixels) and timings (seconds)
gestures:
  pinch_threshold_px: 40.0
  click_cooldown_s: 0.3
  right_click_cooldown_s: 1.0
  drag_hold_s: 0.5
  scroll_sensitivity: 2.0

# Landmark-to-screen mapping: corners or active_zone
calibration:
  mode: active_zone
  margin_px: 100.0
  file: "calibration.yaml"

# Camera and landmark model
camera:
  index: 0
  mirror: true
  model: "assets/hand_landmark.onnx"
  presence_threshold: 0.5

# Display settings
display:
  show_window: true
  window_name: "Hand Pointer"
"#;
