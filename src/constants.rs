//! Constants used throughout the application

/// Number of landmarks produced per detected hand
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Square input size of the hand landmark model
pub const LANDMARK_MODEL_INPUT_SIZE: i32 = 224;

/// Values per landmark in the model output (x, y, z)
pub const LANDMARK_MODEL_COORDS: usize = 3;

/// Default cursor smoothing factor
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.2;

/// Default thumb-index pinch threshold in frame pixels
pub const DEFAULT_PINCH_THRESHOLD_PX: f64 = 40.0;

/// Default cooldowns in seconds
pub const DEFAULT_CLICK_COOLDOWN_S: f64 = 0.3;
pub const DEFAULT_RIGHT_CLICK_COOLDOWN_S: f64 = 1.0;

/// Fist hold time before a selection becomes a drag
pub const DEFAULT_DRAG_HOLD_S: f64 = 0.5;

/// Scroll units per pixel of index-tip movement
pub const DEFAULT_SCROLL_SENSITIVITY: f64 = 2.0;

/// Upper bound on wheel events per scroll command
pub const MAX_WHEEL_STEPS: u32 = 50;

/// Inset of the active zone from each frame edge
pub const DEFAULT_ACTIVE_ZONE_MARGIN_PX: f64 = 100.0;

/// Minimum hand presence score to accept a detection
pub const DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;

/// Pause between two confirmed calibration corners
pub const CALIBRATION_CONFIRM_COOLDOWN_S: f64 = 1.0;

/// Screen size assumed when no display is driven
pub const DRY_RUN_SCREEN_SIZE: (u32, u32) = (1920, 1080);

/// Keys that stop the frame loop (ESC, 'q')
pub const QUIT_KEYS: [i32; 2] = [27, b'q' as i32];

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
