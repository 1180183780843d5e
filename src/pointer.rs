//! Pointer control state machine.
//!
//! [`PointerController::update`] is called once per camera frame with the
//! frame's landmarks (or `None` when no hand is visible). It reads the
//! gesture predicates and timers, mutates the [`PointerState`] it is given
//! and returns the input commands to inject for that frame.
//!
//! Rules are evaluated in a fixed order: right-click, scroll, left-click,
//! drag, cursor movement. A scrolling frame stops after the scroll rule, so
//! it never moves the cursor or clicks. Neither click fires while a fist
//! holds the left button. A frame without a hand releases any held button
//! and pauses the pointer.

use crate::{
    calibration::ScreenMapper,
    constants::{
        DEFAULT_CLICK_COOLDOWN_S, DEFAULT_DRAG_HOLD_S, DEFAULT_RIGHT_CLICK_COOLDOWN_S, DEFAULT_SCROLL_SENSITIVITY,
    },
    geometry::{f64_to_i32_clamp, ScreenPoint},
    gesture::{GestureClassifier, GesturePredicates},
    landmarks::{HandJoint, LandmarkFrame},
    smoother::MotionSmoother,
};
use log::debug;
use nalgebra::Point2;
use std::{
    ops::ControlFlow,
    time::{Duration, Instant},
};

/// Mouse button addressed by press/release commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// One input action for the OS input sink
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerCommand {
    /// Move the cursor to absolute screen pixels
    MoveTo(ScreenPoint),
    /// Left click
    Click,
    /// Right click
    RightClick,
    /// Press and hold a button
    ButtonDown(MouseButton),
    /// Release a held button
    ButtonUp(MouseButton),
    /// Vertical wheel, positive scrolls up
    Scroll(i32),
    /// Horizontal wheel, positive scrolls right
    HorizontalScroll(i32),
}

/// Observable controller phase, for display and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Idle,
    PinchArmed,
    Selecting,
    Dragging,
    Scrolling,
    Paused,
}

impl PointerPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PinchArmed => "pinch",
            Self::Selecting => "selecting",
            Self::Dragging => "dragging",
            Self::Scrolling => "scrolling",
            Self::Paused => "paused",
        }
    }
}

/// Left-button hold lifecycle driven by the fist gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grip {
    Released,
    Selecting { since: Instant },
    Dragging,
}

/// Cross-frame pointer memory
#[derive(Debug, Clone, PartialEq)]
pub struct PointerState {
    cursor: ScreenPoint,
    last_click: Option<Instant>,
    last_right_click: Option<Instant>,
    pinch_latched: bool,
    grip: Grip,
    scroll_anchor: Option<Point2<f64>>,
    paused: bool,
}

impl PointerState {
    /// Fresh state with the cursor at the screen center
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self::with_cursor(ScreenPoint::new(
            f64::from(screen_width) / 2.0,
            f64::from(screen_height) / 2.0,
        ))
    }

    /// Fresh state with the cursor at a given position
    pub const fn with_cursor(cursor: ScreenPoint) -> Self {
        Self {
            cursor,
            last_click: None,
            last_right_click: None,
            pinch_latched: false,
            grip: Grip::Released,
            scroll_anchor: None,
            paused: false,
        }
    }

    /// Last smoothed cursor position
    pub const fn cursor(&self) -> ScreenPoint {
        self.cursor
    }

    pub const fn last_click(&self) -> Option<Instant> {
        self.last_click
    }

    pub const fn last_right_click(&self) -> Option<Instant> {
        self.last_right_click
    }

    pub const fn is_pinch_latched(&self) -> bool {
        self.pinch_latched
    }

    /// True while the left button is held by a fist, including while dragging
    pub const fn is_selecting(&self) -> bool {
        !matches!(self.grip, Grip::Released)
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.grip, Grip::Dragging)
    }

    /// When the current selection started, before promotion to a drag
    pub const fn drag_started_at(&self) -> Option<Instant> {
        match self.grip {
            Grip::Selecting { since } => Some(since),
            _ => None,
        }
    }

    /// Index-tip pixel position recorded by the last scrolling frame
    pub const fn scroll_anchor(&self) -> Option<Point2<f64>> {
        self.scroll_anchor
    }

    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    pub const fn phase(&self) -> PointerPhase {
        if self.paused {
            PointerPhase::Paused
        } else if self.is_dragging() {
            PointerPhase::Dragging
        } else if self.is_selecting() {
            PointerPhase::Selecting
        } else if self.scroll_anchor.is_some() {
            PointerPhase::Scrolling
        } else if self.pinch_latched {
            PointerPhase::PinchArmed
        } else {
            PointerPhase::Idle
        }
    }
}

/// Release a button held by a selection or drag
///
/// Returns the release command, if any, and leaves the grip released. Used
/// when the hand disappears and on every shutdown path.
pub fn release_held(state: &mut PointerState) -> Vec<PointerCommand> {
    if state.is_selecting() {
        state.grip = Grip::Released;
        debug!("Releasing held left button");
        vec![PointerCommand::ButtonUp(MouseButton::Left)]
    } else {
        Vec::new()
    }
}

/// Timing and landmark choices for the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSettings {
    /// Joint that drives the cursor normally
    pub cursor_joint: HandJoint,
    /// Joint that drives the cursor while dragging
    pub drag_joint: HandJoint,
    pub click_cooldown: Duration,
    pub right_click_cooldown: Duration,
    /// Fist hold time before a selection becomes a drag
    pub drag_hold: Duration,
    /// Scroll units per pixel of index-tip movement
    pub scroll_sensitivity: f64,
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            cursor_joint: HandJoint::IndexTip,
            drag_joint: HandJoint::MiddleBase,
            click_cooldown: Duration::from_secs_f64(DEFAULT_CLICK_COOLDOWN_S),
            right_click_cooldown: Duration::from_secs_f64(DEFAULT_RIGHT_CLICK_COOLDOWN_S),
            drag_hold: Duration::from_secs_f64(DEFAULT_DRAG_HOLD_S),
            scroll_sensitivity: DEFAULT_SCROLL_SENSITIVITY,
        }
    }
}

/// Per-frame gesture-to-pointer controller
pub struct PointerController {
    classifier: GestureClassifier,
    mapper: Box<dyn ScreenMapper>,
    smoother: MotionSmoother,
    settings: PointerSettings,
}

impl PointerController {
    pub fn new(
        classifier: GestureClassifier,
        mapper: Box<dyn ScreenMapper>,
        smoother: MotionSmoother,
        settings: PointerSettings,
    ) -> Self {
        Self {
            classifier,
            mapper,
            smoother,
            settings,
        }
    }

    /// Advance the state machine by one frame
    pub fn update(&self, state: &mut PointerState, frame: Option<&LandmarkFrame>, now: Instant) -> Vec<PointerCommand> {
        let Some(frame) = frame else {
            return Self::pause(state);
        };
        if state.paused {
            debug!("Hand detected, resuming");
            state.paused = false;
        }

        let predicates = self.classifier.classify(frame);
        let mut commands = Vec::new();

        self.right_click(state, &predicates, now, &mut commands);
        if self.scroll(state, frame, &predicates, &mut commands).is_break() {
            return commands;
        }
        self.left_click(state, &predicates, now, &mut commands);
        self.drag(state, &predicates, now, &mut commands);
        self.move_cursor(state, frame, &mut commands);

        commands
    }

    fn pause(state: &mut PointerState) -> Vec<PointerCommand> {
        let commands = release_held(state);
        if !state.paused {
            debug!("No hand detected, pausing");
        }
        *state = PointerState {
            paused: true,
            ..PointerState::with_cursor(state.cursor)
        };
        commands
    }

    fn right_click(
        &self,
        state: &mut PointerState,
        predicates: &GesturePredicates,
        now: Instant,
        commands: &mut Vec<PointerCommand>,
    ) {
        if predicates.is_three_finger_pinch
            && !holds_left(state, predicates)
            && cooled_down(state.last_right_click, self.settings.right_click_cooldown, now)
        {
            debug!("Right click");
            commands.push(PointerCommand::RightClick);
            state.last_right_click = Some(now);
        }
    }

    /// Scroll with the two-finger pose; breaks when the frame was a scroll
    fn scroll(
        &self,
        state: &mut PointerState,
        frame: &LandmarkFrame,
        predicates: &GesturePredicates,
        commands: &mut Vec<PointerCommand>,
    ) -> ControlFlow<()> {
        if !predicates.is_two_finger_up {
            state.scroll_anchor = None;
            return ControlFlow::Continue(());
        }

        let tip = frame.pixel(HandJoint::IndexTip);
        if let Some(anchor) = state.scroll_anchor {
            let dx = tip.x - anchor.x;
            let dy = tip.y - anchor.y;
            let sensitivity = self.settings.scroll_sensitivity;
            let command = if dx.abs() > dy.abs() {
                PointerCommand::HorizontalScroll(f64_to_i32_clamp(dx * sensitivity, i32::MIN, i32::MAX))
            } else {
                // Image y grows downward; raising the hand scrolls up
                PointerCommand::Scroll(f64_to_i32_clamp(-dy * sensitivity, i32::MIN, i32::MAX))
            };
            debug!("{:?}", command);
            commands.push(command);
        }
        state.scroll_anchor = Some(tip);

        ControlFlow::Break(())
    }

    fn left_click(
        &self,
        state: &mut PointerState,
        predicates: &GesturePredicates,
        now: Instant,
        commands: &mut Vec<PointerCommand>,
    ) {
        if !predicates.is_pinching {
            state.pinch_latched = false;
            return;
        }
        // A pinch made inside a grip is absorbed, not clicked on release
        if holds_left(state, predicates) {
            state.pinch_latched = true;
            return;
        }

        if !state.pinch_latched && cooled_down(state.last_click, self.settings.click_cooldown, now) {
            debug!("Click at ({:.0}, {:.0})", state.cursor.x, state.cursor.y);
            commands.push(PointerCommand::Click);
            state.pinch_latched = true;
            state.last_click = Some(now);
        }
    }

    fn drag(
        &self,
        state: &mut PointerState,
        predicates: &GesturePredicates,
        now: Instant,
        commands: &mut Vec<PointerCommand>,
    ) {
        match state.grip {
            Grip::Released if predicates.is_fist => {
                debug!("Fist: selecting");
                commands.push(PointerCommand::ButtonDown(MouseButton::Left));
                state.grip = Grip::Selecting { since: now };
            }
            Grip::Selecting { since } if predicates.is_fist => {
                if now.saturating_duration_since(since) >= self.settings.drag_hold {
                    debug!("Fist held: dragging");
                    state.grip = Grip::Dragging;
                }
            }
            Grip::Selecting { .. } => {
                debug!("Fist released before drag");
                commands.push(PointerCommand::ButtonUp(MouseButton::Left));
                state.grip = Grip::Released;
            }
            Grip::Dragging if predicates.is_open_palm => {
                debug!("Open palm: drop");
                commands.push(PointerCommand::ButtonUp(MouseButton::Left));
                state.grip = Grip::Released;
            }
            Grip::Released | Grip::Dragging => {}
        }
    }

    fn move_cursor(&self, state: &mut PointerState, frame: &LandmarkFrame, commands: &mut Vec<PointerCommand>) {
        let joint = if state.is_dragging() {
            self.settings.drag_joint
        } else {
            self.settings.cursor_joint
        };
        let target = self.mapper.map(frame.point(joint), frame.width(), frame.height());
        let smoothed = self.smoother.smooth(state.cursor, target);
        commands.push(PointerCommand::MoveTo(smoothed));
        state.cursor = smoothed;
    }
}

/// The left button is, or is about to be, held by a fist
const fn holds_left(state: &PointerState, predicates: &GesturePredicates) -> bool {
    predicates.is_fist || state.is_selecting()
}

fn cooled_down(last: Option<Instant>, cooldown: Duration, now: Instant) -> bool {
    last.map_or(true, |last| now.saturating_duration_since(last) >= cooldown)
}
