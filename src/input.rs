//! Pointer input injection.
//!
//! [`InputSink`] is the boundary to the operating system. The X11
//! implementation warps the pointer for moves and uses the XTEST extension
//! to fake button and wheel events. [`LoggingSink`] only logs, for dry runs.

use crate::{
    constants::MAX_WHEEL_STEPS,
    error::{AppError, Result},
    geometry::f64_to_i32_clamp,
    pointer::{MouseButton, PointerCommand},
};
use log::{debug, info};
use x11rb::{
    connection::{Connection, RequestConnection},
    protocol::{
        xproto::{ConnectionExt as _, Screen, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT},
        xtest::{self, ConnectionExt as _},
    },
    rust_connection::RustConnection,
};

/// Operating-system pointer input
pub trait InputSink {
    /// Move the cursor to absolute screen pixels
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    fn button_down(&mut self, button: MouseButton) -> Result<()>;

    fn button_up(&mut self, button: MouseButton) -> Result<()>;

    /// Vertical wheel steps, positive scrolls up
    fn scroll(&mut self, amount: i32) -> Result<()>;

    /// Horizontal wheel steps, positive scrolls right
    fn horizontal_scroll(&mut self, amount: i32) -> Result<()>;

    /// Screen size in pixels
    fn screen_size(&self) -> (u32, u32);

    fn click(&mut self) -> Result<()> {
        self.button_down(MouseButton::Left)?;
        self.button_up(MouseButton::Left)
    }

    fn right_click(&mut self) -> Result<()> {
        self.button_down(MouseButton::Right)?;
        self.button_up(MouseButton::Right)
    }
}

/// Issue a frame's commands to a sink, in order
///
/// Move targets are rounded and clamped to the screen.
pub fn dispatch<S: InputSink + ?Sized>(sink: &mut S, commands: &[PointerCommand]) -> Result<()> {
    for command in commands {
        match *command {
            PointerCommand::MoveTo(target) => {
                let (width, height) = sink.screen_size();
                let max_x = i32::try_from(width.saturating_sub(1)).unwrap_or(i32::MAX);
                let max_y = i32::try_from(height.saturating_sub(1)).unwrap_or(i32::MAX);
                sink.move_to(f64_to_i32_clamp(target.x, 0, max_x), f64_to_i32_clamp(target.y, 0, max_y))?;
            }
            PointerCommand::Click => sink.click()?,
            PointerCommand::RightClick => sink.right_click()?,
            PointerCommand::ButtonDown(button) => sink.button_down(button)?,
            PointerCommand::ButtonUp(button) => sink.button_up(button)?,
            PointerCommand::Scroll(amount) => sink.scroll(amount)?,
            PointerCommand::HorizontalScroll(amount) => sink.horizontal_scroll(amount)?,
        }
    }
    Ok(())
}

/// X11 core button numbers
const fn x11_button(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
    }
}

const WHEEL_UP: u8 = 4;
const WHEEL_DOWN: u8 = 5;
const WHEEL_LEFT: u8 = 6;
const WHEEL_RIGHT: u8 = 7;

/// Pointer control through X11 and XTEST
pub struct X11InputSink {
    connection: RustConnection,
    screen: Screen,
    screen_width: u16,
    screen_height: u16,
}

impl X11InputSink {
    /// Connect to the X server and check for the XTEST extension
    pub fn new() -> Result<Self> {
        info!("Initializing X11 input sink");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| AppError::X11(format!("Failed to connect to X11: {e}")))?;

        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| AppError::X11("Failed to get screen".to_string()))?
            .clone();

        connection
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(|e| AppError::X11(format!("Failed to query XTEST: {e}")))?
            .ok_or_else(|| AppError::X11("XTEST extension not available".to_string()))?;

        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;

        info!("Connected to X11 display, screen: {}x{}", screen_width, screen_height);

        Ok(Self {
            connection,
            screen,
            screen_width,
            screen_height,
        })
    }

    fn fake_button(&self, event_type: u8, detail: u8) -> Result<()> {
        self.connection
            .xtest_fake_input(event_type, detail, x11rb::CURRENT_TIME, self.screen.root, 0, 0, 0)
            .map_err(|e| AppError::InputInjection(format!("Failed to fake button {detail}: {e}")))?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.connection
            .flush()
            .map_err(|e| AppError::InputInjection(format!("Failed to flush connection: {e}")))
    }

    /// Press and release a wheel button `amount` times
    fn wheel(&self, positive: u8, negative: u8, amount: i32) -> Result<()> {
        let detail = if amount > 0 { positive } else { negative };
        let steps = amount.unsigned_abs().min(MAX_WHEEL_STEPS);
        for _ in 0..steps {
            self.fake_button(BUTTON_PRESS_EVENT, detail)?;
            self.fake_button(BUTTON_RELEASE_EVENT, detail)?;
        }
        self.flush()
    }
}

impl InputSink for X11InputSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let x = i16::try_from(x).unwrap_or(i16::MAX);
        let y = i16::try_from(y).unwrap_or(i16::MAX);

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| AppError::InputInjection(format!("Failed to warp pointer: {e}")))?;

        self.flush()
    }

    fn button_down(&mut self, button: MouseButton) -> Result<()> {
        debug!("Button down: {:?}", button);
        self.fake_button(BUTTON_PRESS_EVENT, x11_button(button))?;
        self.flush()
    }

    fn button_up(&mut self, button: MouseButton) -> Result<()> {
        debug!("Button up: {:?}", button);
        self.fake_button(BUTTON_RELEASE_EVENT, x11_button(button))?;
        self.flush()
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        self.wheel(WHEEL_UP, WHEEL_DOWN, amount)
    }

    fn horizontal_scroll(&mut self, amount: i32) -> Result<()> {
        self.wheel(WHEEL_RIGHT, WHEEL_LEFT, amount)
    }

    fn screen_size(&self) -> (u32, u32) {
        (u32::from(self.screen_width), u32::from(self.screen_height))
    }
}

/// Sink that logs commands instead of injecting them
#[derive(Debug, Clone)]
pub struct LoggingSink {
    screen_width: u32,
    screen_height: u32,
}

impl LoggingSink {
    pub const fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width,
            screen_height,
        }
    }
}

impl InputSink for LoggingSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        debug!("[dry-run] move to ({x}, {y})");
        Ok(())
    }

    fn button_down(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry-run] {button:?} button down");
        Ok(())
    }

    fn button_up(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry-run] {button:?} button up");
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        info!("[dry-run] scroll {amount}");
        Ok(())
    }

    fn horizontal_scroll(&mut self, amount: i32) -> Result<()> {
        info!("[dry-run] horizontal scroll {amount}");
        Ok(())
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ScreenPoint;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl InputSink for Recorder {
        fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
            self.events.push(format!("move {x} {y}"));
            Ok(())
        }
        fn button_down(&mut self, button: MouseButton) -> Result<()> {
            self.events.push(format!("down {button:?}"));
            Ok(())
        }
        fn button_up(&mut self, button: MouseButton) -> Result<()> {
            self.events.push(format!("up {button:?}"));
            Ok(())
        }
        fn scroll(&mut self, amount: i32) -> Result<()> {
            self.events.push(format!("scroll {amount}"));
            Ok(())
        }
        fn horizontal_scroll(&mut self, amount: i32) -> Result<()> {
            self.events.push(format!("hscroll {amount}"));
            Ok(())
        }
        fn screen_size(&self) -> (u32, u32) {
            (800, 600)
        }
    }

    #[test]
    #[ignore] // Requires X11 display with XTEST
    fn test_x11_sink_creation() {
        let sink = X11InputSink::new().unwrap();
        let (width, height) = sink.screen_size();
        assert!(width > 0 && height > 0);
    }

    #[test]
    fn test_dispatch_order_and_clamping() {
        let mut sink = Recorder::default();
        dispatch(
            &mut sink,
            &[
                PointerCommand::MoveTo(ScreenPoint::new(-20.0, 1000.0)),
                PointerCommand::Click,
                PointerCommand::RightClick,
                PointerCommand::Scroll(-3),
                PointerCommand::HorizontalScroll(2),
            ],
        )
        .unwrap();
        assert_eq!(
            sink.events,
            vec![
                "move 0 599",
                "down Left",
                "up Left",
                "down Right",
                "up Right",
                "scroll -3",
                "hscroll 2",
            ]
        );
    }

    #[test]
    fn test_x11_button_numbers() {
        assert_eq!(x11_button(MouseButton::Left), 1);
        assert_eq!(x11_button(MouseButton::Middle), 2);
        assert_eq!(x11_button(MouseButton::Right), 3);
    }

    #[test]
    fn test_logging_sink() {
        let mut sink = LoggingSink::new(1920, 1080);
        assert_eq!(sink.screen_size(), (1920, 1080));
        assert!(dispatch(&mut sink, &[PointerCommand::ButtonDown(MouseButton::Left)]).is_ok());
    }
}
