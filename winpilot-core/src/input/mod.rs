//! Virtual input emitter: synthesized keyboard and mouse input.
//!
//! [`Keyboard`] and [`Mouse`] sequence raw [`InputDevice`] events with the
//! settle delays from [`Timings`].  Events are fire-and-forget from the OS's
//! perspective: nothing here retries or verifies delivery.
//!
//! [`InputDevice`]: crate::platform::InputDevice
//! [`Timings`]: crate::config::Timings

mod keyboard;
mod mouse;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AutomationError;

pub use keyboard::Keyboard;
pub use mouse::Mouse;

/// One wheel notch in platform units.
pub const WHEEL_DELTA: i32 = 120;

/// Cursor position in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl FromStr for MouseButton {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            _ => Err(AutomationError::argument(format!("Unknown mouse button: {s}"))),
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MouseButton::Left => "Left",
            MouseButton::Right => "Right",
            MouseButton::Middle => "Middle",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelAxis {
    Vertical,
    Horizontal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_parsing() {
        assert_eq!("LEFT".parse::<MouseButton>().unwrap(), MouseButton::Left);
        assert_eq!("right".parse::<MouseButton>().unwrap(), MouseButton::Right);
        assert_eq!("Middle".parse::<MouseButton>().unwrap(), MouseButton::Middle);
        let err = "x1".parse::<MouseButton>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown mouse button: x1");
    }
}
