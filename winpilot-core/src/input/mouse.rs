use std::sync::Arc;

use super::{ButtonAction, MouseButton, Point, WheelAxis, WHEEL_DELTA};
use crate::config::Timings;
use crate::errors::Result;
use crate::platform::{InputDevice, Pacer};

/// Mouse half of the input emitter.
#[derive(Clone)]
pub struct Mouse {
    device: Arc<dyn InputDevice>,
    pacer: Arc<dyn Pacer>,
    timings: Timings,
}

impl Mouse {
    pub fn new(device: Arc<dyn InputDevice>, pacer: Arc<dyn Pacer>, timings: Timings) -> Self {
        Self {
            device,
            pacer,
            timings,
        }
    }

    pub fn move_to(&self, x: i32, y: i32) -> Result<()> {
        log::debug!("move_to: ({x}, {y})");
        self.device.move_cursor(x, y)
    }

    pub fn position(&self) -> Result<Point> {
        self.device.cursor_position()
    }

    /// `clicks` press/release pairs at the current cursor position.
    pub fn click(&self, button: MouseButton, clicks: u32) -> Result<()> {
        for i in 0..clicks {
            self.device.button(button, ButtonAction::Press)?;
            self.pacer.pause(self.timings.button_gap);
            self.device.button(button, ButtonAction::Release)?;

            if i + 1 < clicks {
                self.pacer.pause(self.timings.click_gap);
            }
        }
        Ok(())
    }

    pub fn click_at(&self, x: i32, y: i32, button: MouseButton, clicks: u32) -> Result<()> {
        log::debug!("click_at: {button} x{clicks} at ({x}, {y})");
        self.move_to(x, y)?;
        self.pacer.pause(self.timings.cursor_settle);
        self.click(button, clicks)
    }

    /// One continuous press-move-release gesture.
    pub fn drag(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        button: MouseButton,
    ) -> Result<()> {
        log::debug!("drag: {button} ({start_x}, {start_y}) -> ({end_x}, {end_y})");
        self.move_to(start_x, start_y)?;
        self.pacer.pause(self.timings.cursor_settle);

        self.device.button(button, ButtonAction::Press)?;
        self.pacer.pause(self.timings.drag_settle);

        let moved = self.move_to(end_x, end_y);
        self.pacer.pause(self.timings.drag_settle);

        // Release even if the move failed so the button is never left down.
        let released = self.device.button(button, ButtonAction::Release);
        moved.and(released)
    }

    /// Move to `(x, y)` then emit a vertical wheel event with a raw delta.
    pub fn scroll(&self, x: i32, y: i32, delta: i32) -> Result<()> {
        self.move_to(x, y)?;
        self.pacer.pause(self.timings.cursor_settle);
        self.device.wheel(WheelAxis::Vertical, delta)
    }

    /// Scroll `notches` vertically (positive = up).  Missing coordinates
    /// default to the current cursor position.
    pub fn scroll_vertical(&self, notches: i32, x: Option<i32>, y: Option<i32>) -> Result<()> {
        let at = self.resolve_point(x, y)?;
        self.scroll(at.x, at.y, notches.saturating_mul(WHEEL_DELTA))
    }

    /// Scroll `notches` horizontally (positive = right).
    pub fn scroll_horizontal(&self, notches: i32, x: Option<i32>, y: Option<i32>) -> Result<()> {
        let at = self.resolve_point(x, y)?;
        self.move_to(at.x, at.y)?;
        self.pacer.pause(self.timings.cursor_settle);
        self.device
            .wheel(WheelAxis::Horizontal, notches.saturating_mul(WHEEL_DELTA))
    }

    fn resolve_point(&self, x: Option<i32>, y: Option<i32>) -> Result<Point> {
        match (x, y) {
            (Some(x), Some(y)) => Ok(Point::new(x, y)),
            _ => {
                let current = self.position()?;
                Ok(Point::new(x.unwrap_or(current.x), y.unwrap_or(current.y)))
            }
        }
    }
}
