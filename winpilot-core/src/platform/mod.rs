//! OS seam for the three leaf components.
//!
//! The input emitter, window registry and capture service never call the OS
//! directly; they go through these object-safe traits.  On Windows,
//! [`native`] returns the Win32 implementation.  Tests run the same
//! component logic against a recording fake.

use std::sync::Arc;
use std::time::Duration;

use crate::capture::{DisplayBounds, Frame};
use crate::errors::Result;
use crate::input::{ButtonAction, MouseButton, Point, WheelAxis};
use crate::keys::VirtualKey;
use crate::window::{Rect, ShowCommand, WindowHandle};

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fake;

/// Raw input events, one OS event (or one atomic batch) per call.
pub trait InputDevice: Send + Sync {
    fn key_down(&self, key: VirtualKey) -> Result<()>;

    fn key_up(&self, key: VirtualKey) -> Result<()>;

    /// Inject a character directly, bypassing virtual-key mapping.
    fn unicode_char(&self, ch: char) -> Result<()>;

    /// Point-in-time physical key state.
    fn is_key_down(&self, key: VirtualKey) -> bool;

    /// Absolute cursor placement in screen pixels.
    fn move_cursor(&self, x: i32, y: i32) -> Result<()>;

    fn cursor_position(&self) -> Result<Point>;

    fn button(&self, button: MouseButton, action: ButtonAction) -> Result<()>;

    /// Wheel event with a raw delta (120 = one notch).
    fn wheel(&self, axis: WheelAxis, delta: i32) -> Result<()>;
}

/// Live queries and state requests against top-level windows.  Nothing is
/// cached; every call reflects the OS at that moment.
pub trait WindowSystem: Send + Sync {
    /// All top-level windows in z-order.
    fn enumerate(&self) -> Result<Vec<WindowHandle>>;

    fn title(&self, handle: WindowHandle) -> String;

    fn is_visible(&self, handle: WindowHandle) -> bool;

    fn is_minimized(&self, handle: WindowHandle) -> bool;

    /// `None` when the OS cannot report a rectangle (e.g. stale handle).
    fn rect(&self, handle: WindowHandle) -> Option<Rect>;

    fn process_id(&self, handle: WindowHandle) -> u32;

    /// `None` when the process cannot be resolved (exited, access denied).
    fn process_name(&self, pid: u32) -> Option<String>;

    /// Usable work area of the display containing the window.
    fn work_area(&self, handle: WindowHandle) -> Option<Rect>;

    fn foreground(&self) -> Option<WindowHandle>;

    /// Whether the OS granted foreground status.
    fn set_foreground(&self, handle: WindowHandle) -> bool;

    /// OS acknowledgement of a show-state request.
    fn show(&self, handle: WindowHandle, command: ShowCommand) -> bool;
}

/// Pixel sources.  Frames come back as top-down BGRA rows.
pub trait ScreenSource: Send + Sync {
    /// Displays in OS enumeration order.
    fn displays(&self) -> Result<Vec<DisplayBounds>>;

    /// Pixel copy of a screen rectangle.
    fn grab_region(&self, region: Rect) -> Result<Frame>;

    /// Whole-window composition capture, independent of occlusion.
    fn grab_window(&self, handle: WindowHandle, width: u32, height: u32) -> Result<Frame>;
}

/// Every settle delay goes through here.
pub trait Pacer: Send + Sync {
    fn pause(&self, duration: Duration);
}

/// Production pacer: blocks the calling thread only.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// The bundle of OS handles the components are built from.
#[derive(Clone)]
pub struct Platform {
    pub input: Arc<dyn InputDevice>,
    pub windows: Arc<dyn WindowSystem>,
    pub screen: Arc<dyn ScreenSource>,
    pub pacer: Arc<dyn Pacer>,
}

/// Build the platform bundle for the running OS.
pub fn native() -> Result<Platform> {
    #[cfg(windows)]
    {
        Ok(win32::platform())
    }

    #[cfg(not(windows))]
    {
        Err(crate::errors::AutomationError::Platform(
            "desktop automation is only supported on Windows".into(),
        ))
    }
}
