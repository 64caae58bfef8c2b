//! Win32 backend: `SendInput` for input, `user32` for windows, GDI for
//! capture.

mod input;
mod screen;
mod window;

use std::sync::Arc;

pub use input::Win32Input;
pub use screen::GdiScreen;
pub use window::Win32Windows;

use super::{Platform, ThreadPacer};

pub fn platform() -> Platform {
    Platform {
        input: Arc::new(Win32Input),
        windows: Arc::new(Win32Windows::default()),
        screen: Arc::new(GdiScreen),
        pacer: Arc::new(ThreadPacer),
    }
}
