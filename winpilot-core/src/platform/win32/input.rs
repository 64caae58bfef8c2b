//! Keyboard and mouse injection via Win32 `SendInput`.
//!
//! One [`InputDevice`] call maps to one `SendInput` batch.  Sequencing and
//! settle delays live above this layer in [`crate::input`].

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE, MOUSEEVENTF_ABSOLUTE,
    MOUSEEVENTF_HWHEEL, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN,
    MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP,
    MOUSEEVENTF_VIRTUALDESK, MOUSEEVENTF_WHEEL, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

use crate::errors::{AutomationError, Result};
use crate::input::{ButtonAction, MouseButton, Point, WheelAxis};
use crate::keys::VirtualKey;
use crate::platform::InputDevice;

/// Pre-computed size of `INPUT` struct for `SendInput` calls.
const INPUT_SIZE: i32 = std::mem::size_of::<INPUT>() as i32;

/// Flags for absolute mouse positioning on the virtual desktop.
const ABSOLUTE_MOVE: MOUSE_EVENT_FLAGS =
    MOUSE_EVENT_FLAGS(MOUSEEVENTF_ABSOLUTE.0 | MOUSEEVENTF_MOVE.0 | MOUSEEVENTF_VIRTUALDESK.0);

#[derive(Debug, Default)]
pub struct Win32Input;

/// Virtual screen origin and size, covering all monitors.  The origin is
/// negative when a monitor sits left of or above the primary.
fn screen_geometry() -> (i32, i32, i32, i32) {
    unsafe {
        let x = GetSystemMetrics(SM_XVIRTUALSCREEN);
        let y = GetSystemMetrics(SM_YVIRTUALSCREEN);
        let w = GetSystemMetrics(SM_CXVIRTUALSCREEN);
        let h = GetSystemMetrics(SM_CYVIRTUALSCREEN);
        // GetSystemMetrics returns 0 on failure
        if w > 0 && h > 0 {
            (x, y, w, h)
        } else {
            (0, 0, 1920, 1080)
        }
    }
}

/// Pixel coordinates to the 0..=65535 space `MOUSEEVENTF_ABSOLUTE` expects:
/// `((pixel - origin) * 65535) / (size - 1)`, clamped.
fn normalise_coords(x: i32, y: i32) -> (i32, i32) {
    let (origin_x, origin_y, screen_w, screen_h) = screen_geometry();

    if screen_w <= 1 || screen_h <= 1 {
        return (0, 0);
    }

    let abs_x = ((i64::from(x - origin_x) * 65535) / (i64::from(screen_w) - 1)).clamp(0, 65535);
    let abs_y = ((i64::from(y - origin_y) * 65535) / (i64::from(screen_h) - 1)).clamp(0, 65535);
    (abs_x as i32, abs_y as i32)
}

fn keyboard_input(vk: u16, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn mouse_input(dx: i32, dy: i32, data: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                // Signed for WHEEL/HWHEEL; `as u32` keeps the bit pattern.
                mouseData: data as u32,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Inject a batch and fail unless every event was accepted.
fn send(inputs: &[INPUT], what: &str) -> Result<()> {
    let sent = unsafe { SendInput(inputs, INPUT_SIZE) };
    if sent as usize == inputs.len() {
        Ok(())
    } else {
        Err(AutomationError::Platform(format!(
            "SendInput accepted {sent} of {} events for {what}",
            inputs.len()
        )))
    }
}

fn button_flag(button: MouseButton, action: ButtonAction) -> MOUSE_EVENT_FLAGS {
    match (button, action) {
        (MouseButton::Left, ButtonAction::Press) => MOUSEEVENTF_LEFTDOWN,
        (MouseButton::Left, ButtonAction::Release) => MOUSEEVENTF_LEFTUP,
        (MouseButton::Right, ButtonAction::Press) => MOUSEEVENTF_RIGHTDOWN,
        (MouseButton::Right, ButtonAction::Release) => MOUSEEVENTF_RIGHTUP,
        (MouseButton::Middle, ButtonAction::Press) => MOUSEEVENTF_MIDDLEDOWN,
        (MouseButton::Middle, ButtonAction::Release) => MOUSEEVENTF_MIDDLEUP,
    }
}

impl InputDevice for Win32Input {
    fn key_down(&self, key: VirtualKey) -> Result<()> {
        send(&[keyboard_input(key.code(), 0, KEYBD_EVENT_FLAGS(0))], "key down")
    }

    fn key_up(&self, key: VirtualKey) -> Result<()> {
        send(&[keyboard_input(key.code(), 0, KEYEVENTF_KEYUP)], "key up")
    }

    fn unicode_char(&self, ch: char) -> Result<()> {
        // Characters outside the BMP are a surrogate pair; both halves go
        // down, then both come up, in one batch.
        let mut units = [0u16; 2];
        let units = ch.encode_utf16(&mut units);

        let mut inputs: Vec<INPUT> = Vec::with_capacity(units.len() * 2);
        for &unit in units.iter() {
            inputs.push(keyboard_input(0, unit, KEYEVENTF_UNICODE));
        }
        for &unit in units.iter() {
            inputs.push(keyboard_input(0, unit, KEYEVENTF_UNICODE | KEYEVENTF_KEYUP));
        }
        send(&inputs, "unicode character")
    }

    fn is_key_down(&self, key: VirtualKey) -> bool {
        // High bit set = currently down.
        let state = unsafe { GetAsyncKeyState(i32::from(key.code())) };
        state < 0
    }

    fn move_cursor(&self, x: i32, y: i32) -> Result<()> {
        let (abs_x, abs_y) = normalise_coords(x, y);
        send(&[mouse_input(abs_x, abs_y, 0, ABSOLUTE_MOVE)], "cursor move")
    }

    fn cursor_position(&self) -> Result<Point> {
        let mut pt = POINT::default();
        unsafe { GetCursorPos(&mut pt)? };
        Ok(Point::new(pt.x, pt.y))
    }

    fn button(&self, button: MouseButton, action: ButtonAction) -> Result<()> {
        send(&[mouse_input(0, 0, 0, button_flag(button, action))], "mouse button")
    }

    fn wheel(&self, axis: WheelAxis, delta: i32) -> Result<()> {
        let flag = match axis {
            WheelAxis::Vertical => MOUSEEVENTF_WHEEL,
            WheelAxis::Horizontal => MOUSEEVENTF_HWHEEL,
        };
        send(&[mouse_input(0, 0, delta, flag)], "mouse wheel")
    }
}
