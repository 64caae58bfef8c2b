//! Window enumeration and management via Win32 API.
//!
//! Everything is a live query keyed by `HWND`; nothing is cached except the
//! `sysinfo::System` used for process names.

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use parking_lot::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromWindow, MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetForegroundWindow, GetWindowRect, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsIconic, IsWindowVisible, SetForegroundWindow, ShowWindow,
    SHOW_WINDOW_CMD, SW_HIDE, SW_RESTORE, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED, SW_SHOWNORMAL,
};

use crate::errors::Result;
use crate::platform::WindowSystem;
use crate::window::{strip_exe_suffix, Rect, ShowCommand, WindowHandle};

pub struct Win32Windows {
    processes: Mutex<System>,
}

impl Default for Win32Windows {
    fn default() -> Self {
        Self {
            processes: Mutex::new(System::new()),
        }
    }
}

pub(super) fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut core::ffi::c_void)
}

pub(super) fn rect_from(raw: &RECT) -> Rect {
    Rect::from_edges(raw.left, raw.top, raw.right, raw.bottom)
}

fn read_window_title(hwnd: HWND) -> String {
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u16; (len + 1) as usize];
    let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
    if copied <= 0 {
        return String::new();
    }
    OsString::from_wide(&buf[..copied as usize])
        .to_string_lossy()
        .into_owned()
}

/// Collects every top-level handle; filtering happens in the registry.
unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<HWND>) };
    handles.push(hwnd);
    TRUE // continue enumeration
}

fn show_cmd(command: ShowCommand) -> SHOW_WINDOW_CMD {
    match command {
        ShowCommand::Minimize => SW_SHOWMINIMIZED,
        ShowCommand::Maximize => SW_SHOWMAXIMIZED,
        ShowCommand::Restore => SW_RESTORE,
        ShowCommand::Hide => SW_HIDE,
        ShowCommand::Show => SW_SHOWNORMAL,
    }
}

impl WindowSystem for Win32Windows {
    fn enumerate(&self) -> Result<Vec<WindowHandle>> {
        let mut handles: Vec<HWND> = Vec::with_capacity(256);
        unsafe {
            EnumWindows(
                Some(enum_callback),
                LPARAM(&mut handles as *mut Vec<HWND> as isize),
            )?;
        }
        Ok(handles.iter().map(|h| WindowHandle(h.0 as isize)).collect())
    }

    fn title(&self, handle: WindowHandle) -> String {
        read_window_title(hwnd(handle))
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        unsafe { IsWindowVisible(hwnd(handle)) }.as_bool()
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        unsafe { IsIconic(hwnd(handle)) }.as_bool()
    }

    fn rect(&self, handle: WindowHandle) -> Option<Rect> {
        let mut raw = RECT::default();
        unsafe { GetWindowRect(hwnd(handle), &mut raw) }.ok()?;
        Some(rect_from(&raw))
    }

    fn process_id(&self, handle: WindowHandle) -> u32 {
        let mut pid: u32 = 0;
        unsafe { GetWindowThreadProcessId(hwnd(handle), Some(&mut pid)) };
        pid
    }

    /// Executable name without the `.exe` suffix.
    fn process_name(&self, pid: u32) -> Option<String> {
        if pid == 0 {
            return None;
        }
        let pid = Pid::from_u32(pid);
        let mut sys = self.processes.lock();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        let name = sys.process(pid)?.name().to_string_lossy();
        Some(strip_exe_suffix(&name).to_string())
    }

    fn work_area(&self, handle: WindowHandle) -> Option<Rect> {
        let monitor = unsafe { MonitorFromWindow(hwnd(handle), MONITOR_DEFAULTTONEAREST) };
        if monitor.is_invalid() {
            return None;
        }
        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
            return None;
        }
        Some(rect_from(&info.rcWork))
    }

    fn foreground(&self) -> Option<WindowHandle> {
        let h = unsafe { GetForegroundWindow() };
        let handle = WindowHandle(h.0 as isize);
        (!handle.is_null()).then_some(handle)
    }

    fn set_foreground(&self, handle: WindowHandle) -> bool {
        unsafe { SetForegroundWindow(hwnd(handle)) }.as_bool()
    }

    /// `ShowWindow`'s own return value, passed through.
    fn show(&self, handle: WindowHandle, command: ShowCommand) -> bool {
        unsafe { ShowWindow(hwnd(handle), show_cmd(command)) }.as_bool()
    }
}
