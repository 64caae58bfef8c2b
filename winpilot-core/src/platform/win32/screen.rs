//! Pixel capture via GDI.
//!
//! Screen regions are copied with `BitBlt` from the desktop DC, which works
//! across monitors because the desktop DC spans the whole virtual screen.
//! Single windows are rendered with `PrintWindow(PW_RENDERFULLCONTENT)`, so
//! occluded or partially off-screen windows still come back complete.
//!
//! Every GDI object is released before returning, on success and failure.

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject,
    EnumDisplayMonitors, GetDC, GetDIBits, GetMonitorInfoW, ReleaseDC, SelectObject, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HDC, HMONITOR, MONITORINFO, SRCCOPY,
};
use windows::Win32::Storage::Xps::{PrintWindow, PRINT_WINDOW_FLAGS};

use super::window::{hwnd, rect_from};
use crate::capture::{DisplayBounds, Frame};
use crate::errors::{AutomationError, Result};
use crate::platform::ScreenSource;
use crate::window::{Rect, WindowHandle};

/// `PW_RENDERFULLCONTENT`: capture DirectComposition content too.
const PW_RENDERFULLCONTENT: PRINT_WINDOW_FLAGS = PRINT_WINDOW_FLAGS(2);

/// `MONITORINFOF_PRIMARY`.
const MONITOR_PRIMARY: u32 = 1;

#[derive(Debug, Default)]
pub struct GdiScreen;

fn gdi_error(msg: impl Into<String>) -> AutomationError {
    AutomationError::Platform(msg.into())
}

unsafe extern "system" fn monitor_callback(
    monitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = unsafe { &mut *(lparam.0 as *mut Vec<HMONITOR>) };
    monitors.push(monitor);
    TRUE // continue enumeration
}

/// Render `width`x`height` pixels into a memory DC with `paint`, then read
/// them back as top-down BGRA.
fn capture_with(
    width: u32,
    height: u32,
    paint: impl FnOnce(HDC, HDC) -> Result<()>,
) -> Result<Frame> {
    unsafe {
        let screen_dc = GetDC(HWND(std::ptr::null_mut()));
        if screen_dc.is_invalid() {
            return Err(gdi_error("GetDC(NULL) failed"));
        }

        let result = (|| -> Result<Frame> {
            let mem_dc = CreateCompatibleDC(screen_dc);
            if mem_dc.is_invalid() {
                return Err(gdi_error("CreateCompatibleDC failed"));
            }
            let bitmap = CreateCompatibleBitmap(screen_dc, width as i32, height as i32);
            if bitmap.is_invalid() {
                let _ = DeleteDC(mem_dc);
                return Err(gdi_error("CreateCompatibleBitmap failed"));
            }
            let old_bitmap = SelectObject(mem_dc, bitmap);

            let painted = paint(mem_dc, screen_dc);

            let mut pixels = vec![0u8; (width * height) as usize * 4];
            let lines = if painted.is_ok() {
                let bmi = BITMAPINFO {
                    bmiHeader: BITMAPINFOHEADER {
                        biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                        biWidth: width as i32,
                        // Negative height = top-down bitmap (row 0 at top).
                        biHeight: -(height as i32),
                        biPlanes: 1,
                        biBitCount: 32,
                        biCompression: BI_RGB.0,
                        ..Default::default()
                    },
                    bmiColors: [Default::default()],
                };
                GetDIBits(
                    mem_dc,
                    bitmap,
                    0,
                    height,
                    Some(pixels.as_mut_ptr() as *mut _),
                    &bmi as *const _ as *mut _,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            SelectObject(mem_dc, old_bitmap);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);

            painted?;
            if lines == 0 {
                return Err(gdi_error("GetDIBits failed"));
            }

            // BI_RGB 32-bit leaves alpha at 0; make it opaque.
            for chunk in pixels.chunks_exact_mut(4) {
                chunk[3] = 255;
            }

            Ok(Frame {
                width,
                height,
                data: pixels,
            })
        })();

        ReleaseDC(HWND(std::ptr::null_mut()), screen_dc);
        result
    }
}

impl ScreenSource for GdiScreen {
    fn displays(&self) -> Result<Vec<DisplayBounds>> {
        let mut monitors: Vec<HMONITOR> = Vec::with_capacity(4);
        let ok = unsafe {
            EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(monitor_callback),
                LPARAM(&mut monitors as *mut Vec<HMONITOR> as isize),
            )
        };
        if !ok.as_bool() {
            return Err(gdi_error("EnumDisplayMonitors failed"));
        }

        let mut displays = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
                log::warn!("GetMonitorInfoW failed for monitor {:?}; skipping", monitor.0);
                continue;
            }
            displays.push(DisplayBounds {
                bounds: rect_from(&info.rcMonitor),
                work_area: rect_from(&info.rcWork),
                is_primary: info.dwFlags & MONITOR_PRIMARY != 0,
            });
        }
        Ok(displays)
    }

    fn grab_region(&self, region: Rect) -> Result<Frame> {
        capture_with(
            region.width as u32,
            region.height as u32,
            |mem_dc, screen_dc| unsafe {
                BitBlt(
                    mem_dc,
                    0,
                    0,
                    region.width,
                    region.height,
                    screen_dc,
                    region.x,
                    region.y,
                    SRCCOPY,
                )
                .map_err(|e| gdi_error(format!("BitBlt failed: {e}")))
            },
        )
    }

    fn grab_window(&self, handle: WindowHandle, width: u32, height: u32) -> Result<Frame> {
        capture_with(width, height, |mem_dc, _| {
            let ok = unsafe { PrintWindow(hwnd(handle), mem_dc, PW_RENDERFULLCONTENT) };
            if ok.as_bool() {
                Ok(())
            } else {
                Err(gdi_error(format!("PrintWindow failed for window {}", handle.0)))
            }
        })
    }
}
