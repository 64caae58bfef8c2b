//! Capture subsystem: still images of a display, a screen region or a
//! single window, encoded as PNG.
//!
//! Capture is read-only and idempotent.  It has no side effects on the
//! target window or display, so callers may retry freely on transient
//! failure (e.g. a display reconfiguration mid-capture).
//!
//! # Examples
//!
//! ```no_run
//! use winpilot_core::capture::CaptureService;
//! use winpilot_core::config::Timings;
//!
//! let platform = winpilot_core::platform::native().expect("unsupported OS");
//! let capture = CaptureService::new(&platform, Timings::default());
//! let png = capture.capture_screen(0).expect("capture failed");
//! std::fs::write("desktop.png", &png).unwrap();
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::config::Timings;
use crate::errors::{AutomationError, Result};
use crate::platform::{Platform, ScreenSource};
use crate::window::{Rect, TitleMatch, WindowHandle, WindowRegistry};

// ---------------------------------------------------------------------------
// Public data types
// ---------------------------------------------------------------------------

/// Raw BGRA pixel data.
///
/// Pixels are stored row-major, left-to-right, top-to-bottom, 4 bytes per
/// pixel in BGRA order (the GDI 32-bit DIB layout).
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Length == `width * height * 4`.
    pub data: Vec<u8>,
}

/// Display geometry as reported by the OS, before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBounds {
    pub bounds: Rect,
    pub work_area: Rect,
    pub is_primary: bool,
}

/// A connected display.  `index` is enumeration order; index 0 is not
/// necessarily the OS primary, check `is_primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub index: usize,
    pub bounds: Rect,
    pub work_area: Rect,
    pub is_primary: bool,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a BGRA frame as PNG bytes.
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>> {
    // Convert BGRA -> RGBA for the `image` crate (which uses RGBA layout).
    let rgba_pixels: Vec<u8> = frame
        .data
        .chunks_exact(4)
        .flat_map(|px| [px[2], px[1], px[0], px[3]])
        .collect();

    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba_pixels).ok_or_else(
        || {
            AutomationError::Encode(format!(
                "buffer size mismatch: {} bytes for {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            ))
        },
    )?;

    let mut buf: Vec<u8> = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| AutomationError::Encode(e.to_string()))?;

    Ok(buf)
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CaptureService {
    source: Arc<dyn ScreenSource>,
    windows: WindowRegistry,
}

impl CaptureService {
    pub fn new(platform: &Platform, timings: Timings) -> Self {
        let windows =
            WindowRegistry::new(platform.windows.clone(), platform.pacer.clone(), timings);
        Self::with_registry(platform.screen.clone(), windows)
    }

    pub fn with_registry(source: Arc<dyn ScreenSource>, windows: WindowRegistry) -> Self {
        Self { source, windows }
    }

    /// Connected displays in OS order, indexed from 0.
    pub fn displays(&self) -> Result<Vec<DisplayInfo>> {
        Ok(self
            .source
            .displays()?
            .into_iter()
            .enumerate()
            .map(|(index, d)| DisplayInfo {
                index,
                bounds: d.bounds,
                work_area: d.work_area,
                is_primary: d.is_primary,
            })
            .collect())
    }

    /// Full bounds of the display at `display_index`.
    pub fn capture_screen(&self, display_index: usize) -> Result<Vec<u8>> {
        let displays = self.displays()?;
        let display = displays.get(display_index).ok_or(
            AutomationError::DisplayOutOfRange {
                index: display_index,
                count: displays.len(),
            },
        )?;
        log::debug!("capture_screen: display {display_index} {:?}", display.bounds);
        self.grab(display.bounds)
    }

    /// Arbitrary screen rectangle.
    pub fn capture_region(&self, x: i32, y: i32, width: i32, height: i32) -> Result<Vec<u8>> {
        let region = Rect::new(x, y, width, height);
        if region.is_empty() {
            return Err(AutomationError::argument(format!(
                "Capture region has invalid dimensions ({width}x{height})"
            )));
        }
        self.grab(region)
    }

    /// Whole-window capture, including occluded content.
    pub fn capture_window(&self, handle: WindowHandle) -> Result<Vec<u8>> {
        let rect = self
            .windows
            .bounds(handle)
            .ok_or_else(|| AutomationError::state("Unable to get window rectangle"))?;

        if rect.is_empty() {
            return Err(AutomationError::state(format!(
                "Window has invalid dimensions ({}x{})",
                rect.width, rect.height
            )));
        }

        log::debug!("capture_window: window {} {rect:?}", handle.0);
        let frame = self
            .source
            .grab_window(handle, rect.width as u32, rect.height as u32)?;
        encode_png(&frame)
    }

    pub fn capture_active_window(&self) -> Result<Vec<u8>> {
        let active = self
            .windows
            .active_window()
            .ok_or_else(|| AutomationError::state("No active window found"))?;
        self.capture_window(active.handle)
    }

    /// Capture the first visible window whose title matches.
    pub fn capture_window_by_title(&self, title: &str, mode: TitleMatch) -> Result<Vec<u8>> {
        let window = self
            .windows
            .find_window_by_title(title, mode)?
            .ok_or_else(|| {
                AutomationError::state(format!("Window with title '{title}' not found"))
            })?;
        self.capture_window(window.handle)
    }

    fn grab(&self, region: Rect) -> Result<Vec<u8>> {
        let frame = self.source.grab_region(region)?;
        encode_png(&frame)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::platform::fake::{Event, FakeDesktop, FakeWindow};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn service(fake: &Arc<FakeDesktop>) -> CaptureService {
        CaptureService::new(&fake.platform(), Timings::default())
    }

    #[test]
    fn test_encode_png_swaps_channels() {
        let frame = Frame {
            width: 1,
            height: 1,
            data: vec![10, 20, 30, 255],
        };
        let png = encode_png(&frame).unwrap();
        assert!(png.starts_with(PNG_MAGIC));

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [30, 20, 10, 255]);
    }

    #[test]
    fn test_encode_png_size_mismatch() {
        let frame = Frame {
            width: 2,
            height: 2,
            data: vec![0; 4],
        };
        assert_eq!(encode_png(&frame).unwrap_err().kind(), ErrorKind::Encode);
    }

    #[test]
    fn test_displays_indexed_in_enumeration_order() {
        let fake = FakeDesktop::new();
        fake.set_displays(vec![
            DisplayBounds {
                bounds: Rect::new(-1280, 0, 1280, 1024),
                work_area: Rect::new(-1280, 0, 1280, 984),
                is_primary: false,
            },
            DisplayBounds {
                bounds: Rect::new(0, 0, 1920, 1080),
                work_area: Rect::new(0, 0, 1920, 1040),
                is_primary: true,
            },
        ]);

        let displays = service(&fake).displays().unwrap();
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].index, 0);
        assert!(!displays[0].is_primary);
        assert!(displays[1].is_primary);
    }

    #[test]
    fn test_capture_screen_uses_display_bounds() {
        let fake = FakeDesktop::new();
        let png = service(&fake).capture_screen(0).unwrap();

        assert!(png.starts_with(PNG_MAGIC));
        assert_eq!(
            fake.events(),
            vec![Event::GrabRegion(Rect::new(0, 0, 1920, 1080))]
        );
    }

    #[test]
    fn test_capture_screen_out_of_range() {
        let fake = FakeDesktop::new();
        let err = service(&fake).capture_screen(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(fake.events().is_empty());
    }

    #[test]
    fn test_capture_region_rejects_empty() {
        let fake = FakeDesktop::new();
        let svc = service(&fake);
        assert_eq!(
            svc.capture_region(0, 0, 0, 10).unwrap_err().kind(),
            ErrorKind::Argument
        );
        assert!(svc.capture_region(10, 20, 30, 40).is_ok());
        assert_eq!(
            fake.events(),
            vec![Event::GrabRegion(Rect::new(10, 20, 30, 40))]
        );
    }

    #[test]
    fn test_capture_window_with_zero_size_fails_without_image() {
        let fake = FakeDesktop::new();
        fake.add_window(
            FakeWindow::new(3, "Tiny", "app").with_rect(Rect::new(-32000, -32000, 0, 0)),
        );

        let err = service(&fake).capture_window(WindowHandle(3)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::State);
        assert!(!fake.events().iter().any(|e| matches!(e, Event::GrabWindow(..))));
    }

    #[test]
    fn test_capture_window_stale_handle() {
        let fake = FakeDesktop::new();
        let err = service(&fake).capture_window(WindowHandle(77)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_capture_window_uses_window_capture() {
        let fake = FakeDesktop::new();
        fake.add_window(FakeWindow::new(8, "Editor", "code").with_rect(Rect::new(5, 5, 4, 3)));

        let png = service(&fake).capture_window(WindowHandle(8)).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
        assert_eq!(fake.events(), vec![Event::GrabWindow(WindowHandle(8))]);
    }

    #[test]
    fn test_capture_active_window_requires_foreground() {
        let fake = FakeDesktop::new();
        fake.add_window(FakeWindow::new(8, "Editor", "code"));
        let svc = service(&fake);

        assert_eq!(
            svc.capture_active_window().unwrap_err().to_string(),
            "No active window found"
        );

        fake.set_foreground_handle(Some(WindowHandle(8)));
        assert!(svc.capture_active_window().is_ok());
    }

    #[test]
    fn test_capture_by_title_only_matches_visible() {
        let fake = FakeDesktop::new();
        fake.add_window(FakeWindow::new(1, "Secret Notepad", "notepad").hidden());
        let svc = service(&fake);

        let err = svc
            .capture_window_by_title("notepad", TitleMatch::Substring)
            .unwrap_err();
        assert_eq!(err.to_string(), "Window with title 'notepad' not found");

        fake.add_window(FakeWindow::new(2, "Notepad", "notepad"));
        assert!(svc
            .capture_window_by_title("notepad", TitleMatch::Exact)
            .is_ok());
    }
}
