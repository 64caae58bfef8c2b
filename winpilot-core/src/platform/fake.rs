//! Recording in-memory desktop used by the unit tests.
//!
//! Every side-effecting call is appended to an ordered [`Event`] log so tests
//! can assert exact sequences, including settle pauses.  Queries never log.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{InputDevice, Pacer, Platform, ScreenSource, WindowSystem};
use crate::capture::{DisplayBounds, Frame};
use crate::errors::{AutomationError, Result};
use crate::input::{ButtonAction, MouseButton, Point, WheelAxis};
use crate::keys::VirtualKey;
use crate::window::{Rect, ShowCommand, WindowHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    KeyDown(VirtualKey),
    KeyUp(VirtualKey),
    Char(char),
    Move(i32, i32),
    Button(MouseButton, ButtonAction),
    Wheel(WheelAxis, i32),
    Pause(Duration),
    Foreground(WindowHandle),
    Show(WindowHandle, ShowCommand),
    GrabRegion(Rect),
    GrabWindow(WindowHandle),
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    handle: WindowHandle,
    title: String,
    process: Option<String>,
    rect: Rect,
    visible: bool,
    minimized: bool,
}

impl FakeWindow {
    pub fn new(id: isize, title: &str, process: &str) -> Self {
        Self {
            handle: WindowHandle(id),
            title: title.to_string(),
            process: Some(process.to_string()),
            rect: Rect::new(100, 100, 800, 600),
            visible: true,
            minimized: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn minimized(mut self) -> Self {
        self.minimized = true;
        self
    }

    pub fn unresolved_process(mut self) -> Self {
        self.process = None;
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    fn pid(&self) -> u32 {
        self.handle.0 as u32 * 100
    }
}

struct State {
    events: Vec<Event>,
    pressed: HashSet<VirtualKey>,
    rejected: HashSet<VirtualKey>,
    cursor: Point,
    windows: Vec<FakeWindow>,
    foreground: Option<WindowHandle>,
    deny_foreground: bool,
    displays: Vec<DisplayBounds>,
    fail_capture: bool,
}

pub struct FakeDesktop {
    state: Mutex<State>,
}

impl FakeDesktop {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                events: Vec::new(),
                pressed: HashSet::new(),
                rejected: HashSet::new(),
                cursor: Point::default(),
                windows: Vec::new(),
                foreground: None,
                deny_foreground: false,
                displays: vec![DisplayBounds {
                    bounds: Rect::new(0, 0, 1920, 1080),
                    work_area: Rect::new(0, 0, 1920, 1040),
                    is_primary: true,
                }],
                fail_capture: false,
            }),
        })
    }

    pub fn platform(self: &Arc<Self>) -> Platform {
        Platform {
            input: self.clone(),
            windows: self.clone(),
            screen: self.clone(),
            pacer: self.clone(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    /// Keyboard events only, pauses dropped.
    pub fn key_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::KeyDown(_) | Event::KeyUp(_) | Event::Char(_)))
            .collect()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Pause(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Make `key_down(key)` fail.
    pub fn reject_key(&self, key: VirtualKey) {
        self.state.lock().rejected.insert(key);
    }

    pub fn add_window(&self, window: FakeWindow) {
        self.state.lock().windows.push(window);
    }

    pub fn deny_foreground(&self, deny: bool) {
        self.state.lock().deny_foreground = deny;
    }

    pub fn foreground_handle(&self) -> Option<WindowHandle> {
        self.state.lock().foreground
    }

    pub fn set_foreground_handle(&self, handle: Option<WindowHandle>) {
        self.state.lock().foreground = handle;
    }

    pub fn set_displays(&self, displays: Vec<DisplayBounds>) {
        self.state.lock().displays = displays;
    }

    pub fn fail_capture(&self, fail: bool) {
        self.state.lock().fail_capture = fail;
    }

    fn record(&self, event: Event) {
        self.state.lock().events.push(event);
    }

    fn with_window<T>(&self, handle: WindowHandle, f: impl FnOnce(&FakeWindow) -> T) -> Option<T> {
        self.state
            .lock()
            .windows
            .iter()
            .find(|w| w.handle == handle)
            .map(f)
    }
}

fn solid_frame(width: u32, height: u32) -> Frame {
    Frame {
        width,
        height,
        data: [0x40, 0x80, 0xC0, 0xFF].repeat((width * height) as usize),
    }
}

impl InputDevice for FakeDesktop {
    fn key_down(&self, key: VirtualKey) -> Result<()> {
        let mut state = self.state.lock();
        if state.rejected.contains(&key) {
            return Err(AutomationError::Platform(format!("SendInput rejected {key}")));
        }
        state.pressed.insert(key);
        state.events.push(Event::KeyDown(key));
        Ok(())
    }

    fn key_up(&self, key: VirtualKey) -> Result<()> {
        let mut state = self.state.lock();
        state.pressed.remove(&key);
        state.events.push(Event::KeyUp(key));
        Ok(())
    }

    fn unicode_char(&self, ch: char) -> Result<()> {
        self.record(Event::Char(ch));
        Ok(())
    }

    fn is_key_down(&self, key: VirtualKey) -> bool {
        self.state.lock().pressed.contains(&key)
    }

    fn move_cursor(&self, x: i32, y: i32) -> Result<()> {
        let mut state = self.state.lock();
        state.cursor = Point::new(x, y);
        state.events.push(Event::Move(x, y));
        Ok(())
    }

    fn cursor_position(&self) -> Result<Point> {
        Ok(self.state.lock().cursor)
    }

    fn button(&self, button: MouseButton, action: ButtonAction) -> Result<()> {
        self.record(Event::Button(button, action));
        Ok(())
    }

    fn wheel(&self, axis: WheelAxis, delta: i32) -> Result<()> {
        self.record(Event::Wheel(axis, delta));
        Ok(())
    }
}

impl WindowSystem for FakeDesktop {
    fn enumerate(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.state.lock().windows.iter().map(|w| w.handle).collect())
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.with_window(handle, |w| w.title.clone())
            .unwrap_or_default()
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        self.with_window(handle, |w| w.visible).unwrap_or(false)
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        self.with_window(handle, |w| w.minimized).unwrap_or(false)
    }

    fn rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.with_window(handle, |w| w.rect)
    }

    fn process_id(&self, handle: WindowHandle) -> u32 {
        self.with_window(handle, FakeWindow::pid).unwrap_or(0)
    }

    fn process_name(&self, pid: u32) -> Option<String> {
        self.state
            .lock()
            .windows
            .iter()
            .find(|w| w.pid() == pid)
            .and_then(|w| w.process.clone())
    }

    fn work_area(&self, handle: WindowHandle) -> Option<Rect> {
        let state = self.state.lock();
        if !state.windows.iter().any(|w| w.handle == handle) {
            return None;
        }
        state.displays.first().map(|d| d.work_area)
    }

    fn foreground(&self) -> Option<WindowHandle> {
        self.state.lock().foreground
    }

    fn set_foreground(&self, handle: WindowHandle) -> bool {
        let mut state = self.state.lock();
        state.events.push(Event::Foreground(handle));
        let known = state.windows.iter().any(|w| w.handle == handle);
        if !known || state.deny_foreground {
            return false;
        }
        state.foreground = Some(handle);
        true
    }

    fn show(&self, handle: WindowHandle, command: ShowCommand) -> bool {
        let mut state = self.state.lock();
        state.events.push(Event::Show(handle, command));
        let work_area = state.displays.first().map(|d| d.work_area);
        let Some(window) = state.windows.iter_mut().find(|w| w.handle == handle) else {
            return false;
        };
        match command {
            ShowCommand::Minimize => window.minimized = true,
            ShowCommand::Restore => window.minimized = false,
            ShowCommand::Maximize => {
                window.minimized = false;
                window.visible = true;
                if let Some(area) = work_area {
                    window.rect = area;
                }
            }
            ShowCommand::Hide => window.visible = false,
            ShowCommand::Show => window.visible = true,
        }
        true
    }
}

impl ScreenSource for FakeDesktop {
    fn displays(&self) -> Result<Vec<DisplayBounds>> {
        Ok(self.state.lock().displays.clone())
    }

    fn grab_region(&self, region: Rect) -> Result<Frame> {
        let mut state = self.state.lock();
        if state.fail_capture {
            return Err(AutomationError::Platform("BitBlt failed".into()));
        }
        state.events.push(Event::GrabRegion(region));
        Ok(solid_frame(region.width as u32, region.height as u32))
    }

    fn grab_window(&self, handle: WindowHandle, width: u32, height: u32) -> Result<Frame> {
        let mut state = self.state.lock();
        if state.fail_capture {
            return Err(AutomationError::Platform("PrintWindow failed".into()));
        }
        state.events.push(Event::GrabWindow(handle));
        Ok(solid_frame(width, height))
    }
}

impl Pacer for FakeDesktop {
    fn pause(&self, duration: Duration) {
        self.record(Event::Pause(duration));
    }
}
