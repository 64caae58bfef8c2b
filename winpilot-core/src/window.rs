//! Window registry: enumerate, query and manipulate top-level windows.
//!
//! The only source of truth is a live OS enumeration; nothing is cached.
//! Every [`WindowInfo`] is a point-in-time snapshot and must be re-queried
//! to observe OS-side changes.
//!
//! `is_visible`, `is_minimized` and `is_maximized` are independent flags.
//! A hidden window can still report stale geometry.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{Timings, MAXIMIZED_WORK_AREA_RATIO};
use crate::errors::Result;
use crate::platform::{Pacer, WindowSystem};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Opaque OS identifier for a top-level window.  Only meaningful within the
/// current session; never owned by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// True when either dimension is non-positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Owning process name, or an explicit marker when lookup failed (the
/// process exited mid-enumeration, access denied, ...).
///
/// Serializes as the name string, or `null` when unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProcessName {
    Resolved(String),
    Unresolved,
}

impl ProcessName {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProcessName::Resolved(name) => Some(name),
            ProcessName::Unresolved => None,
        }
    }

    fn eq_ignore_case(&self, other: &str) -> bool {
        self.as_str()
            .is_some_and(|name| name.to_lowercase() == other.to_lowercase())
    }
}

/// Owned snapshot of a top-level window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    #[serde(rename = "id")]
    pub handle: WindowHandle,
    pub title: String,
    pub process_name: ProcessName,
    pub process_id: u32,
    #[serde(flatten)]
    pub bounds: Rect,
    pub is_visible: bool,
    pub is_minimized: bool,
    /// Heuristic; see [`is_maximized_heuristic`].
    pub is_maximized: bool,
}

/// Show-state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowCommand {
    Minimize,
    Maximize,
    Restore,
    Hide,
    Show,
}

/// How a title query is compared against window titles.  Both modes are
/// case-insensitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleMatch {
    #[default]
    Substring,
    Exact,
}

impl TitleMatch {
    pub fn exact(exact: bool) -> Self {
        if exact {
            TitleMatch::Exact
        } else {
            TitleMatch::Substring
        }
    }

    pub fn matches(self, title: &str, query: &str) -> bool {
        let title = title.to_lowercase();
        let query = query.to_lowercase();
        match self {
            TitleMatch::Substring => title.contains(&query),
            TitleMatch::Exact => title == query,
        }
    }
}

/// Best-effort maximized classifier: the window covers at least
/// [`MAXIMIZED_WORK_AREA_RATIO`] of the work area in both dimensions.
pub fn is_maximized_heuristic(bounds: &Rect, work_area: &Rect) -> bool {
    f64::from(bounds.width) >= f64::from(work_area.width) * MAXIMIZED_WORK_AREA_RATIO
        && f64::from(bounds.height) >= f64::from(work_area.height) * MAXIMIZED_WORK_AREA_RATIO
}

/// Drop a trailing `.exe` (any case).  Names are compared on char
/// boundaries only, so non-ASCII names pass through untouched.
pub fn strip_exe_suffix(name: &str) -> &str {
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(tail) if tail.eq_ignore_ascii_case(".exe") => &name[..cut],
        _ => name,
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Enumeration, lookup, focus and show-state requests over a
/// [`WindowSystem`].
///
/// Match results follow enumeration (z-)order, which the OS does not keep
/// stable across runs; the first match is only deterministic when a single
/// window matches.
#[derive(Clone)]
pub struct WindowRegistry {
    sys: Arc<dyn WindowSystem>,
    pacer: Arc<dyn Pacer>,
    timings: Timings,
}

impl WindowRegistry {
    pub fn new(sys: Arc<dyn WindowSystem>, pacer: Arc<dyn Pacer>, timings: Timings) -> Self {
        Self {
            sys,
            pacer,
            timings,
        }
    }

    /// Every top-level window.  Unless `include_hidden`, invisible windows
    /// and windows with an empty title are skipped.
    ///
    /// Per-window details are resolved in parallel; output keeps
    /// enumeration order.
    pub fn all_windows(&self, include_hidden: bool) -> Result<Vec<WindowInfo>> {
        let handles = self.sys.enumerate()?;

        let windows: Vec<WindowInfo> = handles
            .into_par_iter()
            .filter_map(|handle| {
                if !include_hidden && !self.sys.is_visible(handle) {
                    return None;
                }
                let info = self.describe(handle);
                if !include_hidden && info.title.is_empty() {
                    return None;
                }
                Some(info)
            })
            .collect();

        log::debug!(
            "all_windows(include_hidden={include_hidden}): {} window(s)",
            windows.len()
        );
        Ok(windows)
    }

    /// Foreground window, or `None` if the OS reports none.
    pub fn active_window(&self) -> Option<WindowInfo> {
        self.sys.foreground().and_then(|h| self.window_info(h))
    }

    /// Point lookup.  `None` for a null handle.
    pub fn window_info(&self, handle: WindowHandle) -> Option<WindowInfo> {
        if handle.is_null() {
            return None;
        }
        Some(self.describe(handle))
    }

    /// Current bounds of a window, straight from the OS.
    pub fn bounds(&self, handle: WindowHandle) -> Option<Rect> {
        if handle.is_null() {
            return None;
        }
        self.sys.rect(handle)
    }

    /// Bring a window to the foreground, restoring it first if minimized.
    ///
    /// Returns whether the OS granted foreground status.  A denial (e.g.
    /// the caller is a background process) is not an error.
    pub fn focus_window(&self, handle: WindowHandle) -> bool {
        if handle.is_null() {
            return false;
        }

        if self.sys.is_minimized(handle) {
            self.sys.show(handle, ShowCommand::Restore);
            self.pacer.pause(self.timings.restore_settle);
        }

        let granted = self.sys.set_foreground(handle);
        if !granted {
            log::warn!("foreground request for window {} was denied", handle.0);
        }
        granted
    }

    pub fn focus_window_by_title(&self, title: &str, mode: TitleMatch) -> Result<bool> {
        Ok(self
            .find_window_by_title(title, mode)?
            .is_some_and(|w| self.focus_window(w.handle)))
    }

    pub fn focus_window_by_process_name(&self, process_name: &str) -> Result<bool> {
        Ok(self
            .find_window_by_process_name(process_name)?
            .is_some_and(|w| self.focus_window(w.handle)))
    }

    /// First visible, titled window whose title matches.
    pub fn find_window_by_title(&self, title: &str, mode: TitleMatch) -> Result<Option<WindowInfo>> {
        Ok(self
            .all_windows(false)?
            .into_iter()
            .find(|w| mode.matches(&w.title, title)))
    }

    pub fn find_windows_by_title(&self, title: &str, mode: TitleMatch) -> Result<Vec<WindowInfo>> {
        Ok(self
            .all_windows(false)?
            .into_iter()
            .filter(|w| mode.matches(&w.title, title))
            .collect())
    }

    /// First visible, titled window owned by a process with this name
    /// (case-insensitive).  Windows whose process is unresolved never match.
    pub fn find_window_by_process_name(&self, process_name: &str) -> Result<Option<WindowInfo>> {
        Ok(self
            .all_windows(false)?
            .into_iter()
            .find(|w| w.process_name.eq_ignore_case(process_name)))
    }

    pub fn find_windows_by_process_name(&self, process_name: &str) -> Result<Vec<WindowInfo>> {
        Ok(self
            .all_windows(false)?
            .into_iter()
            .filter(|w| w.process_name.eq_ignore_case(process_name))
            .collect())
    }

    pub fn minimize_window(&self, handle: WindowHandle) -> bool {
        self.set_state(handle, ShowCommand::Minimize)
    }

    pub fn maximize_window(&self, handle: WindowHandle) -> bool {
        self.set_state(handle, ShowCommand::Maximize)
    }

    pub fn restore_window(&self, handle: WindowHandle) -> bool {
        self.set_state(handle, ShowCommand::Restore)
    }

    pub fn hide_window(&self, handle: WindowHandle) -> bool {
        self.set_state(handle, ShowCommand::Hide)
    }

    pub fn show_window(&self, handle: WindowHandle) -> bool {
        self.set_state(handle, ShowCommand::Show)
    }

    /// Request a show-state transition.  The return value is the OS
    /// acknowledgement, not a verified post-condition.
    pub fn set_state(&self, handle: WindowHandle, command: ShowCommand) -> bool {
        log::debug!("set_state: window {} -> {command:?}", handle.0);
        self.sys.show(handle, command)
    }

    fn describe(&self, handle: WindowHandle) -> WindowInfo {
        let title = self.sys.title(handle);
        let process_id = self.sys.process_id(handle);
        let process_name = match self.sys.process_name(process_id) {
            Some(name) => ProcessName::Resolved(name),
            None => {
                log::warn!("could not resolve process {process_id} for window {}", handle.0);
                ProcessName::Unresolved
            }
        };
        let bounds = self.sys.rect(handle).unwrap_or_default();
        let is_maximized = self
            .sys
            .work_area(handle)
            .is_some_and(|area| is_maximized_heuristic(&bounds, &area));

        WindowInfo {
            handle,
            title,
            process_name,
            process_id,
            bounds,
            is_visible: self.sys.is_visible(handle),
            is_minimized: self.sys.is_minimized(handle),
            is_maximized,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
