//! Single-operation entry points for tool-call transports.
//!
//! [`Desktop`] bundles the input emitter, window registry, capture service
//! and macro engine over one platform.  Every method returns a
//! [`ToolResponse`]; failures become `success: false` with a message, so a
//! caller always gets a well-formed answer.
//!
//! [`dispatch_json`](Desktop::dispatch_json) maps a `(method, params)` pair
//! onto the same methods for line-delimited JSON workers and the C ABI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::capture::CaptureService;
use crate::config::EngineConfig;
use crate::errors::{AutomationError, Result};
use crate::input::{Keyboard, Mouse, MouseButton};
use crate::keys::{self, KeyChord, Modifier};
use crate::macros::{self, naming, MacroEngine};
use crate::platform::{self, Platform};
use crate::window::{ShowCommand, TitleMatch, WindowHandle, WindowRegistry};

pub const SERVER_NAME: &str = "winpilot";

/// Method names accepted by [`Desktop::dispatch_json`].
pub const TOOL_NAMES: &[&str] = &[
    "take_screenshot",
    "list_windows",
    "get_active_window",
    "focus_window",
    "window_state",
    "mouse_click",
    "mouse_move",
    "mouse_drag",
    "scroll",
    "type_text",
    "press_key",
    "key_combo",
    "cursor_position",
    "list_displays",
    "run_macro",
    "get_server_capabilities",
    "ping",
];

const CAPABILITIES: &[&str] = &[
    "screenshot_capture",
    "window_management",
    "mouse_automation",
    "keyboard_automation",
    "macro_execution",
    "multi_monitor_support",
];

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Uniform result of every entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// What a screenshot captures.  Unknown names fall back to the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CaptureTarget {
    #[default]
    Screen,
    ActiveWindow,
    Window,
}

impl From<String> for CaptureTarget {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "active_window" => CaptureTarget::ActiveWindow,
            "window" => CaptureTarget::Window,
            _ => CaptureTarget::Screen,
        }
    }
}

impl CaptureTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureTarget::Screen => "screen",
            CaptureTarget::ActiveWindow => "active_window",
            CaptureTarget::Window => "window",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenshotRequest {
    /// Without extension is fine; `.png` is appended.
    pub filename: Option<String>,
    #[serde(alias = "screen_id")]
    pub screen_id: usize,
    pub target: CaptureTarget,
    #[serde(alias = "window_id")]
    pub window_id: Option<isize>,
    #[serde(alias = "window_name")]
    pub window_name: Option<String>,
}

fn one() -> u32 {
    1
}

fn default_scroll_amount() -> i32 {
    3
}

/// A parsed `(method, params)` request.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum ToolCall {
    TakeScreenshot(ScreenshotRequest),
    ListWindows {
        #[serde(default, alias = "includeHidden")]
        include_hidden: bool,
    },
    GetActiveWindow {},
    FocusWindow {
        #[serde(default, alias = "windowId")]
        window_id: Option<isize>,
        #[serde(default, alias = "windowName")]
        window_name: Option<String>,
    },
    WindowState {
        #[serde(alias = "windowId", alias = "window_id")]
        handle: isize,
        state: ShowCommand,
    },
    MouseClick {
        x: i32,
        y: i32,
        #[serde(default)]
        button: Option<String>,
        #[serde(default = "one")]
        clicks: u32,
    },
    MouseMove {
        x: i32,
        y: i32,
    },
    MouseDrag {
        #[serde(alias = "startX")]
        start_x: i32,
        #[serde(alias = "startY")]
        start_y: i32,
        #[serde(alias = "endX")]
        end_x: i32,
        #[serde(alias = "endY")]
        end_y: i32,
        #[serde(default)]
        button: Option<String>,
    },
    Scroll {
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
        #[serde(default)]
        direction: Option<String>,
        #[serde(default = "default_scroll_amount")]
        amount: i32,
    },
    TypeText {
        #[serde(default)]
        text: String,
    },
    PressKey {
        key: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    KeyCombo {
        combo: String,
    },
    CursorPosition {},
    ListDisplays {},
    RunMacro {
        /// A JSON array, or a string holding one.
        commands: Value,
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(rename = "get_server_capabilities", alias = "capabilities")]
    Capabilities {},
    Ping {},
}

// ---------------------------------------------------------------------------
// Desktop
// ---------------------------------------------------------------------------

/// Input primitives (click, move, drag, scroll, typing, keys) take the
/// macro engine's run lock, so they queue behind a running macro instead of
/// interleaving with it.  Queries and captures do not.
pub struct Desktop {
    keyboard: Keyboard,
    mouse: Mouse,
    windows: WindowRegistry,
    capture: CaptureService,
    engine: MacroEngine,
    config: EngineConfig,
}

impl Desktop {
    pub fn new(platform: Platform, config: EngineConfig) -> Self {
        let timings = config.timings;
        let windows =
            WindowRegistry::new(platform.windows.clone(), platform.pacer.clone(), timings);

        Self {
            keyboard: Keyboard::new(platform.input.clone(), platform.pacer.clone(), timings),
            mouse: Mouse::new(platform.input.clone(), platform.pacer.clone(), timings),
            capture: CaptureService::with_registry(platform.screen.clone(), windows.clone()),
            windows,
            engine: MacroEngine::new(&platform, config.clone()),
            config,
        }
    }

    /// Desktop over the running OS.
    pub fn native(config: EngineConfig) -> Result<Self> {
        Ok(Self::new(platform::native()?, config))
    }

    pub fn engine(&self) -> &MacroEngine {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -- capture ------------------------------------------------------------

    /// Capture per `request` and return the PNG bytes.
    pub fn capture_png(&self, request: &ScreenshotRequest) -> Result<Vec<u8>> {
        match request.target {
            CaptureTarget::Screen => self.capture.capture_screen(request.screen_id),
            CaptureTarget::ActiveWindow => self.capture.capture_active_window(),
            CaptureTarget::Window => {
                let id = request.window_id.filter(|&id| id != 0);
                let name = request.window_name.as_deref().filter(|n| !n.is_empty());
                match (id, name) {
                    (Some(id), _) => self.capture.capture_window(WindowHandle(id)),
                    (None, Some(name)) => {
                        self.capture.capture_window_by_title(name, TitleMatch::Substring)
                    }
                    (None, None) => Err(AutomationError::argument(
                        "Either windowId or windowName must be specified for window target",
                    )),
                }
            }
        }
    }

    /// Capture and write a PNG; reports the absolute path and byte size.
    pub fn take_screenshot(&self, request: &ScreenshotRequest) -> ToolResponse {
        match self.write_screenshot(request) {
            Ok((path, size)) => {
                ToolResponse::ok(format!("Screenshot saved: {}", path.display())).with_data(json!({
                    "filepath": path.display().to_string(),
                    "target": request.target.as_str(),
                    "screenId": request.screen_id,
                    "size": size,
                }))
            }
            Err(e) => ToolResponse::failure(format!("Screenshot failed: {e}"))
                .with_data(json!({ "target": request.target.as_str() })),
        }
    }

    fn write_screenshot(&self, request: &ScreenshotRequest) -> Result<(PathBuf, usize)> {
        let png = self.capture_png(request)?;
        let filename = naming::screenshot_filename(request.filename.as_deref());
        let path = naming::resolve_output_path(&self.config.output_dir(), &filename);
        let path = std::path::absolute(&path).unwrap_or(path);
        std::fs::write(&path, &png)?;
        Ok((path, png.len()))
    }

    pub fn list_displays(&self) -> ToolResponse {
        match self.capture.displays() {
            Ok(displays) => ToolResponse::ok(format!("Found {} display(s)", displays.len()))
                .with_data(json!({ "count": displays.len(), "displays": displays })),
            Err(e) => ToolResponse::failure(format!("Failed to list displays: {e}")),
        }
    }

    // -- windows ------------------------------------------------------------

    pub fn list_windows(&self, include_hidden: bool) -> ToolResponse {
        match self.windows.all_windows(include_hidden) {
            Ok(windows) => ToolResponse::ok(format!("Found {} window(s)", windows.len()))
                .with_data(json!({ "count": windows.len(), "windows": windows })),
            Err(e) => ToolResponse::failure(format!("Failed to list windows: {e}")),
        }
    }

    /// `data` is `null` when nothing has the foreground; that is still a
    /// success.
    pub fn get_active_window(&self) -> ToolResponse {
        match self.windows.active_window() {
            Some(window) => ToolResponse::ok(format!("Active window: {}", window.title))
                .with_data(json!(window)),
            None => ToolResponse::ok("No active window found").with_data(Value::Null),
        }
    }

    /// `success` is whether focus was granted.
    pub fn focus_window(&self, window_id: Option<isize>, window_name: Option<&str>) -> ToolResponse {
        let id = window_id.filter(|&id| id != 0);
        let name = window_name.filter(|n| !n.is_empty());

        let (focused, target) = match (id, name) {
            (Some(id), _) => (
                Ok(self.windows.focus_window(WindowHandle(id))),
                format!("window ID {id}"),
            ),
            (None, Some(name)) => (
                self.windows.focus_window_by_title(name, TitleMatch::Substring),
                format!("window '{name}'"),
            ),
            (None, None) => {
                return ToolResponse::failure("Either windowId or windowName must be specified")
            }
        };

        match focused {
            Ok(true) => ToolResponse::ok(format!("Focused {target}")),
            Ok(false) => ToolResponse {
                success: false,
                message: Some(format!("Failed to focus {target}")),
                ..ToolResponse::default()
            },
            Err(e) => ToolResponse::failure(format!("Failed to focus window: {e}")),
        }
    }

    pub fn window_state(&self, handle: WindowHandle, state: ShowCommand) -> ToolResponse {
        let acknowledged = self.windows.set_state(handle, state);
        let message = format!(
            "{state:?} request for window {} {}",
            handle.0,
            if acknowledged { "acknowledged" } else { "not acknowledged" }
        );
        ToolResponse {
            success: acknowledged,
            message: Some(message),
            ..ToolResponse::default()
        }
    }

    // -- input --------------------------------------------------------------

    pub fn mouse_click(&self, x: i32, y: i32, button: Option<&str>, clicks: u32) -> ToolResponse {
        self.exclusive(
            || {
                let button: MouseButton = button.unwrap_or("left").parse()?;
                self.mouse.click_at(x, y, button, clicks)?;
                Ok(format!("Clicked {button} button at ({x}, {y}) {clicks} time(s)"))
            },
            "Mouse click failed",
        )
    }

    pub fn mouse_move(&self, x: i32, y: i32) -> ToolResponse {
        self.exclusive(
            || {
                self.mouse.move_to(x, y)?;
                Ok(format!("Moved mouse to ({x}, {y})"))
            },
            "Mouse move failed",
        )
    }

    pub fn mouse_drag(
        &self,
        start: (i32, i32),
        end: (i32, i32),
        button: Option<&str>,
    ) -> ToolResponse {
        self.exclusive(
            || {
                let button: MouseButton = button.unwrap_or("left").parse()?;
                self.mouse.drag(start.0, start.1, end.0, end.1, button)?;
                Ok(format!(
                    "Dragged {button} button from ({}, {}) to ({}, {})",
                    start.0, start.1, end.0, end.1
                ))
            },
            "Mouse drag failed",
        )
    }

    /// `direction` is `up`, `down` (default), `left` or `right`; `amount`
    /// is in wheel notches.  Missing coordinates use the cursor position.
    pub fn scroll(
        &self,
        x: Option<i32>,
        y: Option<i32>,
        direction: Option<&str>,
        amount: i32,
    ) -> ToolResponse {
        self.exclusive(
            || {
                let direction = direction.unwrap_or("down").to_ascii_lowercase();
                match direction.as_str() {
                    "up" => self.mouse.scroll_vertical(amount, x, y)?,
                    "down" => self.mouse.scroll_vertical(-amount, x, y)?,
                    "right" => self.mouse.scroll_horizontal(amount, x, y)?,
                    "left" => self.mouse.scroll_horizontal(-amount, x, y)?,
                    other => {
                        return Err(AutomationError::argument(format!(
                            "Unknown scroll direction: {other}"
                        )))
                    }
                }
                Ok(format!("Scrolled {direction} by {amount}"))
            },
            "Scroll failed",
        )
    }

    pub fn type_text(&self, text: &str) -> ToolResponse {
        self.exclusive(
            || {
                if text.is_empty() {
                    return Err(AutomationError::argument("Text is required"));
                }
                self.keyboard.type_text(text)?;
                Ok(format!("Typed {} character(s)", text.chars().count()))
            },
            "Type text failed",
        )
    }

    pub fn press_key(&self, key: &str, modifiers: &[String]) -> ToolResponse {
        self.exclusive(
            || {
                let modifiers = modifiers
                    .iter()
                    .map(|m| Modifier::resolve(m))
                    .collect::<Result<Vec<_>>>()?;
                let chord = KeyChord {
                    key: keys::resolve_key(key)?,
                    modifiers,
                };
                self.keyboard.press_key(chord.key, &chord.modifiers)?;
                Ok(format!("Pressed key: {chord}"))
            },
            "Key press failed",
        )
    }

    pub fn key_combo(&self, combo: &str) -> ToolResponse {
        self.exclusive(
            || {
                self.keyboard.send_key_combo(combo)?;
                Ok(format!("Sent key combo: {combo}"))
            },
            "Key combo failed",
        )
    }

    pub fn cursor_position(&self) -> ToolResponse {
        match self.mouse.position() {
            Ok(p) => ToolResponse::ok(format!("Cursor at ({}, {})", p.x, p.y)).with_data(json!(p)),
            Err(e) => ToolResponse::failure(format!("Failed to read cursor position: {e}")),
        }
    }

    // -- macros -------------------------------------------------------------

    /// Parse a JSON command array and run it, queueing behind any run in
    /// progress.
    pub fn run_macro(&self, commands_json: &str, name: Option<&str>) -> ToolResponse {
        let commands = match macros::parse_commands(commands_json) {
            Ok(commands) => commands,
            Err(e) => return ToolResponse::failure(format!("Invalid commands JSON format: {e}")),
        };

        let result = self.engine.execute(&commands, name);
        let millis = result.elapsed.as_millis();
        ToolResponse {
            success: result.success,
            message: Some(format!(
                "Macro execution {} in {millis}ms",
                if result.success { "completed" } else { "failed" }
            )),
            error: None,
            data: Some(json!({
                "name": result.name,
                "executionTimeMs": millis as u64,
                "commandCount": commands.len(),
                "results": result.results,
                "errorMessage": result.error_message,
            })),
        }
    }

    pub fn capabilities(&self) -> ToolResponse {
        ToolResponse::ok("Server capabilities").with_data(json!({
            "serverName": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "platform": std::env::consts::OS,
            "capabilities": CAPABILITIES,
            "tools": TOOL_NAMES,
            "features": {
                "multiMonitorSupport": true,
                "windowManagement": true,
                "macroExecution": true,
                "unicodeTextInput": true,
            },
        }))
    }

    /// Run an input action under the macro run lock and turn its outcome
    /// into a response.
    fn exclusive(&self, action: impl FnOnce() -> Result<String>, context: &str) -> ToolResponse {
        match self.engine.exclusive(action) {
            Ok(message) => ToolResponse::ok(message),
            Err(e) => ToolResponse::failure(format!("{context}: {e}")),
        }
    }

    // -- dispatch -----------------------------------------------------------

    pub fn call(&self, call: ToolCall) -> ToolResponse {
        match call {
            ToolCall::TakeScreenshot(request) => self.take_screenshot(&request),
            ToolCall::ListWindows { include_hidden } => self.list_windows(include_hidden),
            ToolCall::GetActiveWindow {} => self.get_active_window(),
            ToolCall::FocusWindow {
                window_id,
                window_name,
            } => self.focus_window(window_id, window_name.as_deref()),
            ToolCall::WindowState { handle, state } => {
                self.window_state(WindowHandle(handle), state)
            }
            ToolCall::MouseClick {
                x,
                y,
                button,
                clicks,
            } => self.mouse_click(x, y, button.as_deref(), clicks),
            ToolCall::MouseMove { x, y } => self.mouse_move(x, y),
            ToolCall::MouseDrag {
                start_x,
                start_y,
                end_x,
                end_y,
                button,
            } => self.mouse_drag((start_x, start_y), (end_x, end_y), button.as_deref()),
            ToolCall::Scroll {
                x,
                y,
                direction,
                amount,
            } => self.scroll(x, y, direction.as_deref(), amount),
            ToolCall::TypeText { text } => self.type_text(&text),
            ToolCall::PressKey { key, modifiers } => self.press_key(&key, &modifiers),
            ToolCall::KeyCombo { combo } => self.key_combo(&combo),
            ToolCall::CursorPosition {} => self.cursor_position(),
            ToolCall::ListDisplays {} => self.list_displays(),
            ToolCall::RunMacro { commands, name } => {
                let json = match commands {
                    Value::String(raw) => raw,
                    other => other.to_string(),
                };
                self.run_macro(&json, name.as_deref())
            }
            ToolCall::Capabilities {} => self.capabilities(),
            ToolCall::Ping {} => ToolResponse::ok("pong"),
        }
    }

    /// Parse `params` for `method` and run it.  `null` params mean "all
    /// defaults".
    pub fn dispatch_json(&self, method: &str, params: Value) -> ToolResponse {
        if !TOOL_NAMES.contains(&method) && method != "capabilities" {
            return ToolResponse::failure(format!("Unknown method: {method}"));
        }
        let params = if params.is_null() { json!({}) } else { params };

        match serde_json::from_value::<ToolCall>(json!({ "method": method, "params": params })) {
            Ok(call) => {
                log::debug!("dispatch_json: {method}");
                self.call(call)
            }
            Err(e) => ToolResponse::failure(format!("Invalid parameters for '{method}': {e}")),
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Timings;
    use crate::input::WheelAxis;
    use crate::platform::fake::{Event, FakeDesktop, FakeWindow};

    fn desktop(fake: &Arc<FakeDesktop>, dir: Option<PathBuf>) -> Desktop {
        let config = EngineConfig {
            timings: Timings::default(),
            screenshot_dir: dir,
        };
        Desktop::new(fake.platform(), config)
    }

    #[test]
    fn test_response_omits_empty_fields() {
        let json = serde_json::to_value(ToolResponse::ok("done")).unwrap();
        assert_eq!(json, json!({ "success": true, "message": "done" }));
    }

    #[test]
    fn test_list_windows_shape() {
        let fake = FakeDesktop::new();
        fake.add_window(FakeWindow::new(1, "Notepad", "notepad"));
        fake.add_window(FakeWindow::new(2, "Ghost", "ghost").hidden());

        let resp = desktop(&fake, None).list_windows(false);
        let data = resp.data.unwrap();
        assert!(resp.success);
        assert_eq!(data["count"], 1);
        assert_eq!(data["windows"][0]["title"], "Notepad");
        assert_eq!(data["windows"][0]["processName"], "notepad");
    }

    #[test]
    fn test_no_active_window_is_success() {
        let fake = FakeDesktop::new();
        let resp = desktop(&fake, None).get_active_window();
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("No active window found"));
        assert_eq!(resp.data, Some(Value::Null));
    }

    #[test]
    fn test_focus_window_outcomes() {
        let fake = FakeDesktop::new();
        fake.add_window(FakeWindow::new(4, "Calculator", "calc"));
        let d = desktop(&fake, None);

        assert!(!d.focus_window(None, None).success);
        assert!(d.focus_window(None, None).error.is_some());

        let resp = d.focus_window(None, Some("calc"));
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("Focused window 'calc'"));

        fake.deny_foreground(true);
        let denied = d.focus_window(Some(4), None);
        assert!(!denied.success);
        assert_eq!(denied.message.as_deref(), Some("Failed to focus window ID 4"));
    }

    #[test]
    fn test_take_screenshot_writes_file() {
        let fake = FakeDesktop::new();
        let dir = std::env::temp_dir().join(format!("winpilot-tool-shot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let request = ScreenshotRequest {
            filename: Some("desk".into()),
            ..ScreenshotRequest::default()
        };
        let resp = desktop(&fake, Some(dir.clone())).take_screenshot(&request);

        assert!(resp.success, "{:?}", resp.error);
        let data = resp.data.unwrap();
        let written = std::fs::read(dir.join("desk.png")).unwrap();
        assert_eq!(data["size"], written.len());
        assert_eq!(data["target"], "screen");
        assert!(data["filepath"].as_str().unwrap().ends_with("desk.png"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_screenshot_targets() {
        let fake = FakeDesktop::new();
        let d = desktop(&fake, None);

        let missing = ScreenshotRequest {
            target: CaptureTarget::Window,
            ..ScreenshotRequest::default()
        };
        assert_eq!(
            d.capture_png(&missing).unwrap_err().to_string(),
            "Either windowId or windowName must be specified for window target"
        );

        let active = ScreenshotRequest {
            target: CaptureTarget::ActiveWindow,
            ..ScreenshotRequest::default()
        };
        let resp = d.take_screenshot(&active);
        assert!(!resp.success);
        assert_eq!(
            resp.error.as_deref(),
            Some("Screenshot failed: No active window found")
        );

        let off_screen = ScreenshotRequest {
            screen_id: 3,
            ..ScreenshotRequest::default()
        };
        assert!(d.capture_png(&off_screen).is_err());
    }

    #[test]
    fn test_screenshot_request_parsing() {
        let req: ScreenshotRequest = serde_json::from_value(json!({
            "target": "Active_Window", "screen_id": 1, "windowName": "x"
        }))
        .unwrap();
        assert_eq!(req.target, CaptureTarget::ActiveWindow);
        assert_eq!(req.screen_id, 1);
        assert_eq!(req.window_name.as_deref(), Some("x"));

        let fallback: ScreenshotRequest =
            serde_json::from_value(json!({ "target": "monitor" })).unwrap();
        assert_eq!(fallback.target, CaptureTarget::Screen);
    }

    #[test]
    fn test_scroll_directions() {
        let fake = FakeDesktop::new();
        let d = desktop(&fake, None);

        assert!(d.scroll(Some(1), Some(1), Some("left"), 2).success);
        assert!(d.scroll(Some(1), Some(1), None, 1).success);
        assert!(!d.scroll(Some(1), Some(1), Some("diagonal"), 1).success);

        let wheels: Vec<Event> = fake
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Wheel(..)))
            .collect();
        assert_eq!(
            wheels,
            vec![
                Event::Wheel(WheelAxis::Horizontal, -240),
                Event::Wheel(WheelAxis::Vertical, -120),
            ]
        );
    }

    #[test]
    fn test_input_failures_are_structured() {
        let fake = FakeDesktop::new();
        let d = desktop(&fake, None);

        let resp = d.mouse_click(0, 0, Some("x2"), 1);
        assert!(!resp.success);
        assert_eq!(
            resp.error.as_deref(),
            Some("Mouse click failed: Unknown mouse button: x2")
        );
        assert!(!d.key_combo("ctrl+alt").success);
        assert!(!d.type_text("").success);
        assert!(fake.events().is_empty());
    }

    #[test]
    fn test_dispatch_json_routes_methods() {
        let fake = FakeDesktop::new();
        let d = desktop(&fake, None);

        let moved = d.dispatch_json("mouse_move", json!({ "x": 5, "y": 9 }));
        assert_eq!(moved.message.as_deref(), Some("Moved mouse to (5, 9)"));

        let pos = d.dispatch_json("cursor_position", Value::Null);
        assert_eq!(pos.data.unwrap(), json!({ "x": 5, "y": 9 }));

        let pressed = d.dispatch_json("press_key", json!({ "key": "c", "modifiers": ["ctrl"] }));
        assert_eq!(pressed.message.as_deref(), Some("Pressed key: Ctrl+C"));

        let unknown = d.dispatch_json("reboot", Value::Null);
        assert_eq!(unknown.error.as_deref(), Some("Unknown method: reboot"));

        let bad = d.dispatch_json("mouse_move", json!({ "x": "left" }));
        assert!(!bad.success);
        assert!(bad.error.unwrap().starts_with("Invalid parameters for 'mouse_move'"));
    }

    #[test]
    fn test_run_macro_accepts_string_or_array() {
        let fake = FakeDesktop::new();
        let d = desktop(&fake, None);

        let from_array = d.dispatch_json(
            "run_macro",
            json!({ "commands": [{ "action": "move", "x": 1, "y": 1 }], "name": "arr" }),
        );
        let from_string = d.dispatch_json(
            "run_macro",
            json!({ "commands": "[{\"action\": \"wait\", \"duration\": 1}]" }),
        );

        assert!(from_array.success && from_string.success);
        let data = from_array.data.unwrap();
        assert_eq!(data["commandCount"], 1);
        assert_eq!(data["name"], "arr");
        assert_eq!(data["results"][0], "1. Moved mouse to (1, 1)");
        assert!(from_array
            .message
            .unwrap()
            .starts_with("Macro execution completed in "));
    }

    #[test]
    fn test_run_macro_failures() {
        let fake = FakeDesktop::new();
        let d = desktop(&fake, None);

        let bad = d.run_macro(r#"{"action": "move"}"#, None);
        assert!(!bad.success);
        assert!(bad.error.unwrap().starts_with("Invalid commands JSON format"));

        let failed = d.run_macro(r#"[{"action": "key", "key": "nope"}]"#, None);
        assert!(!failed.success);
        assert!(failed.message.unwrap().starts_with("Macro execution failed in "));
        assert_eq!(failed.data.unwrap()["errorMessage"], "Unknown key: nope");
    }

    #[test]
    fn test_window_state_and_capabilities() {
        let fake = FakeDesktop::new();
        fake.add_window(FakeWindow::new(6, "Paint", "mspaint"));
        let d = desktop(&fake, None);

        let resp = d.dispatch_json("window_state", json!({ "windowId": 6, "state": "minimize" }));
        assert!(resp.success);
        assert!(fake.events().contains(&Event::Show(WindowHandle(6), ShowCommand::Minimize)));

        let caps = d.dispatch_json("get_server_capabilities", Value::Null);
        let data = caps.data.unwrap();
        assert_eq!(data["serverName"], SERVER_NAME);
        assert!(data["tools"]
            .as_array()
            .unwrap()
            .contains(&json!("run_macro")));
    }
}
