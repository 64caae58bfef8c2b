use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Serialize, Serializer};

use super::command::{name_target, window_target, MacroCommand};
use super::naming;
use crate::capture::CaptureService;
use crate::config::{EngineConfig, MACRO_SCROLL_NOTCHES};
use crate::errors::{AutomationError, Result};
use crate::input::{Keyboard, Mouse, MouseButton};
use crate::keys::{self, KeyChord, Modifier};
use crate::platform::{Pacer, Platform};
use crate::window::{TitleMatch, WindowRegistry};

/// Outcome of one macro run.
///
/// `results` has one line per attempted step, so it is shorter than the
/// submitted list exactly when the run stopped on a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroResult {
    pub name: Option<String>,
    pub results: Vec<String>,
    pub success: bool,
    /// Set iff a step failed.
    pub error_message: Option<String>,
    #[serde(rename = "executionTimeMs", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Runs macros against the input emitter, window registry and capture
/// service.
///
/// Runs are serialized: the desktop's input, focus and cursor state has no
/// per-caller isolation, so at most one run holds the engine at a time.
pub struct MacroEngine {
    keyboard: Keyboard,
    mouse: Mouse,
    windows: WindowRegistry,
    capture: CaptureService,
    pacer: Arc<dyn Pacer>,
    config: EngineConfig,
    run_lock: Mutex<()>,
}

impl MacroEngine {
    pub fn new(platform: &Platform, config: EngineConfig) -> Self {
        let timings = config.timings;
        let windows =
            WindowRegistry::new(platform.windows.clone(), platform.pacer.clone(), timings);

        Self {
            keyboard: Keyboard::new(platform.input.clone(), platform.pacer.clone(), timings),
            mouse: Mouse::new(platform.input.clone(), platform.pacer.clone(), timings),
            capture: CaptureService::with_registry(platform.screen.clone(), windows.clone()),
            windows,
            pacer: platform.pacer.clone(),
            config,
            run_lock: Mutex::new(()),
        }
    }

    /// Run `commands`, queueing behind any run already in progress.
    pub fn execute(&self, commands: &[MacroCommand], name: Option<&str>) -> MacroResult {
        let _guard = self.run_lock.lock();
        self.run(commands, name)
    }

    /// Run `commands` only if the engine is idle.
    pub fn try_execute(&self, commands: &[MacroCommand], name: Option<&str>) -> Result<MacroResult> {
        let _guard = self.run_lock.try_lock().ok_or(AutomationError::Busy)?;
        Ok(self.run(commands, name))
    }

    pub fn is_running(&self) -> bool {
        self.run_lock.is_locked()
    }

    /// Run `f` while holding the run lock, so single-shot input never
    /// interleaves with a macro.  Queues behind a run in progress.
    pub fn exclusive<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.run_lock.lock();
        f()
    }

    fn run(&self, commands: &[MacroCommand], name: Option<&str>) -> MacroResult {
        let label = name.unwrap_or("<unnamed>");
        log::info!("macro {label}: starting {} command(s)", commands.len());

        let started = Instant::now();
        let mut results = Vec::with_capacity(commands.len());
        let mut error_message = None;

        for (i, command) in commands.iter().enumerate() {
            let step = i + 1;
            match self.dispatch(command) {
                Ok(description) => results.push(format!("{step}. {description}")),
                Err(e) => {
                    let message = e.to_string();
                    log::warn!("macro {label}: step {step} ({}) failed: {message}", command.action());
                    results.push(format!("{step}. Error: {message}"));
                    error_message = Some(message);
                    break;
                }
            }

            if step < commands.len() {
                self.pacer.pause(self.config.timings.inter_command);
            }
        }

        let elapsed = started.elapsed();
        let success = error_message.is_none();
        log::info!(
            "macro {label}: {} after {}/{} step(s) in {}ms",
            if success { "completed" } else { "failed" },
            results.len(),
            commands.len(),
            elapsed.as_millis()
        );

        MacroResult {
            name: name.map(str::to_string),
            results,
            success,
            error_message,
            elapsed,
        }
    }

    /// Execute one step and describe what happened.
    fn dispatch(&self, command: &MacroCommand) -> Result<String> {
        log::debug!("dispatch: {command:?}");
        match command {
            MacroCommand::Click {
                x,
                y,
                button,
                clicks,
            } => {
                let button: MouseButton = button.as_deref().unwrap_or("left").parse()?;
                self.mouse.click_at(*x, *y, button, *clicks)?;
                Ok(format!(
                    "Clicked {button} button at ({x}, {y}) {clicks} time(s)"
                ))
            }

            MacroCommand::Move { x, y } => {
                self.mouse.move_to(*x, *y)?;
                Ok(format!("Moved mouse to ({x}, {y})"))
            }

            MacroCommand::Type { text } => {
                if text.is_empty() {
                    return Err(AutomationError::argument("Text is required for type command"));
                }
                self.keyboard.type_text(text)?;
                Ok(format!("Typed text: '{text}'"))
            }

            MacroCommand::Key { key, modifiers } => {
                if key.is_empty() {
                    return Err(AutomationError::argument("Key is required for key command"));
                }
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
            }

            MacroCommand::Scroll {
                x,
                y,
                scroll_direction,
            } => {
                let direction = scroll_direction
                    .as_deref()
                    .unwrap_or("down")
                    .to_lowercase();
                let notches = if direction == "up" {
                    MACRO_SCROLL_NOTCHES
                } else {
                    -MACRO_SCROLL_NOTCHES
                };
                self.mouse.scroll_vertical(notches, Some(*x), Some(*y))?;
                Ok(format!("Scrolled {direction} at ({x}, {y})"))
            }

            MacroCommand::Wait { duration } => {
                self.pacer.pause(Duration::from_millis(*duration));
                Ok(format!("Waited {duration} ms"))
            }

            MacroCommand::Screenshot {
                filename,
                window_id,
                window_name,
            } => {
                let filename = naming::screenshot_filename(filename.as_deref());
                let png = if let Some(handle) = window_target(*window_id) {
                    self.capture.capture_window(handle)?
                } else if let Some(title) = name_target(window_name.as_deref()) {
                    self.capture
                        .capture_window_by_title(title, TitleMatch::Substring)?
                } else {
                    self.capture.capture_screen(0)?
                };

                let path = naming::resolve_output_path(&self.config.output_dir(), &filename);
                std::fs::write(&path, &png)?;
                Ok(format!("Screenshot saved: {}", path.display()))
            }

            MacroCommand::FocusWindow {
                window_id,
                window_name,
            } => {
                let (focused, target) = if let Some(handle) = window_target(*window_id) {
                    (
                        self.windows.focus_window(handle),
                        format!("window ID {}", handle.0),
                    )
                } else if let Some(title) = name_target(window_name.as_deref()) {
                    (
                        self.windows
                            .focus_window_by_title(title, TitleMatch::Substring)?,
                        format!("window '{title}'"),
                    )
                } else {
                    return Err(AutomationError::argument(
                        "Either windowId or windowName must be specified for focus_window command",
                    ));
                };

                Ok(if focused {
                    format!("Focused {target}")
                } else {
                    format!("Failed to focus {target}")
                })
            }

            MacroCommand::Unsupported { reason, .. } => {
                Err(AutomationError::argument(reason.clone()))
            }
        }
    }
}
