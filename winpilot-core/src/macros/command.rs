//! Macro command model and its JSON wire format.
//!
//! Commands are JSON objects tagged by `"action"` (matched
//! case-insensitively).  Fields accept snake_case and camelCase spellings.
//! Unknown fields are ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{AutomationError, Result};
use crate::window::WindowHandle;

const ACTIONS: &[&str] = &[
    "click",
    "move",
    "type",
    "key",
    "scroll",
    "wait",
    "screenshot",
    "focus_window",
];

fn one() -> u32 {
    1
}

/// One step of a macro.  Each variant carries only the fields its action
/// uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MacroCommand {
    Click {
        x: i32,
        y: i32,
        /// `left` when absent.  Validated when the step runs.
        #[serde(default)]
        button: Option<String>,
        #[serde(default = "one")]
        clicks: u32,
    },
    Move {
        x: i32,
        y: i32,
    },
    Type {
        #[serde(default)]
        text: String,
    },
    Key {
        #[serde(default)]
        key: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    Scroll {
        x: i32,
        y: i32,
        /// `"up"` scrolls up; anything else (or nothing) scrolls down.
        #[serde(default, alias = "scrollDirection", alias = "direction")]
        scroll_direction: Option<String>,
    },
    Wait {
        /// Milliseconds.
        #[serde(default, alias = "duration_ms", alias = "durationMs")]
        duration: u64,
    },
    Screenshot {
        #[serde(default)]
        filename: Option<String>,
        #[serde(default, alias = "windowId")]
        window_id: Option<isize>,
        #[serde(default, alias = "windowName")]
        window_name: Option<String>,
    },
    FocusWindow {
        #[serde(default, alias = "windowId")]
        window_id: Option<isize>,
        #[serde(default, alias = "windowName")]
        window_name: Option<String>,
    },
    /// A command that could not be parsed.  Fails with `reason` when the
    /// engine reaches it, so earlier steps still run.
    #[serde(skip)]
    Unsupported { action: String, reason: String },
}

impl MacroCommand {
    /// Action name, for logs.
    pub fn action(&self) -> &str {
        match self {
            MacroCommand::Click { .. } => "click",
            MacroCommand::Move { .. } => "move",
            MacroCommand::Type { .. } => "type",
            MacroCommand::Key { .. } => "key",
            MacroCommand::Scroll { .. } => "scroll",
            MacroCommand::Wait { .. } => "wait",
            MacroCommand::Screenshot { .. } => "screenshot",
            MacroCommand::FocusWindow { .. } => "focus_window",
            MacroCommand::Unsupported { action, .. } => action,
        }
    }

    /// Parse one command object.  Never fails: anything unparseable comes
    /// back as [`MacroCommand::Unsupported`].
    pub fn from_value(mut value: Value) -> Self {
        let action = match value.get("action") {
            Some(Value::String(action)) => action.clone(),
            Some(other) => {
                return Self::unsupported(other.to_string(), "Command 'action' must be a string")
            }
            None => return Self::unsupported(String::new(), "Command is missing an 'action' field"),
        };

        let normalized = action.to_ascii_lowercase();
        if !ACTIONS.contains(&normalized.as_str()) {
            let reason = format!("Unknown command action: {action}");
            return Self::unsupported(action, reason);
        }
        value["action"] = Value::String(normalized);

        match serde_json::from_value(value) {
            Ok(command) => command,
            Err(e) => {
                let reason = format!("Invalid '{action}' command: {e}");
                Self::unsupported(action, reason)
            }
        }
    }

    fn unsupported(action: String, reason: impl Into<String>) -> Self {
        MacroCommand::Unsupported {
            action,
            reason: reason.into(),
        }
    }
}

/// A window id of 0 means "not given".
pub(crate) fn window_target(window_id: Option<isize>) -> Option<WindowHandle> {
    window_id.filter(|&id| id != 0).map(WindowHandle)
}

/// An empty window name means "not given".
pub(crate) fn name_target(window_name: Option<&str>) -> Option<&str> {
    window_name.filter(|name| !name.is_empty())
}

/// Parse a JSON array of commands.
///
/// Only a malformed document or a non-array payload is an error; bad
/// entries become [`MacroCommand::Unsupported`] steps in place.
pub fn parse_commands(json: &str) -> Result<Vec<MacroCommand>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| AutomationError::argument(format!("Invalid macro JSON: {e}")))?;

    match value {
        Value::Array(items) => Ok(items.into_iter().map(MacroCommand::from_value).collect()),
        _ => Err(AutomationError::argument(
            "Macro commands must be a JSON array",
        )),
    }
}
