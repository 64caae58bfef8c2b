//! Engine configuration: settle delays and output locations.
//!
//! Every field has a default, so an empty JSON object (or no config file at
//! all) yields the stock timings.  Durations are written as milliseconds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{AutomationError, Result};

/// Fraction of the display work area a window must cover, in both
/// dimensions, to be classified as maximized.
///
/// This is a best-effort classifier, not a verified OS state.
pub const MAXIMIZED_WORK_AREA_RATIO: f64 = 0.9;

/// Wheel notches per macro `scroll` step.
pub const MACRO_SCROLL_NOTCHES: i32 = 3;

/// Settle delays applied between synthesized events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// After every typed character.
    #[serde(with = "millis")]
    pub inter_char: Duration,
    /// Between successive modifier presses and releases.
    #[serde(with = "millis")]
    pub modifier_gap: Duration,
    /// Main key held down before release.
    #[serde(with = "millis")]
    pub key_hold: Duration,
    /// Between mouse button down and up.
    #[serde(with = "millis")]
    pub button_gap: Duration,
    /// Between repeated clicks.
    #[serde(with = "millis")]
    pub click_gap: Duration,
    /// After moving the cursor, before clicking or scrolling.
    #[serde(with = "millis")]
    pub cursor_settle: Duration,
    /// After pressing and after moving during a drag.
    #[serde(with = "millis")]
    pub drag_settle: Duration,
    /// After restoring a minimized window, before requesting foreground.
    #[serde(with = "millis")]
    pub restore_settle: Duration,
    /// Between macro commands (never after the last one).
    #[serde(with = "millis")]
    pub inter_command: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            inter_char: Duration::from_millis(10),
            modifier_gap: Duration::from_millis(10),
            key_hold: Duration::from_millis(50),
            button_gap: Duration::from_millis(10),
            click_gap: Duration::from_millis(50),
            cursor_settle: Duration::from_millis(10),
            drag_settle: Duration::from_millis(50),
            restore_settle: Duration::from_millis(100),
            inter_command: Duration::from_millis(100),
        }
    }
}

/// Top-level configuration shared by the engine and the tool entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timings: Timings,
    /// Directory for relative screenshot filenames.  `None` means the
    /// process working directory.
    pub screenshot_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Load a JSON config file.  Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw).map_err(|e| {
            AutomationError::argument(format!("invalid config {}: {e}", path.display()))
        })
    }

    pub fn from_json_str(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Directory relative screenshot paths resolve against.
    pub fn output_dir(&self) -> PathBuf {
        self.screenshot_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let t = Timings::default();
        assert_eq!(t.inter_char, Duration::from_millis(10));
        assert_eq!(t.key_hold, Duration::from_millis(50));
        assert_eq!(t.restore_settle, Duration::from_millis(100));
        assert_eq!(t.inter_command, Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json_str(
            r#"{"timings": {"inter_command": 250}, "screenshot_dir": "C:\\shots"}"#,
        )
        .unwrap();
        assert_eq!(cfg.timings.inter_command, Duration::from_millis(250));
        assert_eq!(cfg.timings.inter_char, Duration::from_millis(10));
        assert_eq!(cfg.screenshot_dir, Some(PathBuf::from("C:\\shots")));
    }

    #[test]
    fn test_timings_serialize_as_millis() {
        let json = serde_json::to_value(Timings::default()).unwrap();
        assert_eq!(json["click_gap"], 50);
        assert_eq!(json["drag_settle"], 50);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Io);
    }
}
