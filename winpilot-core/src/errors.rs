//! Error types for `winpilot_core`.
//!
//! All failures are funnelled through [`AutomationError`], which uses
//! `thiserror` for `Display` and `Error` derives.  The `Display` text is the
//! human message that ends up in macro result lines and tool responses, so
//! variants carry no name prefix.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AutomationError>;

/// Top-level error type for the `winpilot_core` library.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// Unresolvable action/key/modifier/button name, or a required field
    /// missing for a command kind.
    #[error("{0}")]
    Argument(String),

    /// Target not found (stale handle, no foreground window, no title
    /// match) or unusable (zero-size window rect).
    #[error("{0}")]
    State(String),

    /// Display index past the end of the enumerated displays.
    #[error("Display index {index} is out of range. Available displays: {count}")]
    DisplayOutOfRange { index: usize, count: usize },

    /// A macro run already holds the engine and the caller declined to queue.
    #[error("A macro run is already in progress")]
    Busy,

    /// An OS call failed (SendInput rejected, GDI failure, enumeration error).
    #[error("{0}")]
    Platform(String),

    /// PNG encoding failure.
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// Writing a screenshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`AutomationError`], for callers that branch
/// on the failure class rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    State,
    Range,
    Busy,
    Platform,
    Encode,
    Io,
}

impl AutomationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Argument(_) => ErrorKind::Argument,
            Self::State(_) => ErrorKind::State,
            Self::DisplayOutOfRange { .. } => ErrorKind::Range,
            Self::Busy => ErrorKind::Busy,
            Self::Platform(_) => ErrorKind::Platform,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}

/// Convert a `windows::core::Error` (Win32 HRESULT failure) into a
/// `AutomationError::Platform`.
#[cfg(windows)]
impl From<windows::core::Error> for AutomationError {
    fn from(err: windows::core::Error) -> Self {
        AutomationError::Platform(format!("Windows API error: {err}"))
    }
}
