//! Virtual key codes, key-name resolution and key-combo parsing.
//!
//! Codes are the Win32 virtual-key values.  Name resolution is a fixed
//! table of named keys plus single ASCII letters and digits mapped
//! arithmetically from `A` / `0`.

use std::fmt;

use serde::Serialize;

use crate::errors::{AutomationError, Result};

/// A Win32 virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VirtualKey(pub u16);

impl VirtualKey {
    pub const BACK: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const RETURN: Self = Self(0x0D);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    pub const MENU: Self = Self(0x12);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    pub const PRIOR: Self = Self(0x21);
    pub const NEXT: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
    pub const KEY_0: Self = Self(0x30);
    pub const KEY_A: Self = Self(0x41);
    pub const LWIN: Self = Self(0x5B);
    pub const F1: Self = Self(0x70);
    pub const F12: Self = Self(0x7B);

    pub fn code(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::BACK => "Backspace",
            Self::TAB => "Tab",
            Self::RETURN => "Enter",
            Self::SHIFT => "Shift",
            Self::CONTROL => "Ctrl",
            Self::MENU => "Alt",
            Self::ESCAPE => "Escape",
            Self::SPACE => "Space",
            Self::PRIOR => "PageUp",
            Self::NEXT => "PageDown",
            Self::END => "End",
            Self::HOME => "Home",
            Self::LEFT => "Left",
            Self::UP => "Up",
            Self::RIGHT => "Right",
            Self::DOWN => "Down",
            Self::INSERT => "Insert",
            Self::DELETE => "Delete",
            Self::LWIN => "Win",
            Self(code @ 0x30..=0x39) | Self(code @ 0x41..=0x5A) => {
                return write!(f, "{}", char::from(code as u8));
            }
            Self(code @ 0x70..=0x7B) => return write!(f, "F{}", code - 0x6F),
            Self(code) => return write!(f, "VK_0x{code:02X}"),
        };
        f.write_str(name)
    }
}

/// Modifier keys recognised in key combos and macro `key` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl Modifier {
    pub fn vk(self) -> VirtualKey {
        match self {
            Modifier::Ctrl => VirtualKey::CONTROL,
            Modifier::Alt => VirtualKey::MENU,
            Modifier::Shift => VirtualKey::SHIFT,
            Modifier::Win => VirtualKey::LWIN,
        }
    }

    /// Combo token set: `ctrl`/`control`, `alt`, `shift`, `win`/`windows`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "alt" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "win" | "windows" => Some(Modifier::Win),
            _ => None,
        }
    }

    /// Resolve a modifier named in a macro `key` step.  Also accepts `cmd`
    /// for the Windows key.
    pub fn resolve(name: &str) -> Result<Self> {
        Self::from_token(name)
            .or_else(|| name.eq_ignore_ascii_case("cmd").then_some(Modifier::Win))
            .ok_or_else(|| AutomationError::argument(format!("Unknown modifier: {name}")))
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.vk(), f)
    }
}

/// Resolve a key name to a virtual key code (case-insensitive).
pub fn resolve_key(name: &str) -> Result<VirtualKey> {
    let lower = name.to_ascii_lowercase();
    let vk = match lower.as_str() {
        "enter" | "return" => VirtualKey::RETURN,
        "space" => VirtualKey::SPACE,
        "tab" => VirtualKey::TAB,
        "escape" | "esc" => VirtualKey::ESCAPE,
        "backspace" => VirtualKey::BACK,
        "delete" | "del" => VirtualKey::DELETE,
        "insert" => VirtualKey::INSERT,
        "home" => VirtualKey::HOME,
        "end" => VirtualKey::END,
        "pageup" => VirtualKey::PRIOR,
        "pagedown" => VirtualKey::NEXT,
        "up" => VirtualKey::UP,
        "down" => VirtualKey::DOWN,
        "left" => VirtualKey::LEFT,
        "right" => VirtualKey::RIGHT,
        _ => return resolve_function_or_char(&lower, name),
    };
    Ok(vk)
}

fn resolve_function_or_char(lower: &str, original: &str) -> Result<VirtualKey> {
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u16>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(VirtualKey(VirtualKey::F1.0 + n - 1));
        }
    }

    let mut chars = lower.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            return Ok(VirtualKey(VirtualKey::KEY_A.0 + (c as u16 - 'a' as u16)));
        }
        if c.is_ascii_digit() {
            return Ok(VirtualKey(VirtualKey::KEY_0.0 + (c as u16 - '0' as u16)));
        }
    }

    Err(AutomationError::argument(format!("Unknown key: {original}")))
}

/// A parsed combo: modifiers in the order given plus one main key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub modifiers: Vec<Modifier>,
    pub key: VirtualKey,
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{m}+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parse a `+`-delimited combo such as `"ctrl+shift+s"`.
///
/// Exactly one non-modifier token is required.
pub fn parse_combo(combo: &str) -> Result<KeyChord> {
    let mut modifiers = Vec::new();
    let mut key: Option<VirtualKey> = None;

    for token in combo.split('+').map(str::trim) {
        if let Some(m) = Modifier::from_token(token) {
            modifiers.push(m);
            continue;
        }
        let vk = resolve_key(token)?;
        if key.replace(vk).is_some() {
            return Err(AutomationError::argument(format!(
                "Key combo '{combo}' has more than one non-modifier key"
            )));
        }
    }

    let key = key.ok_or_else(|| {
        AutomationError::argument(format!("Key combo '{combo}' has no non-modifier key"))
    })?;
    Ok(KeyChord { modifiers, key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_named_keys() {
        assert_eq!(resolve_key("Enter").unwrap(), VirtualKey::RETURN);
        assert_eq!(resolve_key("return").unwrap(), VirtualKey::RETURN);
        assert_eq!(resolve_key("ESC").unwrap(), VirtualKey::ESCAPE);
        assert_eq!(resolve_key("del").unwrap(), VirtualKey::DELETE);
        assert_eq!(resolve_key("pagedown").unwrap(), VirtualKey::NEXT);
        assert_eq!(resolve_key("f1").unwrap(), VirtualKey::F1);
        assert_eq!(resolve_key("F12").unwrap(), VirtualKey::F12);
    }

    #[test]
    fn test_letters_and_digits_are_arithmetic() {
        assert_eq!(resolve_key("a").unwrap(), VirtualKey(0x41));
        assert_eq!(resolve_key("Z").unwrap(), VirtualKey(0x5A));
        assert_eq!(resolve_key("0").unwrap(), VirtualKey(0x30));
        assert_eq!(resolve_key("9").unwrap(), VirtualKey(0x39));
    }

    #[test]
    fn test_unknown_keys() {
        for name in ["f13", "f0", "ab", "", "é", "numlock"] {
            let err = resolve_key(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument, "{name}");
        }
        assert_eq!(resolve_key("numlock").unwrap_err().to_string(), "Unknown key: numlock");
    }

    #[test]
    fn test_combo_parsing() {
        let chord = parse_combo("Ctrl+Shift+S").unwrap();
        assert_eq!(chord.modifiers, vec![Modifier::Ctrl, Modifier::Shift]);
        assert_eq!(chord.key, VirtualKey(0x53));
        assert_eq!(chord.to_string(), "Ctrl+Shift+S");

        let chord = parse_combo("control + windows + f4").unwrap();
        assert_eq!(chord.modifiers, vec![Modifier::Ctrl, Modifier::Win]);
        assert_eq!(chord.key, VirtualKey(0x73));
    }

    #[test]
    fn test_combo_without_main_key_fails() {
        let err = parse_combo("ctrl+alt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert!(err.to_string().contains("no non-modifier key"));
    }

    #[test]
    fn test_combo_with_two_main_keys_fails() {
        assert!(parse_combo("ctrl+a+b").is_err());
    }

    #[test]
    fn test_modifier_aliases() {
        assert_eq!(Modifier::resolve("CONTROL").unwrap(), Modifier::Ctrl);
        assert_eq!(Modifier::resolve("cmd").unwrap(), Modifier::Win);
        assert!(Modifier::from_token("cmd").is_none());
        assert_eq!(
            Modifier::resolve("hyper").unwrap_err().to_string(),
            "Unknown modifier: hyper"
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(VirtualKey::CONTROL.to_string(), "Ctrl");
        assert_eq!(VirtualKey(0x74).to_string(), "F5");
        assert_eq!(VirtualKey(0x37).to_string(), "7");
        assert_eq!(VirtualKey(0xAD).to_string(), "VK_0xAD");
    }
}
