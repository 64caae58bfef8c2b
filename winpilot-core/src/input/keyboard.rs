use std::sync::Arc;

use crate::config::Timings;
use crate::errors::Result;
use crate::keys::{self, Modifier, VirtualKey};
use crate::platform::{InputDevice, Pacer};

/// Keyboard half of the input emitter.
#[derive(Clone)]
pub struct Keyboard {
    device: Arc<dyn InputDevice>,
    pacer: Arc<dyn Pacer>,
    timings: Timings,
}

impl Keyboard {
    pub fn new(device: Arc<dyn InputDevice>, pacer: Arc<dyn Pacer>, timings: Timings) -> Self {
        Self {
            device,
            pacer,
            timings,
        }
    }

    /// Type `text` one character at a time.
    ///
    /// `\n` becomes Enter, `\t` becomes Tab, everything else is injected as
    /// a Unicode character.  A fixed delay follows every character so the
    /// input queue does not coalesce or drop events.
    pub fn type_text(&self, text: &str) -> Result<()> {
        log::debug!("type_text: {} chars", text.chars().count());
        for ch in text.chars() {
            match ch {
                '\n' => self.press_key(VirtualKey::RETURN, &[])?,
                '\t' => self.press_key(VirtualKey::TAB, &[])?,
                c => self.device.unicode_char(c)?,
            }
            self.pacer.pause(self.timings.inter_char);
        }
        Ok(())
    }

    /// Press `key` with `modifiers` held.
    ///
    /// Modifiers go down in the order given, the main key is pressed, held
    /// and released, then modifiers come up in reverse order.  If an event
    /// is rejected part-way, any modifiers already down are released before
    /// the error is returned.
    pub fn press_key(&self, key: VirtualKey, modifiers: &[Modifier]) -> Result<()> {
        log::debug!("press_key: {key} with {} modifier(s)", modifiers.len());

        for (pressed, m) in modifiers.iter().enumerate() {
            if let Err(e) = self.device.key_down(m.vk()) {
                self.release_modifiers(&modifiers[..pressed]);
                return Err(e);
            }
            self.pacer.pause(self.timings.modifier_gap);
        }

        let main = self.device.key_down(key).and_then(|()| {
            self.pacer.pause(self.timings.key_hold);
            self.device.key_up(key)
        });
        if let Err(e) = main {
            self.release_modifiers(modifiers);
            return Err(e);
        }

        for m in modifiers.iter().rev() {
            self.pacer.pause(self.timings.modifier_gap);
            self.device.key_up(m.vk())?;
        }
        Ok(())
    }

    /// Chord of arbitrary keys: press all in order, hold, release in reverse.
    pub fn press_keys(&self, keys: &[VirtualKey]) -> Result<()> {
        for &key in keys {
            self.device.key_down(key)?;
            self.pacer.pause(self.timings.modifier_gap);
        }

        self.pacer.pause(self.timings.key_hold);

        for &key in keys.iter().rev() {
            self.device.key_up(key)?;
            self.pacer.pause(self.timings.modifier_gap);
        }
        Ok(())
    }

    pub fn hold_key(&self, key: VirtualKey) -> Result<()> {
        self.device.key_down(key)
    }

    pub fn release_key(&self, key: VirtualKey) -> Result<()> {
        self.device.key_up(key)
    }

    pub fn is_key_pressed(&self, key: VirtualKey) -> bool {
        self.device.is_key_down(key)
    }

    /// Parse and press a combo such as `"ctrl+shift+s"`.  Nothing is
    /// pressed when the combo does not parse.
    pub fn send_key_combo(&self, combo: &str) -> Result<()> {
        let chord = keys::parse_combo(combo)?;
        self.press_key(chord.key, &chord.modifiers)
    }

    fn release_modifiers(&self, pressed: &[Modifier]) {
        for m in pressed.iter().rev() {
            if let Err(e) = self.device.key_up(m.vk()) {
                log::warn!("failed to release {m} after aborted key press: {e}");
            }
        }
    }
}
