//! AC1 ASCII keyboard.
//!
//! The keyboard delivers a 7-bit code with bit 7 set as strobe onto
//! PIO A; releasing the key latches 0. F2 is the SCCH graphics key, read
//! low active on PIO B2.

use emu_core::{Key, KeyLatch};

pub(crate) struct Ac1Keyboard {
    latch: KeyLatch,
    scch: bool,
    graphic_key: bool,
}

impl Ac1Keyboard {
    pub fn new(scch: bool) -> Self {
        Self {
            latch: KeyLatch::new(),
            scch,
            graphic_key: false,
        }
    }

    pub fn graphic_key(&self) -> bool {
        self.graphic_key
    }

    pub fn take_change(&mut self) -> Option<u8> {
        self.latch.take_change()
    }

    pub fn reset(&mut self) {
        self.graphic_key = false;
        self.latch.set(0);
    }

    fn code_for(&self, key: Key) -> Option<u8> {
        Some(match key {
            Key::Left => 0x08,
            Key::Right => 0x09,
            Key::Down => 0x0A,
            Key::Up => 0x0B,
            Key::Enter => 0x0D,
            Key::Space => 0x20,
            Key::Backspace if self.scch => 0x7F,
            Key::Backspace => 0x08,
            Key::Delete if self.scch => 0x04,
            Key::Delete => 0x7F,
            Key::Insert => 0x05,
            Key::PageUp => 0x11,
            Key::PageDown => 0x15,
            Key::Home => 0x01,
            Key::End => 0x1A,
            _ => return None,
        })
    }

    pub fn set_key_code(&mut self, key: Key) -> bool {
        if key == Key::F(2) {
            if self.scch {
                self.graphic_key = !self.graphic_key;
            }
            return true;
        }
        match self.code_for(key) {
            Some(code) => {
                self.latch.set(code | 0x80);
                true
            }
            None => false,
        }
    }

    pub fn set_key_char(&mut self, ch: char) -> bool {
        match u8::try_from(ch) {
            Ok(code @ 0x01..=0x7E) => {
                self.latch.set(code | 0x80);
                true
            }
            _ => false,
        }
    }

    pub fn key_released(&mut self) {
        self.latch.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_characters_carry_strobe_bit() {
        let mut kb = Ac1Keyboard::new(false);
        assert!(kb.set_key_char('a'));
        assert_eq!(kb.take_change(), Some(0xE1));
        assert!(!kb.set_key_char('\u{7F}'));
        assert!(!kb.set_key_char('ä'));
        kb.key_released();
        assert_eq!(kb.take_change(), Some(0));
    }

    #[test]
    fn scch_swaps_delete_keys() {
        let mut kb = Ac1Keyboard::new(false);
        kb.set_key_code(Key::Backspace);
        assert_eq!(kb.take_change(), Some(0x88));
        let mut kb = Ac1Keyboard::new(true);
        kb.set_key_code(Key::Backspace);
        assert_eq!(kb.take_change(), Some(0xFF));
        kb.set_key_code(Key::Delete);
        assert_eq!(kb.take_change(), Some(0x84));
    }

    #[test]
    fn graphic_key_only_with_scch() {
        let mut kb = Ac1Keyboard::new(false);
        assert!(kb.set_key_code(Key::F(2)));
        assert!(!kb.graphic_key());
        let mut kb = Ac1Keyboard::new(true);
        kb.set_key_code(Key::F(2));
        assert!(kb.graphic_key());
        assert_eq!(kb.take_change(), None);
        assert!(!kb.set_key_code(Key::Pause));
    }
}
