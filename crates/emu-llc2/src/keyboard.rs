//! LLC2 ASCII keyboard: the key code with bit 7 set is latched onto
//! PIO A, 0 on release. F2 toggles the graphics key on PIO B2.

use emu_core::{Key, KeyLatch};

pub(crate) struct Llc2Keyboard {
    latch: KeyLatch,
    graphic_key: bool,
}

impl Llc2Keyboard {
    pub fn new() -> Self {
        Self {
            latch: KeyLatch::new(),
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

    pub fn set_key_code(&mut self, key: Key) -> bool {
        let code = match key {
            Key::F(2) => {
                self.graphic_key = !self.graphic_key;
                return true;
            }
            Key::Left => 0x08,
            Key::Right => 0x09,
            Key::Down => 0x0A,
            Key::Up => 0x0B,
            Key::Enter => 0x0D,
            Key::Space => 0x20,
            // In graphics mode the monitor expects a plain backspace.
            Key::Backspace if self.graphic_key => 0x08,
            Key::Backspace | Key::Delete => 0x7F,
            _ => return false,
        };
        self.latch.set(code | 0x80);
        true
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
