//! Host key identities, the encoded key latch and the modifier pre-hold
//! window.

use crate::Ticks;

/// Non-character keys a front end can deliver.
///
/// Printable characters arrive as `char` through
/// [`KeyboardInput::key_typed`](crate::KeyboardInput::key_typed); only
/// keys without a character code come through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Backspace,
    Tab,
    Enter,
    Space,
    Delete,
    Insert,
    Escape,
    Home,
    End,
    PageUp,
    PageDown,
    Pause,
    /// Function key F1-F12.
    F(u8),
}

/// A key matrix as the scanning hardware sees it.
///
/// Event methods replace the whole pressed set: the host delivers one
/// key at a time and a new key implies the previous one was released.
pub trait KeyboardMatrix {
    /// Press the key(s) producing `ch`. A character found only in the
    /// shifted table also presses shift.
    fn set_key_char(&mut self, ch: char) -> bool;

    /// Press a non-character key.
    fn set_key_code(&mut self, key: Key, shift: bool) -> bool;

    fn key_released(&mut self);

    /// Pressed bits of column `col` (1 = pressed). `aux` is the board's
    /// row-set select line, where it has one.
    fn row_values_for(&self, col: usize, aux: bool) -> u8;
}

/// Modifier pre-hold.
///
/// Membrane keyboards with shift keys in the matrix need the shift key
/// to be seen before the character key, otherwise the monitor decodes
/// the unshifted key first. While the window runs only the modifier bits
/// are presented; when it expires the full key set becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreHold {
    window: Ticks,
    remaining: Ticks,
}

impl PreHold {
    #[must_use]
    pub const fn new(window: Ticks) -> Self {
        Self {
            window,
            remaining: Ticks::ZERO,
        }
    }

    /// Start the window. A zero window never holds.
    pub fn arm(&mut self) {
        self.remaining = self.window;
    }

    pub fn cancel(&mut self) {
        self.remaining = Ticks::ZERO;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.remaining.is_zero()
    }

    #[must_use]
    pub fn window(&self) -> Ticks {
        self.window
    }

    /// Advance by `cycles`. Returns `true` when the window ended during
    /// this call.
    pub fn advance(&mut self, cycles: Ticks) -> bool {
        if self.remaining.is_zero() {
            return false;
        }
        self.remaining -= cycles;
        self.remaining.is_zero()
    }
}

/// Output latch of an encoded keyboard.
///
/// Boards with an ASCII keyboard see a single byte instead of a matrix.
/// The input context sets the latch; the board takes the change on its
/// own schedule and copies it into the port it reads the key from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyLatch {
    value: u8,
    changed: bool,
}

impl KeyLatch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0,
            changed: false,
        }
    }

    pub fn set(&mut self, value: u8) {
        self.value = value;
        self.changed = true;
    }

    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// The latched byte, if it was set since the last call.
    pub fn take_change(&mut self) -> Option<u8> {
        std::mem::take(&mut self.changed).then_some(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_change_is_taken_once() {
        let mut latch = KeyLatch::new();
        assert_eq!(latch.take_change(), None);
        latch.set(0xC1);
        assert_eq!(latch.take_change(), Some(0xC1));
        assert_eq!(latch.take_change(), None);
        assert_eq!(latch.value(), 0xC1);
        latch.set(0);
        assert_eq!(latch.take_change(), Some(0));
    }

    #[test]
    fn window_expires_after_configured_cycles() {
        let mut hold = PreHold::new(Ticks::new(100));
        assert!(!hold.is_active());
        hold.arm();
        assert!(hold.is_active());
        assert!(!hold.advance(Ticks::new(60)));
        assert!(hold.advance(Ticks::new(60)));
        assert!(!hold.is_active());
        assert!(!hold.advance(Ticks::new(60)));
    }

    #[test]
    fn zero_window_never_holds() {
        let mut hold = PreHold::new(Ticks::ZERO);
        hold.arm();
        assert!(!hold.is_active());
    }
}
