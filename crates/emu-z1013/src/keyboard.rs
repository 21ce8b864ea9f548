//! Z1013 keyboards.
//!
//! The monitor selects a column by writing its number to port 08 and
//! reads four row lines on PIO B0-B3 (active low). Two keyboards exist:
//!
//! - the original **8x4 membrane** keyboard. Four shift keys S1-S4 sit
//!   on row bit 3 of columns 0-3 and select one of four characters per
//!   key;
//! - the **8x8 alpha** keyboard. Eight rows per column, read as two
//!   nibbles; PIO B4 selects the upper nibble.
//!
//! # 8x4 layout (unshifted characters)
//!
//! | Row \ Col | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 |
//! |-----------|---|---|---|---|---|---|---|---|
//! | 0 (`0x01`)| @ | A | B | C | D | E | F | G |
//! | 1 (`0x02`)| H | I | J | K | L | M | N | O |
//! | 2 (`0x04`)| P | Q | R | S | T | U | V | W |
//! | 3 (`0x08`)| S1| S2| S3| S4| ← | SP| → | ENT |

use emu_core::{Key, KeyboardMatrix, PreHold, Ticks};

use crate::config::KeyboardKind;

const SHIFT_BIT: u8 = 0x08;

/// The 8x4 membrane matrix.
#[derive(Debug, Clone, Default)]
pub struct Matrix8x4 {
    columns: [u8; 8],
    hex_mode: bool,
}

impl Matrix8x4 {
    /// In hex input mode the monitor expects `0-9` without and `H-W`
    /// with S1, the reverse of the normal encoding.
    pub fn set_hex_mode(&mut self, hex_mode: bool) {
        self.hex_mode = hex_mode;
    }

    /// Whether any of S1-S4 is pressed.
    #[must_use]
    pub fn shift_pressed(&self) -> bool {
        self.columns[..4].iter().any(|c| c & SHIFT_BIT != 0)
    }

    fn shift(&mut self, n: usize) {
        self.columns[n] |= SHIFT_BIT;
    }

    fn press_code(&mut self, code: u8) -> bool {
        if code == 0 || code > 0x7F {
            return false;
        }
        let col = usize::from(code & 0x07);
        let (row_bit, shift) = match code & 0xF8 {
            b'@' => (0x01, None),
            b'H' => (0x02, self.hex_mode.then_some(0)),
            b'P' => (0x04, self.hex_mode.then_some(0)),
            b'X' => (0x01, Some(0)),
            b'0' => (0x02, (!self.hex_mode).then_some(0)),
            b'8' => (0x04, (!self.hex_mode).then_some(0)),
            b'x' => (0x01, Some(1)),
            b' ' => (0x02, Some(1)),
            b'(' => (0x04, Some(1)),
            b'`' => (0x01, Some(2)),
            b'h' => (0x02, Some(2)),
            b'p' => (0x04, Some(2)),
            0x10 => (0x01, Some(3)),
            0x00 => (0x02, Some(3)),
            0x08 => (0x04, Some(3)),
            _ => return false,
        };
        self.columns[col] |= row_bit;
        if let Some(n) = shift {
            self.shift(n);
        }
        true
    }
}

impl KeyboardMatrix for Matrix8x4 {
    fn set_key_char(&mut self, ch: char) -> bool {
        self.key_released();
        u8::try_from(ch).is_ok_and(|code| self.press_code(code))
    }

    fn set_key_code(&mut self, key: Key, _shift: bool) -> bool {
        self.key_released();
        match key {
            Key::Left => self.columns[4] = SHIFT_BIT,
            Key::Space => self.columns[5] = SHIFT_BIT,
            Key::Right => self.columns[6] = SHIFT_BIT,
            Key::Enter => self.columns[7] = SHIFT_BIT,
            Key::Backspace => return self.press_code(0x08),
            Key::Tab => return self.press_code(0x09),
            Key::Down => return self.press_code(0x0A),
            Key::Up => return self.press_code(0x0B),
            Key::Delete => return self.press_code(0x7F),
            Key::F(n @ 1..=4) => self.shift(usize::from(n - 1)),
            _ => return false,
        }
        true
    }

    fn key_released(&mut self) {
        self.columns = [0; 8];
    }

    fn row_values_for(&self, col: usize, _aux: bool) -> u8 {
        self.columns.get(col).copied().unwrap_or(0)
    }
}

/// One key of the alpha keyboard: unshifted character, shifted
/// character, column, row bit.
type AlphaKey = (char, Option<char>, usize, u8);

const ALPHA_KEYS: &[AlphaKey] = &[
    ('\\', Some('|'), 5, 0x40),
    ('1', Some('!'), 0, 0x01),
    ('2', Some('"'), 0, 0x10),
    ('3', Some('#'), 1, 0x01),
    ('4', Some('$'), 1, 0x10),
    ('5', Some('%'), 2, 0x01),
    ('6', Some('&'), 2, 0x10),
    ('7', Some('\''), 3, 0x01),
    ('8', Some('('), 3, 0x10),
    ('9', Some(')'), 4, 0x01),
    ('0', None, 4, 0x10),
    ('-', Some('='), 5, 0x01),
    ('^', Some('~'), 5, 0x08),
    ('Q', Some('q'), 0, 0x02),
    ('W', Some('w'), 0, 0x20),
    ('E', Some('e'), 1, 0x02),
    ('R', Some('r'), 1, 0x20),
    ('T', Some('t'), 2, 0x02),
    ('Z', Some('z'), 2, 0x20),
    ('U', Some('u'), 3, 0x02),
    ('I', Some('i'), 3, 0x20),
    ('O', Some('o'), 4, 0x02),
    ('P', Some('p'), 4, 0x20),
    ('@', Some('`'), 5, 0x02),
    ('[', Some('{'), 5, 0x10),
    ('A', Some('a'), 0, 0x04),
    ('S', Some('s'), 0, 0x40),
    ('D', Some('d'), 1, 0x04),
    ('F', Some('f'), 1, 0x40),
    ('G', Some('g'), 2, 0x04),
    ('H', Some('h'), 2, 0x40),
    ('J', Some('j'), 3, 0x04),
    ('K', Some('k'), 3, 0x40),
    ('L', Some('l'), 4, 0x04),
    ('+', Some(';'), 4, 0x40),
    ('*', Some(':'), 5, 0x04),
    (']', Some('}'), 5, 0x20),
    ('_', None, 5, 0x80),
    ('Y', Some('y'), 0, 0x08),
    ('X', Some('x'), 0, 0x80),
    ('C', Some('c'), 1, 0x08),
    ('V', Some('v'), 1, 0x80),
    ('B', Some('b'), 2, 0x08),
    ('N', Some('n'), 2, 0x80),
    ('M', Some('m'), 3, 0x08),
    (',', Some('<'), 3, 0x80),
    ('.', Some('>'), 4, 0x08),
    ('/', Some('?'), 4, 0x80),
];

const ALPHA_SHIFT: (usize, u8) = (7, 0x40);
const ALPHA_CTRL: (usize, u8) = (6, 0x20);

/// The 8x8 alpha matrix.
#[derive(Debug, Clone, Default)]
pub struct Matrix8x8 {
    columns: [u8; 8],
}

impl Matrix8x8 {
    fn press(&mut self, (col, bit): (usize, u8)) {
        self.columns[col] |= bit;
    }

    /// Whether Shift or Ctrl is pressed.
    #[must_use]
    pub fn modifier_pressed(&self) -> bool {
        self.modifier_bits(ALPHA_SHIFT.0) != 0 || self.modifier_bits(ALPHA_CTRL.0) != 0
    }

    fn modifier_bits(&self, col: usize) -> u8 {
        let mask = match col {
            c if c == ALPHA_SHIFT.0 => ALPHA_SHIFT.1,
            c if c == ALPHA_CTRL.0 => ALPHA_CTRL.1,
            _ => 0,
        };
        self.columns.get(col).map_or(0, |v| v & mask)
    }

    fn press_char(&mut self, ch: char) -> bool {
        match ch {
            ' ' => self.press((6, 0x10)),
            '\r' | '\n' => self.press((6, 0x02)),
            '\u{1}'..='\u{1A}' => {
                let letter = char::from(ch as u8 + b'@');
                if !self.press_char(letter) {
                    return false;
                }
                self.press(ALPHA_CTRL);
            }
            _ => {
                if let Some(&(_, _, col, bit)) = ALPHA_KEYS.iter().find(|k| k.0 == ch) {
                    self.press((col, bit));
                } else if let Some(&(_, _, col, bit)) =
                    ALPHA_KEYS.iter().find(|k| k.1 == Some(ch))
                {
                    self.press((col, bit));
                    self.press(ALPHA_SHIFT);
                } else {
                    return false;
                }
            }
        }
        true
    }
}

impl KeyboardMatrix for Matrix8x8 {
    fn set_key_char(&mut self, ch: char) -> bool {
        self.key_released();
        self.press_char(ch)
    }

    fn set_key_code(&mut self, key: Key, shift: bool) -> bool {
        self.key_released();
        let pos = match key {
            Key::Enter => (6, 0x02),
            Key::Left | Key::Backspace => (6, 0x04),
            Key::Right => (6, 0x08),
            Key::Space => (6, 0x10),
            Key::Up => (6, 0x40),
            Key::Down => (6, 0x80),
            _ => return false,
        };
        self.press(pos);
        if shift {
            self.press(ALPHA_SHIFT);
        }
        true
    }

    fn key_released(&mut self) {
        self.columns = [0; 8];
    }

    /// B4 low reads rows 0-3, B4 high rows 4-7.
    fn row_values_for(&self, col: usize, aux: bool) -> u8 {
        let v = self.columns.get(col).copied().unwrap_or(0);
        if aux { v >> 4 } else { v & 0x0F }
    }
}

#[derive(Debug, Clone)]
enum Layout {
    Membrane(Matrix8x4),
    Alpha(Matrix8x8),
}

/// The fitted keyboard plus the shift pre-hold window.
///
/// After a key that needs a shift key, only the shift keys are visible
/// until the window expires, so the monitor sees the shift first.
#[derive(Debug, Clone)]
pub struct Z1013Keyboard {
    layout: Layout,
    prehold: PreHold,
}

impl Z1013Keyboard {
    #[must_use]
    pub fn new(kind: KeyboardKind, prehold: Ticks) -> Self {
        let layout = match kind {
            KeyboardKind::Matrix8x4 => Layout::Membrane(Matrix8x4::default()),
            KeyboardKind::Matrix8x8 => Layout::Alpha(Matrix8x8::default()),
        };
        Self {
            layout,
            prehold: PreHold::new(prehold),
        }
    }

    /// Only meaningful for the membrane keyboard.
    pub fn set_hex_mode(&mut self, hex_mode: bool) {
        if let Layout::Membrane(m) = &mut self.layout {
            m.set_hex_mode(hex_mode);
        }
    }

    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.prehold.is_active()
    }

    /// Run the pre-hold window down by `cycles`.
    pub fn advance(&mut self, cycles: Ticks) -> bool {
        self.prehold.advance(cycles)
    }

    fn matrix(&self) -> &dyn KeyboardMatrix {
        match &self.layout {
            Layout::Membrane(m) => m,
            Layout::Alpha(m) => m,
        }
    }

    fn matrix_mut(&mut self) -> &mut dyn KeyboardMatrix {
        match &mut self.layout {
            Layout::Membrane(m) => m,
            Layout::Alpha(m) => m,
        }
    }

    fn modifier_pressed(&self) -> bool {
        match &self.layout {
            Layout::Membrane(m) => m.shift_pressed(),
            Layout::Alpha(m) => m.modifier_pressed(),
        }
    }

    fn modifier_rows(&self, col: usize, aux: bool) -> u8 {
        match &self.layout {
            Layout::Membrane(m) if col < 4 => m.row_values_for(col, aux) & SHIFT_BIT,
            Layout::Alpha(m) => {
                let v = m.modifier_bits(col);
                if aux { v >> 4 } else { v & 0x0F }
            }
            Layout::Membrane(_) => 0,
        }
    }

    fn update_prehold(&mut self, accepted: bool) {
        if accepted && self.modifier_pressed() {
            self.prehold.arm();
        } else {
            self.prehold.cancel();
        }
    }
}

impl KeyboardMatrix for Z1013Keyboard {
    fn set_key_char(&mut self, ch: char) -> bool {
        let accepted = self.matrix_mut().set_key_char(ch);
        self.update_prehold(accepted);
        accepted
    }

    fn set_key_code(&mut self, key: Key, shift: bool) -> bool {
        let accepted = self.matrix_mut().set_key_code(key, shift);
        self.update_prehold(accepted);
        accepted
    }

    fn key_released(&mut self) {
        self.matrix_mut().key_released();
        self.prehold.cancel();
    }

    fn row_values_for(&self, col: usize, aux: bool) -> u8 {
        if self.prehold.is_active() {
            self.modifier_rows(col, aux)
        } else {
            self.matrix().row_values_for(col, aux)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(m: &impl KeyboardMatrix) -> [u8; 8] {
        std::array::from_fn(|c| m.row_values_for(c, false))
    }

    #[test]
    fn membrane_letters_and_shift_groups() {
        let mut m = Matrix8x4::default();
        assert!(m.set_key_char('A'));
        assert_eq!(columns(&m), [0, 0x01, 0, 0, 0, 0, 0, 0]);

        // 'Z' = 0x5A: group 'X', column 2, S1
        assert!(m.set_key_char('Z'));
        assert_eq!(columns(&m), [0x08, 0, 0x01, 0, 0, 0, 0, 0]);

        // 'k' = 0x6B: group 'h', column 3, S3
        assert!(m.set_key_char('k'));
        assert_eq!(columns(&m), [0, 0, 0x08, 0x02, 0, 0, 0, 0]);

        // '!' = 0x21: group ' ', column 1, S2
        assert!(m.set_key_char('!'));
        assert_eq!(columns(&m), [0, 0x08 | 0x02, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn membrane_hex_mode_swaps_s1() {
        let mut m = Matrix8x4::default();
        assert!(m.set_key_char('5'));
        assert_eq!(columns(&m), [0x08, 0, 0, 0, 0, 0x02, 0, 0]);
        m.set_hex_mode(true);
        assert!(m.set_key_char('5'));
        assert_eq!(columns(&m), [0, 0, 0, 0, 0, 0x02, 0, 0]);
        assert!(m.set_key_char('J'));
        assert_eq!(columns(&m), [0x08, 0, 0x02, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn membrane_special_keys() {
        let mut m = Matrix8x4::default();
        assert!(m.set_key_code(Key::Enter, false));
        assert_eq!(columns(&m), [0, 0, 0, 0, 0, 0, 0, 0x08]);
        assert!(m.set_key_code(Key::Left, false));
        assert_eq!(columns(&m), [0, 0, 0, 0, 0x08, 0, 0, 0]);
        // Backspace is typed as code 08: group 0x08, column 0, S4
        assert!(m.set_key_code(Key::Backspace, false));
        assert_eq!(columns(&m), [0x04, 0, 0, 0x08, 0, 0, 0, 0]);
        assert!(!m.set_key_code(Key::Home, false));
        assert!(!m.set_key_char('\u{e4}'));
        m.key_released();
        assert_eq!(columns(&m), [0; 8]);
    }

    #[test]
    fn alpha_shifted_character_sets_shift() {
        let mut m = Matrix8x8::default();
        assert!(m.set_key_char('!'));
        assert_eq!(m.row_values_for(0, false), 0x01);
        assert_eq!(m.row_values_for(7, true), 0x04);
        assert!(m.set_key_char('W'));
        assert_eq!(m.row_values_for(0, false), 0);
        assert_eq!(m.row_values_for(0, true), 0x02);
        assert_eq!(m.row_values_for(7, true), 0);
    }

    #[test]
    fn alpha_control_character() {
        let mut m = Matrix8x8::default();
        // Ctrl-C: C key (1, 0x08) plus Ctrl (6, 0x20)
        assert!(m.set_key_char('\u{3}'));
        assert_eq!(m.row_values_for(1, false), 0x08);
        assert_eq!(m.row_values_for(6, true), 0x02);
    }

    #[test]
    fn prehold_shows_only_shift_keys() {
        let mut kb = Z1013Keyboard::new(KeyboardKind::Matrix8x4, Ticks::new(1000));
        assert!(kb.set_key_char('Z'));
        assert!(kb.is_holding());
        assert_eq!(kb.row_values_for(0, false), 0x08);
        assert_eq!(kb.row_values_for(2, false), 0);
        assert!(!kb.advance(Ticks::new(999)));
        assert!(kb.advance(Ticks::new(1)));
        assert_eq!(kb.row_values_for(2, false), 0x01);

        // No shift involved: visible at once.
        assert!(kb.set_key_char('A'));
        assert!(!kb.is_holding());
        assert_eq!(kb.row_values_for(1, false), 0x01);
    }
}
