//! BCS3 keyboard: 10 columns, selected by address lines A0-A9.
//!
//! A read of 1000-13FF ORs the row bits of every column whose address
//! line is low. Shift is column 9 bit 0.
//!
//! | Row bit | Columns 0-9         |
//! |---------|---------------------|
//! | `0x08`  | 0-9                 |
//! | `0x04`  | A-J                 |
//! | `0x02`  | K-T                 |
//! | `0x01`  | U-Z, space (col 6), ← (col 7), ENTER (col 8) |

use emu_core::{Key, KeyboardMatrix};

const COLUMNS: usize = 10;
const SHIFT_COLUMN: usize = 9;
const SHIFT_BIT: u8 = 0x01;

#[derive(Debug, Clone, Default)]
pub(crate) struct Bcs3Keyboard {
    columns: [u8; COLUMNS],
}

impl Bcs3Keyboard {
    /// Row bits seen at address `addr`: the OR of all columns whose
    /// address line is low.
    pub fn read(&self, addr: u16) -> u8 {
        self.columns
            .iter()
            .enumerate()
            .filter(|&(col, _)| addr & (1 << col) == 0)
            .fold(0, |acc, (_, &bits)| acc | bits)
    }

    fn press(&mut self, col: usize, bits: u8, shift: bool) {
        if shift {
            self.columns[SHIFT_COLUMN] |= SHIFT_BIT;
        }
        self.columns[col] |= bits;
    }
}

impl KeyboardMatrix for Bcs3Keyboard {
    fn set_key_char(&mut self, ch: char) -> bool {
        self.key_released();
        let Ok(code) = u8::try_from(ch.to_ascii_uppercase()) else {
            return false;
        };
        let (col, bits, shift) = match code {
            0x20..=0x29 => (code - 0x20, 0x08, true),
            0x2A..=0x2F => (code - 0x26, 0x04, true),
            b'0'..=b'9' => (code - b'0', 0x08, false),
            0x3A..=0x40 => (code - 0x3A, 0x02, true),
            b'A'..=b'J' => (code - b'A', 0x04, false),
            b'K'..=b'T' => (code - b'K', 0x02, false),
            b'U'..=b'Z' => (code - b'U', 0x01, false),
            _ => return false,
        };
        self.press(usize::from(col), bits, shift);
        true
    }

    fn set_key_code(&mut self, key: Key, _shift: bool) -> bool {
        self.key_released();
        let col = match key {
            Key::Space => 6,
            Key::Left | Key::Backspace => 7,
            Key::Enter => 8,
            _ => return false,
        };
        self.press(col, 0x01, false);
        true
    }

    fn key_released(&mut self) {
        self.columns = [0; COLUMNS];
    }

    fn row_values_for(&self, col: usize, _aux: bool) -> u8 {
        self.columns.get(col).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits() {
        let mut kb = Bcs3Keyboard::default();
        assert!(kb.set_key_char('b'));
        assert_eq!(kb.row_values_for(1, false), 0x04);
        assert!(kb.set_key_char('7'));
        assert_eq!(kb.row_values_for(1, false), 0);
        assert_eq!(kb.row_values_for(7, false), 0x08);
        assert!(kb.set_key_char('Y'));
        assert_eq!(kb.row_values_for(4, false), 0x01);
        assert_eq!(kb.row_values_for(SHIFT_COLUMN, false), 0);
    }

    #[test]
    fn shifted_characters_press_column_9() {
        let mut kb = Bcs3Keyboard::default();
        assert!(kb.set_key_char('+'));
        assert_eq!(kb.row_values_for(5, false), 0x04);
        assert_eq!(kb.row_values_for(SHIFT_COLUMN, false), 0x01);
        // Shift and the key share column 9.
        assert!(kb.set_key_char(')'));
        assert_eq!(kb.row_values_for(SHIFT_COLUMN, false), 0x09);
        assert!(kb.set_key_char('@'));
        assert_eq!(kb.row_values_for(6, false), 0x02);
    }

    #[test]
    fn address_lines_select_columns() {
        let mut kb = Bcs3Keyboard::default();
        kb.set_key_code(Key::Enter, false);
        assert_eq!(kb.read(0x1000 | 0x03FF), 0);
        assert_eq!(kb.read(0x1000 | (0x03FF & !(1 << 8))), 0x01);
        assert_eq!(kb.read(0x1000), 0x01);
        kb.key_released();
        assert_eq!(kb.read(0x1000), 0);
    }

    #[test]
    fn unknown_input_is_refused() {
        let mut kb = Bcs3Keyboard::default();
        assert!(!kb.set_key_char('~'));
        assert!(!kb.set_key_char('ä'));
        assert!(!kb.set_key_code(Key::Up, false));
    }
}
