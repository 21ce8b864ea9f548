//! Z9001 keyboard: 8 columns by 8 rows, both driven through PIO90.
//!
//! Each column byte holds the pressed rows. PIO90 A selects columns and
//! reads back on B which rows are pressed; B selects rows and A reads the
//! columns. Both selections are low active.

use emu_core::{Key, KeyboardMatrix};

const NORMAL: [[u8; 8]; 6] = [
    *b"01234567",
    *b"89:;,=.?",
    *b"@ABCDEFG",
    *b"HIJKLMNO",
    *b"PQRSTUVW",
    [b'X', b'Y', b'Z', 0, 0, 0, b'^', 0],
];

const SHIFTED: [[u8; 8]; 6] = [
    *b"_!\"#$%&'",
    *b"()*+<->/",
    [0, b'a', b'b', b'c', b'd', b'e', b'f', b'g'],
    *b"hijklmno",
    *b"pqrstuvw",
    [b'x', b'y', b'z', 0, 0, 0, 0, 0],
];

const SHIFT_COL: usize = 0;
const CONTROL_COL: usize = 2;
const ROW_7: u8 = 0x80;
const ROW_6: u8 = 0x40;
const ROW_5: u8 = 0x20;

const STOP_CHAR: u8 = 0x03;

#[derive(Debug, Default)]
pub(crate) struct Z9001Keyboard {
    columns: [u8; 8],
    changed: bool,
}

impl Z9001Keyboard {
    /// Return and clear the changed flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Row lines seen on PIO90 B for the columns selected on A.
    #[must_use]
    pub fn row_value(&self, col_select: u8) -> u8 {
        let rows = self
            .columns
            .iter()
            .enumerate()
            .filter(|&(i, _)| col_select & (1 << i) == 0)
            .fold(0, |acc, (_, &rows)| acc | rows);
        !rows
    }

    /// Column lines seen on PIO90 A for the rows selected on B.
    #[must_use]
    pub fn col_value(&self, row_select: u8) -> u8 {
        let cols = self
            .columns
            .iter()
            .enumerate()
            .filter(|&(_, &rows)| rows & !row_select != 0)
            .fold(0u8, |acc, (i, _)| acc | (1 << i));
        !cols
    }

    fn place(&mut self, code: u8, table: &[[u8; 8]; 6]) -> bool {
        if code == 0 {
            return false;
        }
        for (row, chars) in table.iter().enumerate() {
            if let Some(col) = chars.iter().position(|&c| c == code) {
                self.columns[col] = 1 << row;
                return true;
            }
        }
        false
    }

    fn press(&mut self, col: usize, rows: u8) {
        self.columns[col] |= rows;
    }
}

impl KeyboardMatrix for Z9001Keyboard {
    fn set_key_char(&mut self, ch: char) -> bool {
        let Ok(code) = u8::try_from(ch) else {
            return false;
        };
        self.columns = [0; 8];
        let done = match code {
            STOP_CHAR => {
                self.press(6, ROW_6);
                true
            }
            0x01..=0x20 => {
                let letter = code + 0x40;
                let found = self.place(letter, &NORMAL) || self.place(letter, &SHIFTED);
                if found {
                    self.press(CONTROL_COL, ROW_7);
                }
                found
            }
            _ if self.place(code, &NORMAL) => true,
            _ if self.place(code, &SHIFTED) => {
                self.press(SHIFT_COL, ROW_7);
                true
            }
            _ => false,
        };
        self.changed |= done;
        done
    }

    fn set_key_code(&mut self, key: Key, shift: bool) -> bool {
        let mut cols = [0u8; 8];
        match key {
            Key::Backspace => cols[0] = ROW_6,
            Key::Left | Key::Right if shift => cols[3] = ROW_5,
            Key::Left => cols[0] = ROW_6,
            Key::Right => {
                cols[SHIFT_COL] = ROW_7;
                cols[1] = ROW_6;
            }
            Key::Down => cols[2] = ROW_6,
            Key::Up => cols[3] = ROW_6,
            Key::Escape => cols[4] = ROW_6,
            Key::Enter => cols[5] = ROW_6,
            Key::Space => cols[7] = ROW_6,
            Key::Insert => cols[5] = ROW_5,
            Key::Delete => {
                cols[SHIFT_COL] = ROW_7;
                cols[5] = ROW_5;
            }
            Key::Pause => cols[4] = ROW_5,
            // GRAPHIC
            Key::F(1) => cols[3] = ROW_7,
            // COLOR
            Key::F(2) => cols[1] = ROW_7,
            // LIST
            Key::F(3) => cols[4] = ROW_7,
            // RUN
            Key::F(4) => cols[5] = ROW_7,
            // STOP
            Key::F(5) => cols[6] = ROW_6,
            _ => return false,
        }
        if shift && matches!(key, Key::Escape | Key::Insert | Key::Pause) {
            cols[SHIFT_COL] |= ROW_7;
        }
        self.columns = cols;
        self.changed = true;
        true
    }

    fn key_released(&mut self) {
        self.columns = [0; 8];
        self.changed = true;
    }

    fn row_values_for(&self, col: usize, _aux: bool) -> u8 {
        self.columns.get(col).copied().unwrap_or(0)
    }
}
