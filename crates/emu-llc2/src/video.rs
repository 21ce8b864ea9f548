//! LLC2 video: 64x32 characters of 8x8 pixels from C000, MSB first.
//!
//! Codes 10 and 11 switch inverse video off and on for the rest of the
//! scanline. With PIO B5 set, bit 7 of a code marks an inverse glyph
//! and only the lower 128 glyphs are addressable.

use emu_core::{BLACK, ColorIndex, Rom, WHITE, ascii_char, extract_text, fill_random};

pub const VIDEO_BASE: u16 = 0xC000;
pub const VIDEO_SIZE: usize = 0x0800;
const COLUMNS: usize = 64;
const ROWS: usize = 32;
const INVERSE_OFF: u8 = 0x10;
const INVERSE_ON: u8 = 0x11;

pub(crate) struct Video {
    pub ram: Box<[u8; VIDEO_SIZE]>,
    pub bit7_inverse: bool,
    /// Toggled by F1.
    pub screen_inverse: bool,
    pub font_offset: usize,
}

impl Video {
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; VIDEO_SIZE]),
            bit7_inverse: false,
            screen_inverse: false,
            font_offset: 0,
        }
    }

    pub fn power_on(&mut self) {
        fill_random(&mut self.ram[..]);
    }

    pub fn border_color_index(&self) -> ColorIndex {
        if self.screen_inverse { WHITE } else { BLACK }
    }

    fn inverse_at(&self, row: usize, col: usize) -> bool {
        self.ram[row * COLUMNS..=row * COLUMNS + col]
            .iter()
            .rev()
            .find_map(|&code| match code {
                INVERSE_OFF => Some(false),
                INVERSE_ON => Some(true),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn color_index_at(&self, font: Option<&Rom>, x: usize, y: usize) -> ColorIndex {
        let border = self.border_color_index();
        let (row, col) = (y / 8, x / 8);
        if row >= ROWS || col >= COLUMNS {
            return border;
        }
        let Some(font) = font else {
            return border;
        };
        let code = self.ram[row * COLUMNS + col];
        let glyph = if self.bit7_inverse { code & 0x7F } else { code };
        let Some(bits) = font.get(self.font_offset + usize::from(glyph) * 8 + y % 8) else {
            return border;
        };
        let inverse =
            self.inverse_at(row, col) || (self.bit7_inverse && code & 0x80 != 0);
        let pixel = bits & (0x80 >> (x % 8)) != 0;
        if pixel != (inverse != self.screen_inverse) {
            WHITE
        } else {
            BLACK
        }
    }

    pub fn extract_text(&self) -> String {
        extract_text(
            ROWS,
            COLUMNS,
            |r, c| {
                let code = self.ram[r * COLUMNS + c];
                if self.bit7_inverse { code & 0x7F } else { code }
            },
            ascii_char,
        )
    }
}
