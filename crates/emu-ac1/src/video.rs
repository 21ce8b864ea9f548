//! AC1 video: 64 columns of 6x8 cells, addressed backwards.
//!
//! The character at row `r`, column `c` lives at `len - 1 - (r * 64 + c)`
//! in video RAM. Glyph bits are LSB first. On the 64x16 board each row
//! is 16 raster lines of which only the first 8 carry the glyph.
//!
//! Under SCCH the codes 10 and 11 switch inverse video off and on for
//! the rest of the scanline.

use emu_core::{BLACK, ColorIndex, Rom, TextMap, WHITE, ascii_char, extract_text};

const COLUMNS: usize = 64;
const CELL_WIDTH: usize = 6;
const INVERSE_OFF: u8 = 0x10;
const INVERSE_ON: u8 = 0x11;

/// Character set in effect, for text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Charset {
    /// U402 ROM of the 64x16 board: 64 glyphs, upper case only.
    U402,
    /// ACC/CCD set with umlauts and block graphics.
    Ccd,
    Scch,
    /// CCD below, SCCH above the PIO B3 font offset.
    Switchable,
}

pub(crate) struct Video {
    pub ram: Box<[u8]>,
    pub mode_64x16: bool,
    /// The 10/11 inverse controls are decoded.
    pub scch: bool,
    pub charset: Charset,
    /// Offset into the font selected by PIO B3 on SCCH 10/88.
    pub font_offset: usize,
    pub inverse_by_key: bool,
}

impl Video {
    pub fn new(size: usize, mode_64x16: bool, scch: bool, charset: Charset) -> Self {
        Self {
            ram: vec![0; size].into_boxed_slice(),
            mode_64x16,
            scch,
            charset,
            font_offset: 0,
            inverse_by_key: false,
        }
    }

    pub fn screen_width(&self) -> usize {
        COLUMNS * CELL_WIDTH
    }

    pub fn screen_height(&self) -> usize {
        if self.mode_64x16 { 248 } else { 256 }
    }

    pub fn border_color_index(&self) -> ColorIndex {
        if self.inverse_by_key { WHITE } else { BLACK }
    }

    fn row_height(&self) -> usize {
        if self.mode_64x16 { 16 } else { 8 }
    }

    fn rows(&self) -> usize {
        self.ram.len() / COLUMNS
    }

    fn code_at(&self, row: usize, col: usize) -> Option<u8> {
        let cell = row * COLUMNS + col;
        let idx = self.ram.len().checked_sub(cell + 1)?;
        self.ram.get(idx).copied()
    }

    /// Inverse state after the cells `0..=col` of `row` have been shown.
    fn inverse_at(&self, row: usize, col: usize) -> bool {
        (0..=col)
            .rev()
            .find_map(|c| match self.code_at(row, c) {
                Some(INVERSE_OFF) => Some(false),
                Some(INVERSE_ON) => Some(true),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn color_index_at(&self, font: Option<&Rom>, x: usize, y: usize) -> ColorIndex {
        let border = self.border_color_index();
        let (row, line) = (y / self.row_height(), y % self.row_height());
        let col = x / CELL_WIDTH;
        if line >= 8 || col >= COLUMNS {
            return border;
        }
        let (Some(font), Some(code)) = (font, self.code_at(row, col)) else {
            return border;
        };
        let Some(bits) = font.get(usize::from(code) * 8 + line + self.font_offset) else {
            return border;
        };
        let inverse = self.scch && self.inverse_at(row, col);
        let pixel = bits & (1 << (x % CELL_WIDTH)) != 0;
        if pixel != (inverse != self.inverse_by_key) {
            WHITE
        } else {
            BLACK
        }
    }

    pub fn extract_text(&self) -> String {
        let map: TextMap = match self.charset {
            Charset::U402 => u402_char,
            Charset::Scch => ascii_char,
            Charset::Switchable if self.font_offset > 0 => ascii_char,
            Charset::Ccd | Charset::Switchable => ccd_char,
        };
        extract_text(
            self.rows(),
            COLUMNS,
            |r, c| self.code_at(r, c).unwrap_or(0),
            map,
        )
    }
}

/// The U402 has 64 glyphs: codes with bit 5 clear are the letters.
fn u402_char(code: u8) -> Option<char> {
    let b = code & 0x3F;
    ascii_char(if b & 0x20 == 0 { b | 0x40 } else { b })
}

const CCD_BLOCKS: [char; 16] = [
    ' ', '\u{2598}', '\u{259D}', '\u{2580}', '\u{2596}', '\u{258C}', '\u{259E}', '\u{259B}',
    '\u{2597}', '\u{259A}', '\u{2590}', '\u{259C}', '\u{2584}', '\u{2599}', '\u{259F}', '\u{2588}',
];

fn ccd_char(code: u8) -> Option<char> {
    match code {
        0x00..=0x0F => Some(CCD_BLOCKS[usize::from(code)]),
        0x14 => Some('²'),
        0x15 => Some('³'),
        0x16 => Some('§'),
        0x17 => Some('Ä'),
        0x18 => Some('Ö'),
        0x19 => Some('Ü'),
        0x1A => Some('ä'),
        0x1B => Some('ö'),
        0x1C => Some('ü'),
        0x1D => Some('ß'),
        0x1E => Some('µ'),
        0x1F => Some('Ω'),
        0x7F => Some('\u{2592}'),
        _ => ascii_char(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> Rom {
        let mut bytes = vec![0u8; 0x1000];
        bytes[usize::from(b'A') * 8] = 0x01;
        bytes[0x0800 + usize::from(b'A') * 8] = 0x02;
        Rom::from_bytes(&bytes)
    }

    #[test]
    fn cells_run_backwards_lsb_first() {
        let mut video = Video::new(0x0800, false, false, Charset::Ccd);
        video.ram[0x07FF - 65] = b'A'; // row 1, column 1
        let f = font();
        assert_eq!(video.color_index_at(Some(&f), 6, 8), WHITE);
        assert_eq!(video.color_index_at(Some(&f), 7, 8), BLACK);
        assert_eq!(video.color_index_at(Some(&f), 0, 8), BLACK);
        video.font_offset = 0x0800;
        assert_eq!(video.color_index_at(Some(&f), 7, 8), WHITE);
    }

    #[test]
    fn inverse_controls_under_scch() {
        let mut video = Video::new(0x0800, false, true, Charset::Scch);
        video.ram[0x07FF - 1] = INVERSE_ON;
        let f = font();
        assert_eq!(video.color_index_at(Some(&f), 0, 0), BLACK);
        assert_eq!(video.color_index_at(Some(&f), 6, 0), WHITE);
        assert_eq!(video.color_index_at(Some(&f), 300, 0), WHITE);
        assert_eq!(video.color_index_at(Some(&f), 300, 8), BLACK);

        video.scch = false;
        assert_eq!(video.color_index_at(Some(&f), 300, 0), BLACK);
    }

    #[test]
    fn inverse_key_flips_border_and_pixels() {
        let mut video = Video::new(0x0800, false, false, Charset::Ccd);
        video.inverse_by_key = true;
        let f = font();
        assert_eq!(video.border_color_index(), WHITE);
        assert_eq!(video.color_index_at(Some(&f), 0, 0), WHITE);
        assert_eq!(video.color_index_at(None, 0, 0), WHITE);
    }

    #[test]
    fn small_screen_blanks_lower_half() {
        let mut video = Video::new(0x0400, true, false, Charset::U402);
        video.ram.fill(b'A');
        let f = font();
        assert_eq!(video.color_index_at(Some(&f), 0, 16), WHITE);
        assert_eq!(video.color_index_at(Some(&f), 0, 24), BLACK);
        assert_eq!((video.screen_width(), video.screen_height()), (384, 248));
    }

    #[test]
    fn text_maps() {
        let mut video = Video::new(0x0800, false, false, Charset::Ccd);
        video.ram.fill(0x20);
        video.ram[0x07FF] = 0x17;
        video.ram[0x07FE] = b'x';
        let text = video.extract_text();
        assert!(text.starts_with("Äx\n"));
        assert_eq!(text.lines().count(), 32);

        let mut video = Video::new(0x0400, true, false, Charset::U402);
        video.ram.fill(0x20);
        video.ram[0x03FF] = 0x01;
        video.ram[0x03FE] = 0x31;
        assert!(video.extract_text().starts_with("A1\n"));
    }
}
