//! BCS3 video.
//!
//! The picture is generated by the CPU itself: the OS jumps into the
//! 1800 alias of static RAM and executes the row as NOPs while the
//! hardware shifts the characters out. Without that activity there is
//! no picture, so ZC/TO2 of the CTC, which marks each frame, keeps a
//! watchdog alive; when it runs out the screen goes black.
//!
//! The glyph lines are offset by one against the font: display line 0
//! shows font line 1 and the last glyph line shows font line 0.

use emu_core::{BLACK, ColorIndex, Rom, Ticks, WHITE, ascii_char, extract_text, fill_random};

use crate::config::{Bcs3Os, Layout};

pub const SRAM_SIZE: usize = 0x0400;
/// Cycles a sync pulse keeps the screen alive.
pub const SYNC_TIMEOUT: Ticks = Ticks::new(100_000);

pub(crate) struct Video {
    pub ram: Box<[u8; SRAM_SIZE]>,
    pub layout: Layout,
    /// SE 2.4 draws its 8 glyph lines on lines 2..=9 of 16.
    se24: bool,
    pub rows: usize,
    pub enabled: bool,
}

impl Video {
    pub fn new(os: Bcs3Os) -> Self {
        Self {
            ram: Box::new([0; SRAM_SIZE]),
            layout: os.layout(),
            se24: os == Bcs3Os::Se24,
            rows: os.initial_rows(),
            enabled: false,
        }
    }

    pub fn power_on(&mut self) {
        fill_random(&mut self.ram[..]);
    }

    pub fn screen_width(&self) -> usize {
        self.layout.columns * 8
    }

    pub fn screen_height(&self) -> usize {
        self.layout.height
    }

    pub fn border_color_index(&self) -> ColorIndex {
        if self.enabled { WHITE } else { BLACK }
    }

    fn code_at(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.rows || col >= self.layout.columns {
            return None;
        }
        self.ram
            .get(self.layout.offset + row * self.layout.stride + col)
            .copied()
    }

    /// Index into the font for display `line` of a cell, if the line
    /// carries glyph data.
    fn font_index(&self, code: u8, line: usize) -> Option<usize> {
        let base = usize::from(code) * 8;
        if self.se24 {
            match line {
                9 => Some(base),
                2..=8 => Some(base + line - 1),
                _ => None,
            }
        } else if line == 7 {
            Some(base)
        } else {
            Some(base + line + 1)
        }
    }

    pub fn color_index_at(&self, font: Option<&Rom>, x: usize, y: usize) -> ColorIndex {
        if !self.enabled {
            return BLACK;
        }
        let row_height = self.layout.row_height;
        let bits = self
            .code_at(y / row_height, x / 8)
            .and_then(|code| self.font_index(code, y % row_height))
            .and_then(|idx| font?.get(idx))
            .unwrap_or(0);
        if bits & (0x80 >> (x % 8)) != 0 {
            BLACK
        } else {
            WHITE
        }
    }

    pub fn extract_text(&self) -> String {
        let fitting = (SRAM_SIZE - self.layout.offset) / self.layout.stride;
        extract_text(
            self.rows.min(fitting),
            self.layout.columns,
            |r, c| self.code_at(r, c).unwrap_or(b' '),
            ascii_char,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Glyph `c` line `l` is `c + l`.
    fn font() -> Rom {
        let bytes: Vec<u8> = (0..0x800)
            .map(|i: usize| ((i / 8) + (i % 8)) as u8)
            .collect();
        Rom::from_bytes(&bytes)
    }

    fn lit(video: &Video, f: &Rom, x: usize, y: usize) -> bool {
        video.color_index_at(Some(f), x, y) == BLACK
    }

    #[test]
    fn disabled_screen_is_black() {
        let video = Video::new(Bcs3Os::Se24);
        assert_eq!(video.color_index_at(Some(&font()), 100, 100), BLACK);
        assert_eq!(video.border_color_index(), BLACK);
    }

    #[test]
    fn line_offset_without_se24() {
        let mut video = Video::new(Bcs3Os::Se31_29);
        video.enabled = true;
        // Code 0x40: font line l is 0x40 + l.
        video.ram[0x80] = 0x40;
        let f = font();
        // Display line 0 shows font line 1 (0x41): bits 6 and 0.
        assert!(lit(&video, &f, 1, 0));
        assert!(lit(&video, &f, 7, 0));
        assert!(!lit(&video, &f, 6, 0));
        // Display line 7 shows font line 0 (0x40): bit 6 only.
        assert!(lit(&video, &f, 1, 7));
        assert!(!lit(&video, &f, 7, 7));
    }

    #[test]
    fn se24_glyph_sits_on_lines_2_to_9() {
        let mut video = Video::new(Bcs3Os::Se24);
        video.enabled = true;
        video.ram[0x50] = 0x80;
        let f = font();
        assert!(!lit(&video, &f, 0, 0));
        assert!(!lit(&video, &f, 0, 1));
        // Line 2 shows font line 1 (0x81).
        assert!(lit(&video, &f, 0, 2));
        assert!(lit(&video, &f, 7, 2));
        // Line 9 shows font line 0 (0x80).
        assert!(lit(&video, &f, 0, 9));
        assert!(!lit(&video, &f, 7, 9));
        assert!(!lit(&video, &f, 0, 10));
    }

    #[test]
    fn rows_limit_picture_and_text() {
        let mut video = Video::new(Bcs3Os::Se32);
        video.enabled = true;
        video.ram.fill(b'Q');
        video.rows = 2;
        assert_eq!(video.extract_text().lines().count(), 2);
        let f = font();
        // 'Q' + 1 = 0x52 has bit 6 set.
        assert!(lit(&video, &f, 1, 8));
        assert!(!lit(&video, &f, 1, 16));
        assert_eq!((video.screen_width(), video.screen_height()), (232, 232));
    }
}
