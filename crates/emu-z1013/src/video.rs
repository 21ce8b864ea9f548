//! Z1013 video: 32x32 (or 64x16) character screen at EC00, optional
//! pixel banks, optional CC-Jena card.
//!
//! Glyphs are 8x8, MSB first. In 64x16 mode each character row is 16
//! raster lines of which only the first 8 carry the glyph. With the
//! graphics option the EC00 window can be switched to one of eight
//! pixel banks; bank `n` supplies raster line `n` of every cell,
//! inverted.

use emu_core::{BLACK, ColorIndex, Rom, TextMap, WHITE, extract_text, fill_random};

use crate::ccjena::CcJena;
use crate::roms::Fonts;

pub const VIDEO_BASE: u16 = 0xEC00;
pub const VIDEO_SIZE: usize = 0x0400;
const PIXEL_BANKS: usize = 8;

/// Video state shared between the emulation and render contexts.
pub(crate) struct Video {
    pub ram: Box<[u8; VIDEO_SIZE]>,
    pub pixel_banks: Option<Box<[[u8; VIDEO_SIZE]; PIXEL_BANKS]>>,
    /// Pixel banks mapped and displayed instead of character RAM.
    pub graphics: bool,
    pub alt_font: bool,
    pub mode_64x16: bool,
    pub card: Option<CcJena>,
    /// The card's output is shown instead of the built-in screen.
    pub card_active: bool,
}

impl Video {
    pub fn new(graphic: bool, card: Option<CcJena>) -> Self {
        Self {
            ram: Box::new([0; VIDEO_SIZE]),
            pixel_banks: graphic.then(|| Box::new([[0; VIDEO_SIZE]; PIXEL_BANKS])),
            graphics: false,
            alt_font: false,
            mode_64x16: false,
            card,
            card_active: false,
        }
    }

    pub fn power_on(&mut self) {
        fill_random(&mut self.ram[..]);
        if let Some(banks) = &mut self.pixel_banks {
            for bank in banks.iter_mut() {
                fill_random(bank);
            }
        }
    }

    /// The RAM behind the EC00 window: a pixel bank while graphics mode
    /// is on, character RAM otherwise.
    pub fn window(&mut self, bank: usize) -> Option<&mut [u8; VIDEO_SIZE]> {
        match &mut self.pixel_banks {
            Some(banks) if self.graphics => banks.get_mut(bank),
            _ => Some(&mut self.ram),
        }
    }

    fn card_shown(&self) -> Option<&CcJena> {
        self.card.as_ref().filter(|_| self.card_active)
    }

    pub fn screen_width(&self) -> usize {
        match self.card_shown() {
            Some(card) => card.screen_width(),
            None if self.mode_64x16 => 512,
            None => 256,
        }
    }

    pub fn screen_height(&self) -> usize {
        match self.card_shown() {
            Some(card) => card.screen_height(),
            None if self.mode_64x16 => 248,
            None => 256,
        }
    }

    fn columns(&self) -> usize {
        if self.mode_64x16 { 64 } else { 32 }
    }

    fn row_height(&self) -> usize {
        if self.mode_64x16 { 16 } else { 8 }
    }

    pub fn color_index_at(
        &self,
        fonts: &Fonts,
        ccj_font: Option<&Rom>,
        x: usize,
        y: usize,
    ) -> ColorIndex {
        if let Some(card) = self.card_shown() {
            return card.color_index_at(ccj_font, x, y);
        }
        let line = y % self.row_height();
        if line >= 8 {
            return BLACK;
        }
        let offset = (y / self.row_height()) * self.columns() + x / 8;
        let bits = match &self.pixel_banks {
            Some(banks) if self.graphics => banks
                .get(y % self.row_height())
                .and_then(|bank| bank.get(offset))
                .map_or(0, |b| !b),
            _ => {
                let Some(&code) = self.ram.get(offset) else {
                    return BLACK;
                };
                fonts
                    .select(self.alt_font)
                    .and_then(|font| font.get(usize::from(code) * 8 + line))
                    .unwrap_or(0)
            }
        };
        if bits & (0x80 >> (x % 8)) != 0 { WHITE } else { BLACK }
    }

    pub fn extract_text(&self) -> Option<String> {
        if let Some(card) = self.card_shown() {
            return card.extract_text();
        }
        if self.graphics && self.pixel_banks.is_some() {
            return None;
        }
        let cols = self.columns();
        let rows = if self.mode_64x16 { 16 } else { 32 };
        let map: TextMap = if self.alt_font { alt_font_char } else { std_font_char };
        Some(extract_text(rows, cols, |r, c| self.ram[r * cols + c], map))
    }
}

fn std_font_char(code: u8) -> Option<char> {
    match code {
        0x20 => Some(' '),
        0x21..=0x7E => Some(char::from(code)),
        _ => None,
    }
}

/// The alternative font has inverse characters at A0-FE.
fn alt_font_char(code: u8) -> Option<char> {
    match code {
        0xA0..=0xFE => std_font_char(code & 0x7F),
        _ => std_font_char(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts() -> Fonts {
        let mut std = vec![0u8; 0x800];
        std[usize::from(b'A') * 8] = 0x81;
        let mut alt = vec![0u8; 0x800];
        alt[usize::from(b'A') * 8] = 0xFF;
        Fonts {
            standard: Some(Rom::from_bytes(&std)),
            alternative: Some(Rom::from_bytes(&alt)),
        }
    }

    #[test]
    fn glyph_msb_first() {
        let mut video = Video::new(false, None);
        video.ram[33] = b'A'; // row 1, column 1
        let f = fonts();
        assert_eq!(video.color_index_at(&f, None, 8, 8), WHITE);
        assert_eq!(video.color_index_at(&f, None, 9, 8), BLACK);
        assert_eq!(video.color_index_at(&f, None, 15, 8), WHITE);
        video.alt_font = true;
        assert_eq!(video.color_index_at(&f, None, 9, 8), WHITE);
    }

    #[test]
    fn mode_64x16_blanks_lower_half_of_row() {
        let mut video = Video::new(false, None);
        video.mode_64x16 = true;
        video.ram.fill(b'A');
        let f = fonts();
        assert_eq!(video.color_index_at(&f, None, 0, 16), WHITE);
        assert_eq!(video.color_index_at(&f, None, 0, 24), BLACK);
        assert_eq!((video.screen_width(), video.screen_height()), (512, 248));
    }

    #[test]
    fn pixel_bank_per_raster_line_inverted() {
        let mut video = Video::new(true, None);
        video.graphics = true;
        video.window(3).unwrap()[0] = 0x7F;
        video.window(2).unwrap()[0] = 0xFF;
        let f = fonts();
        assert_eq!(video.color_index_at(&f, None, 0, 3), WHITE);
        assert_eq!(video.color_index_at(&f, None, 1, 3), BLACK);
        assert_eq!(video.color_index_at(&f, None, 0, 2), BLACK);
        assert_eq!(video.extract_text(), None);
    }

    #[test]
    fn text_with_inverse_characters() {
        let mut video = Video::new(false, None);
        video.ram.fill(0x20);
        video.ram[0] = b'O';
        video.ram[1] = b'K';
        video.ram[2] = 0xC1;
        let text = video.extract_text().unwrap();
        assert!(text.starts_with("OK_\n"));
        video.alt_font = true;
        let text = video.extract_text().unwrap();
        assert!(text.starts_with("OKA\n"));
        assert_eq!(text.lines().count(), 32);
    }
}
