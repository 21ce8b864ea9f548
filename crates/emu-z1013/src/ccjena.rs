//! CC-Jena graphics card: a µPD7220 GDC with 2 KB of character RAM.
//!
//! The card sits on ports 18 (parameter/status) and 19 (command/data).
//! It produces an 80-column text screen of 8-pixel-wide cells whose row
//! height is programmed through CCHAR. Font lookup is
//! `code | (line << 8)`, so the 4 KB font holds one 256-glyph plane per
//! raster line; an 8 KB font adds a second set used under the cursor.

use emu_core::{BLACK, ColorIndex, MasterClock, Rom, WHITE, fill_random};
use nec_upd7220::{GdcEvents, Upd7220, Vram};

const VRAM_SIZE: usize = 0x0800;
const CHAR_WIDTH: usize = 8;
const MIN_WIDTH: usize = 640;
const MIN_HEIGHT: usize = 256;

/// Character RAM as the GDC sees it: 8 data bits, upper byte floating.
struct CardRam(Box<[u8; VRAM_SIZE]>);

impl Vram for CardRam {
    fn word(&self, addr: u32) -> u16 {
        u16::from(self.0[addr as usize & (VRAM_SIZE - 1)]) | 0xFF00
    }

    fn set_word(&mut self, addr: u32, value: u16) {
        self.0[addr as usize & (VRAM_SIZE - 1)] = value as u8;
    }
}

pub(crate) struct CcJena {
    gdc: Upd7220,
    ram: CardRam,
}

impl CcJena {
    pub fn new(clock: MasterClock) -> Self {
        Self {
            gdc: Upd7220::new(clock),
            ram: CardRam(Box::new([0; VRAM_SIZE])),
        }
    }

    pub fn reset(&mut self, power_on: bool) {
        if power_on {
            fill_random(&mut self.ram.0[..]);
        }
    }

    pub fn set_clock(&mut self, clock: MasterClock) {
        self.gdc.set_clock(clock);
    }

    pub fn read_status(&self) -> u8 {
        self.gdc.read_status()
    }

    pub fn read_data(&mut self) -> u8 {
        self.gdc.read_data(&self.ram)
    }

    pub fn write_argument(&mut self, value: u8) -> GdcEvents {
        self.gdc.write_argument(&mut self.ram, value)
    }

    pub fn write_command(&mut self, value: u8) -> GdcEvents {
        self.gdc.write_command(&mut self.ram, value)
    }

    pub fn cycles_elapsed(&mut self, cycles: u32) -> GdcEvents {
        self.gdc.cycles_elapsed(cycles)
    }

    pub fn screen_width(&self) -> usize {
        (self.gdc.char_col_count() as usize * CHAR_WIDTH).max(MIN_WIDTH)
    }

    pub fn screen_height(&self) -> usize {
        (self.gdc.display_lines() as usize).max(MIN_HEIGHT)
    }

    /// Display lines shorter than the minimum height are centred.
    fn y_margin(&self) -> usize {
        MIN_HEIGHT.saturating_sub(self.gdc.display_lines() as usize) / 2
    }

    pub fn color_index_at(&self, font: Option<&Rom>, x: usize, y: usize) -> ColorIndex {
        let Some(font) = font else {
            return BLACK;
        };
        let Some(y) = y.checked_sub(self.y_margin()) else {
            return BLACK;
        };
        let h = self.gdc.char_row_height() as usize;
        if h == 0 {
            return BLACK;
        }
        let Some(word) = self.gdc.display_value((x / CHAR_WIDTH) as u32, y as u32) else {
            return BLACK;
        };
        let code = usize::from(self.ram.0[word.address as usize & (VRAM_SIZE - 1)]);
        let mut idx = code | (((y % h) << 8) & 0x0F00);
        if word.cursor {
            if font.len() > 0x1000 {
                idx |= 0x1000;
            } else {
                return WHITE;
            }
        }
        match font.get(idx) {
            Some(b) if b & (0x80 >> (x % CHAR_WIDTH)) != 0 => WHITE,
            _ => BLACK,
        }
    }

    /// Screen text, when the GDC runs a character raster.
    pub fn extract_text(&self) -> Option<String> {
        let rows = self.gdc.char_row_count() as usize;
        if rows == 0 {
            return None;
        }
        let cols = self.gdc.char_col_count() as usize;
        Some(emu_core::extract_text(
            rows,
            cols,
            |r, c| {
                self.gdc
                    .screen_char(&self.ram, c as u32, r as u32)
                    .map_or(0, |ch| ch & 0x7F)
            },
            emu_core::ascii_char,
        ))
    }
}
