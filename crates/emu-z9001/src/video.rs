//! Z9001 video: 40 columns of 8x8 characters from EC00, MSB first.
//!
//! Either 24 rows of 8 lines or 20 rows of 9 lines, the ninth line
//! showing the border. With the color option each cell has an
//! attribute byte at E800: foreground in bits 6..4, background in bits
//! 2..0, and bit 7 swaps the two while the blink phase is on. The
//! graphics extension shows a 256x192 bitmap centered on the text area.

use emu_core::{BLACK, ColorIndex, Rom, WHITE, extract_text, fill_random};

pub const COLOR_BASE: u16 = 0xE800;
pub const VIDEO_BASE: u16 = 0xEC00;
pub const VIDEO_SIZE: usize = 0x0400;
pub const GRAPHICS_SIZE: usize = 0x1800;

pub const SCREEN_WIDTH: usize = 320;
pub const SCREEN_HEIGHT: usize = 192;

const COLUMNS: usize = 40;
const GRAPHICS_LEFT: usize = 32;
const GRAPHICS_WIDTH: usize = 256;

/// RGB values of the color indices. Index 0 is black and 1 white; the
/// other six are the remaining board colors in hardware order.
pub const PALETTE: [[u8; 3]; 8] = [
    [0, 0, 0],
    [255, 255, 255],
    [255, 0, 0],
    [0, 255, 0],
    [255, 255, 0],
    [0, 0, 255],
    [255, 0, 255],
    [0, 255, 255],
];

/// Map a 3-bit board color (0 black .. 7 white) to a palette index.
const fn color_index(color: u8) -> ColorIndex {
    match color & 0x07 {
        0 => BLACK,
        7 => WHITE,
        c => c + 1,
    }
}

fn text_char(code: u8) -> Option<char> {
    match code {
        0x21..=0x7E => Some(char::from(code)),
        _ => Some(' '),
    }
}

/// State of the color graphics extension on ports B8-BA.
pub(crate) struct Graphics {
    pub ram: Box<[u8; GRAPHICS_SIZE]>,
    pub fg: u8,
    pub bg: u8,
    pub border: bool,
    pub active: bool,
    pub addr_low: u8,
}

impl Graphics {
    fn new() -> Self {
        Self {
            ram: Box::new([0; GRAPHICS_SIZE]),
            fg: 0,
            bg: 0,
            border: false,
            active: false,
            addr_low: 0,
        }
    }

    pub fn reset(&mut self) {
        self.fg = 0;
        self.bg = 0;
        self.border = false;
        self.active = false;
        self.addr_low = 0;
    }

    pub fn write_mode(&mut self, value: u8) {
        self.bg = value & 0x07;
        self.fg = (value >> 4) & 0x07;
        self.border = value & 0x80 != 0;
        self.active = value & 0x08 != 0;
    }

    /// Mode register as read back; the border flag appears on bit 6.
    #[must_use]
    pub fn read_mode(&self) -> u8 {
        let mut v = self.bg | (self.fg << 4);
        if self.active {
            v |= 0x08;
        }
        if self.border {
            v |= 0x40;
        }
        v
    }
}

pub(crate) struct Video {
    pub ram: Box<[u8; VIDEO_SIZE]>,
    pub color: Option<Box<[u8; VIDEO_SIZE]>>,
    pub graphics: Option<Graphics>,
    pub rows20: bool,
    /// Board color 0..7 from PIO88 A5..3.
    pub border: u8,
    pub blink: bool,
}

impl Video {
    pub fn new(color: bool) -> Self {
        Self {
            ram: Box::new([0; VIDEO_SIZE]),
            color: color.then(|| Box::new([0; VIDEO_SIZE])),
            graphics: color.then(Graphics::new),
            rows20: false,
            border: 0,
            blink: false,
        }
    }

    pub fn power_on(&mut self) {
        fill_random(&mut self.ram[..]);
        if let Some(color) = &mut self.color {
            fill_random(&mut color[..]);
        }
        if let Some(graphics) = &mut self.graphics {
            fill_random(&mut graphics.ram[..]);
        }
    }

    pub fn color_count(&self) -> usize {
        if self.color.is_some() { 8 } else { 2 }
    }

    fn graphics_active(&self) -> bool {
        self.graphics.as_ref().is_some_and(|g| g.active)
    }

    pub fn border_color_index(&self) -> ColorIndex {
        if self.color.is_some() {
            color_index(self.border)
        } else {
            BLACK
        }
    }

    fn geometry(&self) -> (usize, usize) {
        if self.rows20 { (20, 9) } else { (24, 8) }
    }

    pub fn color_index_at(&self, font: Option<&Rom>, x: usize, y: usize) -> ColorIndex {
        if let Some(graphics) = self.graphics.as_ref().filter(|g| g.active) {
            return self.graphics_pixel(graphics, x, y);
        }
        let (rows, line_height) = self.geometry();
        let (row, line) = (y / line_height, y % line_height);
        if line >= 8 || row >= rows || x >= SCREEN_WIDTH {
            return self.border_color_index();
        }
        let offs = row * COLUMNS + x / 8;
        let code = self.ram[offs];
        let mut ink = font
            .and_then(|f| f.get(usize::from(code) * 8 + line))
            .is_some_and(|bits| bits & (0x80 >> (x % 8)) != 0);
        match &self.color {
            None => {
                if ink {
                    WHITE
                } else {
                    BLACK
                }
            }
            Some(color) => {
                let attr = color[offs];
                if attr & 0x80 != 0 && self.blink {
                    ink = !ink;
                }
                color_index(if ink { attr >> 4 } else { attr })
            }
        }
    }

    fn graphics_pixel(&self, graphics: &Graphics, x: usize, y: usize) -> ColorIndex {
        let bitmap_x = x
            .checked_sub(GRAPHICS_LEFT)
            .filter(|&bx| bx < GRAPHICS_WIDTH);
        if let Some(bx) = bitmap_x {
            if let Some(&bits) = graphics.ram.get(y * 32 + bx / 8) {
                let c = if bits & (0x80 >> (bx % 8)) != 0 {
                    graphics.fg
                } else {
                    graphics.bg
                };
                return color_index(c);
            }
        }
        if graphics.border {
            self.border_color_index()
        } else {
            BLACK
        }
    }

    pub fn extract_text(&self) -> Option<String> {
        if self.graphics_active() {
            return None;
        }
        let (rows, _) = self.geometry();
        Some(extract_text(
            rows,
            COLUMNS,
            |r, c| self.ram[r * COLUMNS + c],
            text_char,
        ))
    }
}
