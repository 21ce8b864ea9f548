//! NEC µPD7220 Graphics Display Controller (GDC), also built as U82720.
//!
//! The GDC generates display addresses for a character, graphics or mixed
//! raster out of up to four display partitions, and gives the CPU
//! indirect access to video memory through its cursor and figure
//! registers. This model covers what character-mode boards use:
//! synchronisation and partition setup, cursor and character geometry,
//! and WDAT/RDAT/CURD word transfers. Figure drawing is not modelled.
//!
//! # Ports
//!
//! | A0 | Read          | Write           |
//! |----|---------------|-----------------|
//! | 0  | Status        | Parameter       |
//! | 1  | FIFO data     | Command         |
//!
//! # Commands
//!
//! | Code        | Name   | Parameters                                |
//! |-------------|--------|-------------------------------------------|
//! | `00`,`0E/F` | RESET/SYNC | mode, words/row, ..., display lines   |
//! | `0C/0D`     | BCTRL  | -                                         |
//! | `001T T0MM` | WDAT   | 1 or 2 bytes                              |
//! | `46`        | ZOOM   | 1                                         |
//! | `47`        | PITCH  | 1                                         |
//! | `49`        | CURS   | 2 or 3                                    |
//! | `4A`        | MASK   | 2                                         |
//! | `4B`        | CCHAR  | 3                                         |
//! | `4C`        | FIGS   | up to 11                                  |
//! | `6B`        | START  | -                                         |
//! | `7S`        | PRAM   | from parameter RAM byte S upwards         |
//! | `101T T0MM` | RDAT   | -                                         |
//! | `E0`        | CURD   | -                                         |

use bitflags::bitflags;
use emu_core::{MasterClock, Observable, Value};
use log::debug;

const STATUS_DATA_AVAILABLE: u8 = 0x01;
const STATUS_FIFO_EMPTY: u8 = 0x04;
const STATUS_VSYNC: u8 = 0x20;
const STATUS_HBLANK: u8 = 0x40;

const LINES_PER_FRAME: u32 = 312;
const VSYNC_LINES: u32 = 50;
const ADDR_MASK: u32 = 0x3FFFF;

/// Word-addressed display memory behind the GDC.
pub trait Vram {
    fn word(&self, addr: u32) -> u16;
    fn set_word(&mut self, addr: u32, value: u16);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GdcMode {
    Character,
    Graphics,
    Mixed,
    Invalid,
}

bitflags! {
    /// What changed as a result of a register access or cycle delivery.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GdcEvents: u8 {
        /// Screen geometry or mode changed; the renderer must re-layout.
        const CONFIG_CHANGED = 0x01;
        /// Screen content may have changed.
        const DIRTY = 0x02;
    }
}

/// Display address output for one raster position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWord {
    pub address: u32,
    /// Cursor is shown on this line of the cell.
    pub cursor: bool,
    /// First raster line of a character row.
    pub new_row: bool,
    /// Character blink attribute phase (mixed mode).
    pub blink: bool,
}

/// NEC µPD7220.
pub struct Upd7220 {
    pram: [u8; 16],
    pram_len: usize,
    mode: GdcMode,
    args: [u8; 16],
    arg_count: usize,
    cmd: u8,
    bytes_to_read: u32,
    display_lines: u32,
    line: u32,
    line_cycles: u32,
    cycles_per_line: u32,
    mask: u16,
    status: u8,
    lines_per_row: u32,
    words_per_row: u32,
    pitch: u32,
    figure_slanted: bool,
    figure_graphics: bool,
    figure_dir: u8,
    figure_dc: u32,
    figure_gd: bool,
    figure_d: u32,
    figure_d1: u32,
    figure_d2: u32,
    figure_dm: u32,
    blink_counter: u32,
    blink_rate: u32,
    char_blink_phase: u32,
    cursor_addr: u32,
    cursor_dot: u32,
    cursor_top: u32,
    cursor_bottom: u32,
    cursor_blink_on: bool,
    cursor_blinking: bool,
    cursor_enabled: bool,
    screen_enabled: bool,
}

impl Upd7220 {
    #[must_use]
    pub fn new(clock: MasterClock) -> Self {
        let mut gdc = Self {
            pram: [0; 16],
            pram_len: 0,
            mode: GdcMode::Invalid,
            args: [0; 16],
            arg_count: 0,
            cmd: 0,
            bytes_to_read: 0,
            display_lines: 0,
            line: 0,
            line_cycles: 0,
            cycles_per_line: 0,
            mask: 0,
            status: STATUS_FIFO_EMPTY,
            lines_per_row: 0,
            words_per_row: 0,
            pitch: 0,
            figure_slanted: false,
            figure_graphics: false,
            figure_dir: 0,
            figure_dc: 0,
            figure_gd: false,
            figure_d: 0,
            figure_d1: 0,
            figure_d2: 0,
            figure_dm: 0,
            blink_counter: 0,
            blink_rate: 0,
            char_blink_phase: 0,
            cursor_addr: 0,
            cursor_dot: 0,
            cursor_top: 0,
            cursor_bottom: 0,
            cursor_blink_on: false,
            cursor_blinking: false,
            cursor_enabled: false,
            screen_enabled: false,
        };
        gdc.set_clock(clock);
        gdc
    }

    /// Line timing follows the CPU clock: 312 lines per 20 ms frame.
    pub fn set_clock(&mut self, clock: MasterClock) {
        self.cycles_per_line = clock.ticks_per_line(u64::from(LINES_PER_FRAME)).get() as u32;
    }

    // --- CPU side ---

    #[must_use]
    pub fn read_status(&self) -> u8 {
        let mut v = self.status | STATUS_FIFO_EMPTY;
        if self.line < VSYNC_LINES {
            v |= STATUS_VSYNC;
        }
        if self.line_cycles < self.cycles_per_line / 2 {
            v |= STATUS_HBLANK;
        }
        v
    }

    pub fn read_data<V: Vram + ?Sized>(&mut self, vram: &V) -> u8 {
        let mut v = 0;
        if self.bytes_to_read > 0 && self.status & STATUS_DATA_AVAILABLE != 0 {
            if self.cmd & 0xE4 == 0xA0 {
                let word = vram.word(self.cursor_addr);
                match self.cmd & 0x18 {
                    0x00 => {
                        if self.bytes_to_read & 1 == 0 {
                            v = word as u8;
                        } else {
                            v = (word >> 8) as u8;
                            self.advance_cursor();
                        }
                    }
                    0x10 => {
                        v = word as u8;
                        self.advance_cursor();
                    }
                    _ => {
                        v = (word >> 8) as u8;
                        self.advance_cursor();
                    }
                }
                self.bytes_to_read -= 1;
                if self.bytes_to_read == 0 {
                    self.figure_dc = 0;
                }
            } else if self.cmd == 0xE0 {
                v = match self.bytes_to_read {
                    5 => self.cursor_addr as u8,
                    4 => (self.cursor_addr >> 8) as u8,
                    3 => ((self.cursor_addr >> 16) & 0x03) as u8,
                    2 => self.cursor_dot as u8,
                    _ => (self.cursor_dot >> 8) as u8,
                };
                self.bytes_to_read -= 1;
            }
        }
        if self.bytes_to_read == 0 {
            self.status &= !STATUS_DATA_AVAILABLE;
            self.status |= STATUS_FIFO_EMPTY;
        }
        v
    }

    pub fn write_command<V: Vram + ?Sized>(&mut self, vram: &mut V, value: u8) -> GdcEvents {
        self.status &= !STATUS_FIFO_EMPTY;
        self.arg_count = 0;
        self.cmd = value;
        self.execute(vram)
    }

    pub fn write_argument<V: Vram + ?Sized>(&mut self, vram: &mut V, value: u8) -> GdcEvents {
        self.status &= !STATUS_FIFO_EMPTY;
        if let Some(slot) = self.args.get_mut(self.arg_count) {
            *slot = value;
            self.arg_count += 1;
        }
        self.execute(vram)
    }

    /// Advance the raster by `cycles` T-states. Blink phases toggle at
    /// frame boundaries.
    pub fn cycles_elapsed(&mut self, cycles: u32) -> GdcEvents {
        let mut events = GdcEvents::empty();
        if !self.screen_enabled || cycles == 0 || self.cycles_per_line == 0 {
            return events;
        }
        self.line_cycles += cycles;
        while self.line_cycles >= self.cycles_per_line {
            self.line_cycles -= self.cycles_per_line;
            if self.line < LINES_PER_FRAME - 1 {
                self.line += 1;
                continue;
            }
            self.line = 0;
            if self.blink_counter > 0 {
                self.blink_counter -= 1;
            } else {
                self.blink_counter = if self.blink_rate > 0 { self.blink_rate } else { 32 };
                self.cursor_blink_on = !self.cursor_blink_on;
                if self.cursor_blink_on {
                    self.char_blink_phase = (self.char_blink_phase + 1) % 4;
                }
                events |= GdcEvents::DIRTY;
            }
        }
        events
    }

    // --- Display side ---

    #[must_use]
    pub fn mode(&self) -> GdcMode {
        self.mode
    }

    #[must_use]
    pub fn is_screen_enabled(&self) -> bool {
        self.screen_enabled
    }

    #[must_use]
    pub fn display_lines(&self) -> u32 {
        self.display_lines
    }

    #[must_use]
    pub fn char_row_height(&self) -> u32 {
        self.lines_per_row
    }

    #[must_use]
    pub fn char_col_count(&self) -> u32 {
        self.words_per_row
    }

    /// Number of complete character rows. Fewer than 8 lines per row is
    /// taken as a pseudo-graphics raster and yields 0.
    #[must_use]
    pub fn char_row_count(&self) -> u32 {
        let h = self.lines_per_row;
        if !self.screen_enabled || h < 8 {
            return 0;
        }
        let mut rows = 0;
        for p in self.text_partitions() {
            let len = self.partition_lines(p);
            rows += len / h;
            if len % h != 0 {
                break;
            }
        }
        if rows * h > self.display_lines {
            rows = self.display_lines / h;
        }
        rows
    }

    /// First raster line of the character area. Non-zero only in mixed
    /// mode with a graphics partition on top.
    #[must_use]
    pub fn char_top_line(&self) -> u32 {
        if self.mode == GdcMode::Mixed && self.pram_len >= 4 && self.pram[3] & 0x40 != 0 {
            self.partition_lines(0)
        } else {
            0
        }
    }

    /// Display address for word column `x` on raster line `y`, or `None`
    /// while blanked or outside the active partitions.
    #[must_use]
    pub fn display_value(&self, x: u32, y: u32) -> Option<DisplayWord> {
        if !self.screen_enabled || y >= self.display_lines {
            return None;
        }
        let partitions = match self.mode {
            GdcMode::Character => self.pram_len.min(16) / 4,
            GdcMode::Graphics | GdcMode::Mixed => self.pram_len.min(8) / 4,
            GdcMode::Invalid => return None,
        };
        let mut top = 0;
        for p in 0..partitions {
            let lines = self.partition_lines(p);
            if lines > 0 && y < top + lines {
                let py = y - top;
                let graphics = match self.mode {
                    GdcMode::Character => false,
                    GdcMode::Mixed => self.pram[p * 4 + 3] & 0x40 != 0,
                    _ => true,
                };
                if graphics {
                    return Some(DisplayWord {
                        address: self.partition_addr(p, 18) + py * self.pitch + x,
                        cursor: false,
                        new_row: false,
                        blink: false,
                    });
                }
                if self.lines_per_row == 0 {
                    return None;
                }
                let bits = if self.mode == GdcMode::Character { 12 } else { 18 };
                let address = self.partition_addr(p, bits) + (py / self.lines_per_row) * self.pitch + x;
                let cell_line = py % self.lines_per_row;
                let cursor = self.cursor_enabled
                    && address == self.cursor_addr
                    && (self.cursor_top..=self.cursor_bottom).contains(&cell_line)
                    && (!self.cursor_blinking || self.cursor_blink_on);
                return Some(DisplayWord {
                    address,
                    cursor,
                    new_row: cell_line == 0,
                    blink: self.mode == GdcMode::Mixed && self.char_blink_phase < 3,
                });
            }
            top += lines;
        }
        None
    }

    /// Character code (low byte of the display word) at cell `col`, `row`.
    #[must_use]
    pub fn screen_char<V: Vram + ?Sized>(&self, vram: &V, col: u32, row: u32) -> Option<u8> {
        let h = self.lines_per_row;
        if h == 0 || col >= self.words_per_row || row * h >= self.display_lines {
            return None;
        }
        let bits = if self.mode == GdcMode::Character { 13 } else { 18 };
        let mut row = row;
        for p in self.text_partitions() {
            let len = self.partition_lines(p);
            let rows = len / h;
            if row < rows {
                let addr = self.partition_addr(p, bits) + row * self.pitch + col;
                return Some(vram.word(addr & ADDR_MASK) as u8);
            }
            if len % h != 0 {
                break;
            }
            row -= rows;
        }
        None
    }

    // --- internals ---

    fn text_partitions(&self) -> Vec<usize> {
        match self.mode {
            GdcMode::Character => (0..4).filter(|p| p * 4 + 3 < self.pram_len).collect(),
            GdcMode::Mixed => (0..2)
                .filter(|p| p * 4 + 3 < self.pram_len && self.pram[p * 4 + 3] & 0x40 == 0)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn partition_lines(&self, p: usize) -> u32 {
        let i = p * 4;
        (u32::from(self.pram[i + 2]) >> 4) | ((u32::from(self.pram[i + 3]) << 4) & 0x3F0)
    }

    /// Start address of partition `p`, `bits` wide.
    fn partition_addr(&self, p: usize, bits: u32) -> u32 {
        let i = p * 4;
        let addr = u32::from(self.pram[i])
            | (u32::from(self.pram[i + 1]) << 8)
            | ((u32::from(self.pram[i + 2]) & 0x03) << 16);
        addr & ((1 << bits) - 1)
    }

    fn advance_cursor(&mut self) {
        self.cursor_addr = (self.cursor_addr + 1) & ADDR_MASK;
    }

    fn finish_args(&mut self) {
        self.arg_count = 0;
        self.status |= STATUS_FIFO_EMPTY;
    }

    fn execute<V: Vram + ?Sized>(&mut self, vram: &mut V) -> GdcEvents {
        let mut changed = false;
        self.status &= !STATUS_DATA_AVAILABLE;
        self.status |= STATUS_FIFO_EMPTY;
        let cmd = self.cmd;
        let n = self.arg_count;

        if cmd == 0 || cmd & 0xFE == 0x0E {
            // RESET / SYNC
            changed |= self.set_screen_enabled(cmd & 0x01 != 0);
            self.line = 0;
            self.line_cycles = 0;
            match n {
                1 => {
                    let old = self.mode;
                    self.mode = match self.args[0] & 0x22 {
                        0x00 => GdcMode::Mixed,
                        0x02 => GdcMode::Graphics,
                        0x20 => GdcMode::Character,
                        _ => GdcMode::Invalid,
                    };
                    if self.mode != old {
                        debug!("GDC: {:?} mode", self.mode);
                        changed = true;
                    }
                }
                2 => changed |= replace(&mut self.words_per_row, u32::from(self.args[1]) + 2),
                7 => changed |= replace(&mut self.display_lines, u32::from(self.args[6])),
                8 => self.arg_count = 0,
                _ => {}
            }
        } else if cmd & 0xFE == 0x0C {
            // BCTRL
            changed |= self.set_screen_enabled(cmd & 0x01 != 0);
        } else if cmd & 0xE4 == 0x20 {
            self.write_data(vram);
        } else if cmd == 0x46 {
            // ZOOM
            if n == 1 {
                if self.args[0] != 0 {
                    debug!("GDC: zoom factor {:#04X} not supported", self.args[0]);
                }
                self.finish_args();
            }
        } else if cmd == 0x47 {
            // PITCH
            if n == 1 {
                changed |= replace(&mut self.pitch, u32::from(self.args[0]));
                self.finish_args();
            }
        } else if cmd == 0x49 {
            // CURS
            if n == 2 {
                self.cursor_addr = u32::from(self.args[0]) | (u32::from(self.args[1]) << 8);
            } else if n == 3 {
                self.cursor_addr = (self.cursor_addr & 0xFFFF) | ((u32::from(self.args[2]) << 16) & 0x30000);
                self.cursor_dot = u32::from(self.args[2] >> 4);
                self.mask = 1 << self.cursor_dot;
                self.finish_args();
            }
        } else if cmd == 0x4A {
            // MASK
            if n == 1 {
                self.mask = u16::from(self.args[0]);
            } else if n == 2 {
                self.mask = u16::from(self.args[0]) | (u16::from(self.args[1]) << 8);
                self.finish_args();
            }
        } else if cmd == 0x4B {
            // CCHAR
            if n == 3 {
                changed |= replace(&mut self.lines_per_row, u32::from(self.args[0] & 0x1F) + 1);
                changed |= replace(&mut self.cursor_top, u32::from(self.args[1] & 0x1F));
                changed |= replace(&mut self.cursor_bottom, u32::from(self.args[2] >> 3));
                self.cursor_enabled = self.args[0] & 0x80 != 0;
                self.cursor_blinking = self.args[1] & 0x20 == 0;
                self.blink_rate = u32::from(self.args[1] >> 6) | ((u32::from(self.args[2]) << 2) & 0x1C);
                self.finish_args();
            }
        } else if cmd == 0x4C {
            self.figure_setup();
        } else if cmd == 0x6B {
            // START
            changed |= self.set_screen_enabled(true);
            self.finish_args();
        } else if cmd & 0xF0 == 0x70 {
            // PRAM
            if n > 0 {
                let dst = usize::from(cmd & 0x0F) + n - 1;
                if let Some(slot) = self.pram.get_mut(dst) {
                    changed |= replace(slot, self.args[n - 1]);
                }
                self.pram_len = dst + 1;
            }
        } else if cmd & 0xE4 == 0xA0 {
            // RDAT
            if cmd & 0x18 != 0x08 && self.figure_dc > 0 {
                self.bytes_to_read = if cmd & 0x18 == 0 { self.figure_dc * 2 } else { self.figure_dc };
                self.status |= STATUS_DATA_AVAILABLE;
                self.status &= !STATUS_FIFO_EMPTY;
            }
            self.arg_count = 0;
        } else if cmd == 0xE0 {
            // CURD
            self.bytes_to_read = 5;
            self.arg_count = 0;
            self.status |= STATUS_DATA_AVAILABLE;
            self.status &= !STATUS_FIFO_EMPTY;
        } else {
            self.finish_args();
        }

        let mut events = GdcEvents::DIRTY;
        if changed {
            events |= GdcEvents::CONFIG_CHANGED;
        }
        events
    }

    fn set_screen_enabled(&mut self, enabled: bool) -> bool {
        replace(&mut self.screen_enabled, enabled)
    }

    fn figure_setup(&mut self) {
        let a = &self.args;
        let wide = |lo: usize| u32::from(a[lo]) | ((u32::from(a[lo + 1]) << 8) & 0x3F00);
        match self.arg_count {
            1 => {
                let v = a[0];
                self.figure_slanted = v & 0x80 != 0;
                self.figure_graphics = v & 0x10 != 0;
                self.figure_dir = v & 0x07;
            }
            2 => self.figure_dc = u32::from(a[1]),
            3 => {
                self.figure_dc = wide(1);
                self.figure_gd = a[2] & 0x40 != 0;
            }
            4 => self.figure_d = u32::from(a[3]),
            5 => self.figure_d = wide(3),
            6 => self.figure_d2 = u32::from(a[5]),
            7 => self.figure_d2 = wide(5),
            8 => self.figure_d1 = u32::from(a[7]),
            9 => self.figure_d1 = wide(7),
            10 => self.figure_dm = u32::from(a[9]),
            11 => {
                self.figure_dm = wide(9);
                self.finish_args();
            }
            _ => {}
        }
    }

    /// WDAT: write a word, low byte or high byte `DC + 1` times, moving
    /// the cursor in the figure direction after each write.
    fn write_data<V: Vram + ?Sized>(&mut self, vram: &mut V) {
        let transfer = self.cmd & 0x18;
        let value = match (transfer, self.arg_count) {
            (0x00, 2) => Some(u16::from(self.args[0]) | (u16::from(self.args[1]) << 8)),
            (0x10, 1) => Some(u16::from(self.args[0])),
            (0x18, 1) => Some(u16::from(self.args[0]) << 8),
            (_, n) if n > 2 => {
                self.finish_args();
                None
            }
            _ => None,
        };
        let Some(value) = value else {
            return;
        };
        let op = self.cmd & 0x03;
        for _ in 0..=self.figure_dc {
            if self.figure_slanted || self.figure_graphics || self.figure_gd {
                debug!("GDC: WDAT in figure drawing mode not supported");
            } else {
                let old = vram.word(self.cursor_addr);
                let kept = old & !self.mask;
                let new = match op {
                    0 => (value & self.mask) | kept,
                    1 => (!old & self.mask) | kept,
                    2 => kept,
                    _ => self.mask | kept,
                };
                vram.set_word(self.cursor_addr, new);
            }
            self.step_cursor(transfer);
        }
        self.figure_dc = 0;
        self.finish_args();
    }

    fn step_cursor(&mut self, transfer: u8) {
        match self.figure_dir {
            0 | 1 | 7 => self.cursor_addr = self.cursor_addr.wrapping_add(self.pitch),
            3..=5 => self.cursor_addr = self.cursor_addr.wrapping_sub(self.pitch),
            _ => {}
        }
        let m = self.mask;
        match self.figure_dir {
            1..=3 => {
                let (carry, next) = match transfer {
                    0x00 => (m & 0x8000 != 0, m.rotate_left(1)),
                    0x10 => (m & 0x0080 != 0, (m & 0xFF00) | u16::from((m as u8).rotate_left(1))),
                    _ => (m & 0x8000 != 0, (m & 0x00FF) | (u16::from(((m >> 8) as u8).rotate_left(1)) << 8)),
                };
                self.mask = next;
                if carry {
                    self.cursor_addr = self.cursor_addr.wrapping_add(1);
                }
            }
            5..=7 => {
                let (carry, next) = match transfer {
                    0x00 => (m & 0x0001 != 0, m.rotate_right(1)),
                    0x10 => (m & 0x0001 != 0, (m & 0xFF00) | u16::from((m as u8).rotate_right(1))),
                    _ => (m & 0x0100 != 0, (m & 0x00FF) | (u16::from(((m >> 8) as u8).rotate_right(1)) << 8)),
                };
                self.mask = next;
                if carry {
                    self.cursor_addr = self.cursor_addr.wrapping_sub(1);
                }
            }
            _ => {}
        }
        self.cursor_addr &= ADDR_MASK;
    }
}

/// Store `new` into `slot`; returns whether the value changed.
fn replace<T: PartialEq>(slot: &mut T, new: T) -> bool {
    if *slot == new {
        false
    } else {
        *slot = new;
        true
    }
}

impl Observable for Upd7220 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "mode" => Some(format!("{:?}", self.mode).into()),
            "screen_enabled" => Some(self.screen_enabled.into()),
            "cursor" => Some(self.cursor_addr.into()),
            "pitch" => Some(self.pitch.into()),
            "lines_per_row" => Some(self.lines_per_row.into()),
            "display_lines" => Some(self.display_lines.into()),
            "line" => Some(self.line.into()),
            "status" => Some(self.read_status().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "mode",
            "screen_enabled",
            "cursor",
            "pitch",
            "lines_per_row",
            "display_lines",
            "line",
            "status",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Words(Vec<u16>);

    impl Vram for Words {
        fn word(&self, addr: u32) -> u16 {
            self.0.get(addr as usize).copied().unwrap_or(0xFFFF)
        }

        fn set_word(&mut self, addr: u32, value: u16) {
            if let Some(w) = self.0.get_mut(addr as usize) {
                *w = value;
            }
        }
    }

    fn vram() -> Words {
        Words(vec![0; 0x800])
    }

    /// Character mode, 80 words per row, 256 display lines, 16 lines per
    /// row, one partition of 256 lines at address 0, pitch 80.
    fn text_gdc(v: &mut Words) -> Upd7220 {
        let mut gdc = Upd7220::new(MasterClock::from_khz(2000));
        gdc.write_command(v, 0x0F);
        for a in [0x20, 78, 0, 0, 0, 0, 0xFF] {
            gdc.write_argument(v, a);
        }
        gdc.write_command(v, 0x47);
        gdc.write_argument(v, 80);
        gdc.write_command(v, 0x4B);
        for a in [0x8F, 0x20, 0x78] {
            gdc.write_argument(v, a);
        }
        gdc.write_command(v, 0x70);
        for a in [0x00, 0x00, 0x00, 0x10] {
            gdc.write_argument(v, a);
        }
        gdc
    }

    #[test]
    fn sync_sets_geometry() {
        let mut v = vram();
        let gdc = text_gdc(&mut v);
        assert_eq!(gdc.mode(), GdcMode::Character);
        assert!(gdc.is_screen_enabled());
        assert_eq!(gdc.char_col_count(), 80);
        assert_eq!(gdc.display_lines(), 0xFF);
        assert_eq!(gdc.char_row_height(), 16);
        // 256 partition lines / 16, clipped to 255 display lines
        assert_eq!(gdc.char_row_count(), 15);
    }

    #[test]
    fn display_value_walks_partition() {
        let mut v = vram();
        let gdc = text_gdc(&mut v);
        let w = gdc.display_value(3, 32).unwrap();
        assert_eq!(w.address, 2 * 80 + 3);
        assert!(w.new_row);
        assert!(!gdc.display_value(3, 33).unwrap().new_row);
        assert_eq!(gdc.display_value(0, 300), None);
    }

    #[test]
    fn cursor_marks_configured_lines() {
        let mut v = vram();
        let mut gdc = text_gdc(&mut v);
        gdc.write_command(&mut v, 0x49);
        gdc.write_argument(&mut v, 81);
        gdc.write_argument(&mut v, 0);
        // Steady cursor (CCHAR arg1 bit 5 set), lines 0..=15.
        assert!(gdc.display_value(1, 16).unwrap().cursor);
        assert!(gdc.display_value(1, 31).unwrap().cursor);
        assert!(!gdc.display_value(2, 16).unwrap().cursor);
    }

    #[test]
    fn wdat_word_replace_and_advance() {
        let mut v = vram();
        let mut gdc = text_gdc(&mut v);
        gdc.write_command(&mut v, 0x4C);
        gdc.write_argument(&mut v, 0x02); // direction: right
        gdc.write_command(&mut v, 0x49);
        gdc.write_argument(&mut v, 5);
        gdc.write_argument(&mut v, 0);
        gdc.write_command(&mut v, 0x4A);
        gdc.write_argument(&mut v, 0xFF);
        gdc.write_argument(&mut v, 0xFF);
        gdc.write_command(&mut v, 0x20);
        gdc.write_argument(&mut v, 0x41);
        gdc.write_argument(&mut v, 0x07);
        assert_eq!(v.0[5], 0x0741);
        // All-ones mask rotates with carry: cursor moves to the next word.
        assert_eq!(gdc.query("cursor"), Some(Value::U32(6)));
        assert_eq!(gdc.screen_char(&v, 5, 0), Some(0x41));
    }

    #[test]
    fn curd_reads_cursor_back() {
        let mut v = vram();
        let mut gdc = text_gdc(&mut v);
        gdc.write_command(&mut v, 0x49);
        gdc.write_argument(&mut v, 0x34);
        gdc.write_argument(&mut v, 0x12);
        gdc.write_command(&mut v, 0xE0);
        assert_ne!(gdc.read_status() & STATUS_DATA_AVAILABLE, 0);
        assert_eq!(gdc.read_data(&v), 0x34);
        assert_eq!(gdc.read_data(&v), 0x12);
        gdc.read_data(&v);
        gdc.read_data(&v);
        gdc.read_data(&v);
        assert_eq!(gdc.read_status() & STATUS_DATA_AVAILABLE, 0);
    }

    #[test]
    fn config_change_reported_once() {
        let mut v = vram();
        let mut gdc = text_gdc(&mut v);
        gdc.write_command(&mut v, 0x47);
        let same = gdc.write_argument(&mut v, 80);
        assert_eq!(same, GdcEvents::DIRTY);
        gdc.write_command(&mut v, 0x47);
        let changed = gdc.write_argument(&mut v, 40);
        assert!(changed.contains(GdcEvents::CONFIG_CHANGED));
    }

    #[test]
    fn vsync_at_frame_start() {
        let mut v = vram();
        let mut gdc = text_gdc(&mut v);
        assert_ne!(gdc.read_status() & STATUS_VSYNC, 0);
        gdc.cycles_elapsed(128 * 60);
        assert_eq!(gdc.read_status() & STATUS_VSYNC, 0);
    }

    #[test]
    fn blink_toggles_after_rate_frames() {
        let mut v = vram();
        let mut gdc = text_gdc(&mut v);
        let frame = 128 * LINES_PER_FRAME;
        // First frame end reloads the counter and toggles.
        assert!(gdc.cycles_elapsed(frame).contains(GdcEvents::DIRTY));
        assert!(!gdc.cycles_elapsed(frame).contains(GdcEvents::DIRTY));
    }
}
