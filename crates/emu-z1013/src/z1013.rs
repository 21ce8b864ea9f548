//! The Z1013 board.
//!
//! # Memory map
//!
//! | Range       | Content                                        |
//! |-------------|------------------------------------------------|
//! | 0000-03FF   | Static RAM (Z1013.12 only)                     |
//! | 0000-ram_end| Generic RAM                                    |
//! | EC00-EFFF   | Character RAM, or a pixel bank in graphics mode|
//! | F000-       | Monitor ROM unless switched off by port 4 bit 4|
//!
//! # Ports
//!
//! Only the low byte is decoded. The PIO, the keyboard column latch and
//! the graphics switches are selected by `port & 0x1C`, so they repeat
//! all over the port space.
//!
//! | Port       | Function                                            |
//! |------------|-----------------------------------------------------|
//! | 04         | System flags: ROM off, alt font, 4 MHz, 64x16       |
//! | 18/19      | CC-Jena GDC parameter/status and command/data       |
//! | 58-5F      | RAM floppy 2                                        |
//! | 98-9F      | RAM floppy 1                                        |
//! | `&1C`=00   | PIO: A data, A control, B data, B control           |
//! | `&1C`=08   | Keyboard column (write); pixel bank select          |
//! | `&1C`=0C   | Graphics on                                         |
//! | `&1C`=10   | Graphics off                                        |
//!
//! PIO B0-B3 carry the keyboard rows, B4 selects the upper row nibble
//! of the alpha keyboard, B5 is wired to address line A0, B6 is the tape
//! input and B7 the tape/audio output.

use std::sync::Arc;

use emu_core::{
    AudioLine, CpuLink, DisplayFlags, Host, InterruptSource, KeyboardMatrix, MachineUnit,
    MasterClock, MemoryMap, Observable, PortMap, Profile, Registrations, ResetLevel, Rom,
    Subscription, Ticks, Value, accept, fill_random, finish, propagate_enable,
};
use log::{debug, info};
use nec_upd7220::GdcEvents;
use parking_lot::Mutex;
use zilog_z80_pio::{PioPort, Z80Pio};

use crate::ccjena::CcJena;
use crate::config::Z1013Config;
use crate::frontend::{Shared, Z1013Frontend};
use crate::keyboard::Z1013Keyboard;
use crate::roms::{Fonts, Z1013Roms};
use crate::video::{VIDEO_BASE, VIDEO_SIZE, Video};

const ROM_BASE: u16 = 0xF000;
const STATIC_RAM_SIZE: usize = 0x0400;

/// Value of a port nobody answers.
const IDLE: u8 = 0x0F;

const FLAG_ROM_OFF: u8 = 0x10;
const FLAG_ALT_FONT: u8 = 0x20;
const FLAG_4MHZ: u8 = 0x40;
const FLAG_64X16: u8 = 0x80;

const PIO_B_ROWS: u8 = 0x0F;
const PIO_B_AUX: u8 = 0x10;
const PIO_B_A0: u8 = 0x20;
const PIO_B_TAPE_IN: u8 = 0x40;
const PIO_B_TAPE_OUT: u8 = 0x80;

/// A Z1013 machine unit.
pub struct Z1013 {
    config: Z1013Config,
    monitor: Option<Rom>,
    pio: Z80Pio,
    static_ram: Option<Box<[u8; STATIC_RAM_SIZE]>>,
    shared: Arc<Shared>,
    rom_disabled: bool,
    mode_4mhz: bool,
    pixel_bank: usize,
    keyboard_col: usize,
    /// First byte of a possible EC00/EC01 write pair that switches the
    /// CC-Jena card off.
    card_switch_addr: Option<u16>,
    audio: AudioLine,
    registrations: Registrations,
}

impl Z1013 {
    /// Build the board. `user_font` replaces the built-in character
    /// sets when given.
    #[must_use]
    pub fn new(config: Z1013Config, roms: &Z1013Roms, user_font: Option<&Rom>) -> Self {
        let clock = MasterClock::from_khz(config.variant.default_speed_khz());
        let card = config.cc_jena.then(|| CcJena::new(clock));
        let keyboard = Z1013Keyboard::new(
            config.keyboard,
            clock.ticks_for_millis(config.prehold_ms),
        );
        let shared = Arc::new(Shared {
            video: Mutex::new(Video::new(config.graphic, card)),
            keyboard: Mutex::new(keyboard),
            flags: DisplayFlags::new(),
            fonts: Fonts::new(roms, user_font),
            ccj_font: roms.ccj_font.clone(),
        });
        let monitor = roms.monitor(config.monitor).cloned();
        if monitor.is_none() {
            info!("Z1013: no image for monitor {:?}", config.monitor);
        }
        Self {
            static_ram: config
                .variant
                .has_static_ram()
                .then(|| Box::new([0; STATIC_RAM_SIZE])),
            config,
            monitor,
            pio: Z80Pio::new(),
            shared,
            rom_disabled: false,
            mode_4mhz: false,
            pixel_bank: 0,
            keyboard_col: 0,
            card_switch_addr: None,
            audio: AudioLine::new(),
            registrations: Registrations::new("Z1013"),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Z1013Config {
        &self.config
    }

    #[must_use]
    pub fn pio(&self) -> &Z80Pio {
        &self.pio
    }

    fn chain(&mut self) -> [&mut dyn InterruptSource; 1] {
        [&mut self.pio]
    }

    fn rom_byte(&self, addr: u16) -> Option<u8> {
        if self.rom_disabled || addr < ROM_BASE {
            return None;
        }
        self.monitor
            .as_ref()
            .and_then(|rom| rom.get(usize::from(addr - ROM_BASE)))
    }

    fn video_offset(addr: u16) -> Option<usize> {
        let offset = usize::from(addr.wrapping_sub(VIDEO_BASE));
        (addr >= VIDEO_BASE && offset < VIDEO_SIZE).then_some(offset)
    }

    fn flags(&self) -> u8 {
        let video = self.shared.video.lock();
        let mut v = 0;
        if self.rom_disabled {
            v |= FLAG_ROM_OFF;
        }
        if video.alt_font {
            v |= FLAG_ALT_FONT;
        }
        if video.mode_64x16 {
            v |= FLAG_64X16;
        }
        if self.mode_4mhz {
            v |= FLAG_4MHZ;
        }
        v
    }

    fn write_flags<H: Host + ?Sized>(&mut self, host: &mut H, value: u8) {
        self.rom_disabled = value & FLAG_ROM_OFF != 0;
        {
            let mut video = self.shared.video.lock();
            let alt_font = value & FLAG_ALT_FONT != 0;
            let mode_64x16 = value & FLAG_64X16 != 0;
            if alt_font != video.alt_font || mode_64x16 != video.mode_64x16 {
                video.alt_font = alt_font;
                video.mode_64x16 = mode_64x16;
                self.shared.flags.mark_dirty();
            }
        }
        let base_khz = self.config.variant.default_speed_khz();
        if value & FLAG_4MHZ != 0 {
            if !self.mode_4mhz && host.cpu_speed_khz() == 2000 {
                self.set_speed(host, 4000);
                self.mode_4mhz = true;
            }
        } else if self.mode_4mhz {
            self.set_speed(host, base_khz);
            self.mode_4mhz = false;
        }
    }

    fn set_speed<H: Host + ?Sized>(&self, host: &mut H, khz: u32) {
        debug!("Z1013: CPU speed {khz} kHz");
        host.set_cpu_speed_khz(khz);
        if let Some(card) = &mut self.shared.video.lock().card {
            card.set_clock(MasterClock::from_khz(khz));
        }
    }

    fn set_graphics(&self, on: bool) {
        if !self.config.graphic {
            return;
        }
        let mut video = self.shared.video.lock();
        if video.graphics != on {
            video.graphics = on;
            self.shared.flags.mark_dirty();
        }
    }

    /// Present the selected keyboard column on B0-B3 (low active).
    fn put_rows(&mut self) {
        let aux = self.pio.out_value(PioPort::B) & PIO_B_AUX != 0;
        let rows = self
            .shared
            .keyboard
            .lock()
            .row_values_for(self.keyboard_col, aux);
        self.pio.put_in_value(PioPort::B, !rows & PIO_B_ROWS, PIO_B_ROWS);
    }

    fn drive_a0(&mut self, addr: u16) {
        self.pio
            .put_in_value(PioPort::B, ((addr << 5) as u8) & PIO_B_A0, PIO_B_A0);
    }

    fn card_events(&self, events: GdcEvents, card_active: bool) {
        if card_active && events.intersects(GdcEvents::DIRTY | GdcEvents::CONFIG_CHANGED) {
            self.shared.flags.mark_dirty();
        }
    }

    fn write_video(&mut self, offset: usize, addr: u16, value: u8) {
        let mut video = self.shared.video.lock();
        if let Some(cell) = video.window(self.pixel_bank).and_then(|w| w.get_mut(offset)) {
            *cell = value;
        }
        if video.card_active {
            if addr == VIDEO_BASE {
                self.card_switch_addr = Some(addr);
            } else if self.card_switch_addr == Some(addr.wrapping_sub(1)) {
                debug!("Z1013: CC-Jena card off");
                video.card_active = false;
                self.card_switch_addr = None;
            } else {
                self.card_switch_addr = None;
            }
        }
        self.shared.flags.mark_dirty();
    }

    fn read_pio<H: Host + ?Sized>(&mut self, host: &mut H, reg: u8) -> u8 {
        match reg {
            0 => self.pio.read_data(PioPort::A),
            1 => self.pio.read_control(PioPort::A),
            2 => {
                let tape = if host.audio_in_phase() { PIO_B_TAPE_IN } else { 0 };
                self.pio.put_in_value(PioPort::B, tape, PIO_B_TAPE_IN);
                self.put_rows();
                self.pio.read_data(PioPort::B)
            }
            _ => self.pio.read_control(PioPort::B),
        }
    }

    fn write_pio<H: Host + ?Sized>(&mut self, host: &mut H, reg: u8, value: u8) {
        match reg {
            0 => self.pio.write_data(PioPort::A, value),
            1 => self.pio.write_control(PioPort::A, value),
            2 => {
                self.pio.write_data(PioPort::B, value);
                self.put_rows();
                let out = self.pio.fetch_out_value(PioPort::B, false);
                self.audio.set(host, out & PIO_B_TAPE_OUT != 0);
            }
            _ => self.pio.write_control(PioPort::B, value),
        }
        let mut chain = self.chain();
        propagate_enable(&mut chain);
    }
}

impl MemoryMap for Z1013 {
    fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8 {
        if let Some(v) = self.rom_byte(addr) {
            return v;
        }
        if let Some(offset) = Self::video_offset(addr) {
            return self
                .shared
                .video
                .lock()
                .window(self.pixel_bank)
                .and_then(|w| w.get(offset).copied())
                .unwrap_or(0xFF);
        }
        if let Some(ram) = &self.static_ram
            && let Some(&v) = ram.get(usize::from(addr))
        {
            return v;
        }
        if addr <= self.config.variant.ram_end() {
            host.read_ram(addr)
        } else {
            0xFF
        }
    }

    fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool {
        if self.rom_byte(addr).is_some() {
            return true;
        }
        if let Some(offset) = Self::video_offset(addr) {
            self.write_video(offset, addr, value);
            return true;
        }
        if self.config.monitor.hex_mode_cell() == Some(addr) {
            self.shared.keyboard.lock().set_hex_mode(value == b'H');
        }
        if let Some(ram) = &mut self.static_ram
            && let Some(cell) = ram.get_mut(usize::from(addr))
        {
            *cell = value;
            return true;
        }
        if addr <= self.config.variant.ram_end() {
            host.write_ram(addr, value);
            true
        } else {
            false
        }
    }
}

impl PortMap for Z1013 {
    fn read_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16) -> u8 {
        let p = port as u8;
        let has_card = self.config.cc_jena;
        let value = match p {
            0x04 => self.flags(),
            0x18 if has_card => self
                .shared
                .video
                .lock()
                .card
                .as_ref()
                .map_or(IDLE, CcJena::read_status),
            0x19 if has_card => self
                .shared
                .video
                .lock()
                .card
                .as_mut()
                .map_or(IDLE, CcJena::read_data),
            _ if p & 0xF8 == 0x98 => host.read_mass_storage(0, p & 7).unwrap_or(IDLE),
            _ if p & 0xF8 == 0x58 => host.read_mass_storage(1, p & 7).unwrap_or(IDLE),
            _ => match p & 0x1C {
                0x00 => self.read_pio(host, p & 3),
                0x0C => {
                    self.set_graphics(true);
                    IDLE
                }
                0x10 => {
                    self.set_graphics(false);
                    IDLE
                }
                _ => IDLE,
            },
        };
        self.drive_a0(port);
        value
    }

    fn write_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16, value: u8) {
        let p = port as u8;
        let has_card = self.config.cc_jena;
        match p {
            0x04 => self.write_flags(host, value),
            0x18 if has_card => {
                let mut video = self.shared.video.lock();
                let active = video.card_active;
                if let Some(card) = &mut video.card {
                    let events = card.write_argument(value);
                    self.card_events(events, active);
                }
            }
            0x19 if has_card => {
                let mut video = self.shared.video.lock();
                if let Some(card) = &mut video.card {
                    card.write_command(value);
                    if !video.card_active {
                        debug!("Z1013: CC-Jena card on");
                        video.card_active = true;
                    }
                    self.shared.flags.mark_dirty();
                }
            }
            _ if p & 0xF8 == 0x98 => host.write_mass_storage(0, p & 7, value),
            _ if p & 0xF8 == 0x58 => host.write_mass_storage(1, p & 7, value),
            _ => match p & 0x1C {
                0x00 => self.write_pio(host, p & 3, value),
                0x08 => {
                    self.keyboard_col = usize::from(value & 0x0F);
                    self.put_rows();
                    if self.config.graphic {
                        match value & 0x0F {
                            8 => self.set_graphics(true),
                            9 => self.set_graphics(false),
                            _ => {}
                        }
                        self.pixel_bank = usize::from(value & 7);
                    }
                }
                0x0C => self.set_graphics(true),
                0x10 => self.set_graphics(false),
                _ => {}
            },
        }
        self.drive_a0(port);
    }
}

impl MachineUnit for Z1013 {
    type Frontend = Z1013Frontend;

    fn name(&self) -> &'static str {
        "Z1013"
    }

    fn frontend(&self) -> Z1013Frontend {
        Z1013Frontend {
            shared: Arc::clone(&self.shared),
        }
    }

    fn default_speed_khz(&self) -> u32 {
        self.config.variant.default_speed_khz()
    }

    fn cycles_elapsed<H: Host + ?Sized>(&mut self, _host: &mut H, cycles: u32) {
        {
            let mut keyboard = self.shared.keyboard.lock();
            if keyboard.is_holding() {
                keyboard.advance(Ticks::from(cycles));
            }
        }
        if self.config.cc_jena {
            let mut video = self.shared.video.lock();
            let active = video.card_active;
            if let Some(card) = &mut video.card {
                let events = card.cycles_elapsed(cycles);
                self.card_events(events, active);
            }
        }
    }

    fn address_changed<H: Host + ?Sized>(&mut self, _host: &mut H, addr: u16) {
        self.drive_a0(addr);
    }

    fn interrupt_requested(&self) -> bool {
        self.pio.interrupt_requested()
    }

    fn accept_interrupt(&mut self) -> Option<u8> {
        accept(&mut self.chain())
    }

    fn interrupt_finished(&mut self) {
        finish(&mut self.chain());
    }

    fn reset<H: Host + ?Sized>(&mut self, host: &mut H, level: ResetLevel) {
        info!("Z1013: {level:?} reset");
        self.rom_disabled = false;
        if self.mode_4mhz {
            self.set_speed(host, self.config.variant.default_speed_khz());
            self.mode_4mhz = false;
        }
        {
            let mut video = self.shared.video.lock();
            video.alt_font = false;
            video.mode_64x16 = false;
            video.graphics = false;
            video.card_active = false;
            if level.is_power_on() {
                video.power_on();
                if let Some(card) = &mut video.card {
                    card.reset(true);
                }
            }
        }
        if level.is_power_on()
            && let Some(ram) = &mut self.static_ram
        {
            fill_random(&mut ram[..]);
        }
        self.pio.reset(level.resets_chips());
        self.shared.keyboard.lock().key_released();
        self.pixel_bank = 0;
        self.keyboard_col = 0;
        self.card_switch_addr = None;
        self.shared.flags.mark_dirty();
    }

    fn attach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.attach(
            cpu,
            &[Subscription::Cycles, Subscription::AddressBus],
            1,
        );
    }

    fn detach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.release(cpu);
    }

    fn requires_reset(&self, profile: &Profile) -> bool {
        Z1013Config::from_profile(profile).is_none_or(|c| c != self.config)
    }
}

impl Observable for Z1013 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("pio.") {
            return self.pio.query(rest);
        }
        match path {
            "rom_disabled" => Some(self.rom_disabled.into()),
            "mode_4mhz" => Some(self.mode_4mhz.into()),
            "keyboard_col" => Some((self.keyboard_col as u8).into()),
            "pixel_bank" => Some((self.pixel_bank as u8).into()),
            "graphics" => Some(self.shared.video.lock().graphics.into()),
            "alt_font" => Some(self.shared.video.lock().alt_font.into()),
            "mode_64x16" => Some(self.shared.video.lock().mode_64x16.into()),
            "card_active" => Some(self.shared.video.lock().card_active.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "rom_disabled",
            "mode_4mhz",
            "keyboard_col",
            "pixel_bank",
            "graphics",
            "alt_font",
            "mode_64x16",
            "card_active",
            "pio.<pio path>",
        ]
    }
}
