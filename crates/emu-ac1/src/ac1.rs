//! The AC1 board.
//!
//! # Memory map
//!
//! | Range     | Content                                               |
//! |-----------|-------------------------------------------------------|
//! | 0000-0FFF | OS ROM; Mini-BASIC at 0800 next to monitor 3.1        |
//! | 1000-17FF | Video RAM (1000-13FF on the 64x16 board)              |
//! | 1800-1FFF | Static RAM (1800-1BFF on the 64x16 board)             |
//! | 4000-5FFF | SCCH GS-BASIC ROM when switched in                    |
//! | 2000-FFFF | Generic RAM, except on the 64x16 board                |
//!
//! Port 1C-1F bit 0 maps generic RAM over the whole lower 8 KB. Under
//! SCCH every write below 1000 also reaches the RAM beneath the ROM.
//!
//! # Ports
//!
//! | Port  | Function                                               |
//! |-------|--------------------------------------------------------|
//! | 00-03 | CTC                                                    |
//! | 04-07 | PIO: A data, B data, A control, B control              |
//! | 14    | SCCH: bit 1 GS-BASIC, bit 2 lower DRAM                 |
//! | 16/17 | SCCH: OS ROM off/on                                    |
//! | 1C-1F | Lower DRAM on/off (bit 0)                              |
//! | E0-E7 | RAM floppy                                             |
//!
//! PIO A carries the keyboard code. PIO B2 is the graphics key (low
//! active), B3 the font switch on SCCH 10/88, B6 the tape output, B0
//! the loudspeaker and B7 the tape input. CTC channels are chained
//! ZC/TO0 -> TRG1 -> ... -> TRG3.

use std::sync::Arc;

use emu_core::{
    AudioLine, CpuLink, DisplayFlags, Host, InterruptSource, MachineUnit, MemoryMap, Observable,
    PortMap, Profile, Registrations, ResetLevel, Rom, Subscription, Value, accept, fill_random,
    finish, propagate_enable,
};
use log::{debug, info};
use parking_lot::Mutex;
use zilog_z80_ctc::Z80Ctc;
use zilog_z80_pio::{PioPort, Z80Pio};

use crate::config::{Ac1Config, Ac1Os};
use crate::frontend::{Ac1Frontend, Shared};
use crate::keyboard::Ac1Keyboard;
use crate::roms::Ac1Roms;
use crate::video::{Charset, Video};

const IDLE: u8 = 0xFF;

const OS_END: u16 = 0x1000;
const MINIBASIC_BASE: u16 = 0x0800;
const VIDEO_BASE: u16 = 0x1000;
const STATIC_BASE: u16 = 0x1800;
const LOWER_END: u16 = 0x2000;
const GSBASIC_BASE: u16 = 0x4000;
const GSBASIC_END: u16 = 0x6000;

const PIO_B_LOUDSPEAKER: u8 = 0x01;
const PIO_B_GRAPHIC_KEY: u8 = 0x04;
const PIO_B_FONT: u8 = 0x08;
const PIO_B_TAPE_OUT: u8 = 0x40;
const PIO_B_TAPE_IN: u8 = 0x80;

const FONT_BANK: usize = 0x0800;

/// An AC1 machine unit.
pub struct Ac1 {
    config: Ac1Config,
    os_rom: Option<Rom>,
    minibasic: Option<Rom>,
    gsbasic: Option<Rom>,
    ctc: Z80Ctc,
    pio: Z80Pio,
    static_ram: Box<[u8]>,
    shared: Arc<Shared>,
    /// PIO A has been read since reset.
    keyboard_used: bool,
    lower_dram: bool,
    os_rom_enabled: bool,
    gsbasic_enabled: bool,
    font_switch: bool,
    audio: AudioLine,
    registrations: Registrations,
}

impl Ac1 {
    #[must_use]
    pub fn new(config: Ac1Config, roms: &Ac1Roms, user_font: Option<&Rom>) -> Self {
        let os = config.os;
        let charset = match os {
            Ac1Os::Mon31_64x16 => Charset::U402,
            Ac1Os::Mon31_64x32 => Charset::Ccd,
            Ac1Os::Scch80 => Charset::Scch,
            Ac1Os::Scch1088 => Charset::Switchable,
        };
        let shared = Arc::new(Shared {
            video: Mutex::new(Video::new(os.sram_size(), os.is_64x16(), os.is_scch(), charset)),
            keyboard: Mutex::new(Ac1Keyboard::new(os.is_scch())),
            flags: DisplayFlags::new(),
            font: roms.font(os, user_font),
        });
        let os_rom = roms.os(os).cloned();
        if os_rom.is_none() {
            info!("AC1: no image for {os:?}");
        }
        let mut ctc = Z80Ctc::new();
        ctc.connect(0, 1);
        ctc.connect(1, 2);
        ctc.connect(2, 3);
        Self {
            config,
            os_rom,
            minibasic: roms.minibasic.clone(),
            gsbasic: roms.gsbasic.clone(),
            ctc,
            pio: Z80Pio::new(),
            static_ram: vec![0; os.sram_size()].into_boxed_slice(),
            shared,
            keyboard_used: false,
            lower_dram: false,
            os_rom_enabled: true,
            gsbasic_enabled: false,
            font_switch: false,
            audio: AudioLine::new(),
            registrations: Registrations::new("AC1"),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Ac1Config {
        &self.config
    }

    #[must_use]
    pub fn ctc(&self) -> &Z80Ctc {
        &self.ctc
    }

    #[must_use]
    pub fn pio(&self) -> &Z80Pio {
        &self.pio
    }

    fn chain(&mut self) -> [&mut dyn InterruptSource; 2] {
        [&mut self.ctc, &mut self.pio]
    }

    fn is_scch(&self) -> bool {
        self.config.os.is_scch()
    }

    /// ROM windows below 1000. `None` falls through to generic RAM.
    fn os_byte(&self, addr: u16) -> Option<u8> {
        if !self.os_rom_enabled {
            return None;
        }
        if let Some(v) = self.os_rom.as_ref().and_then(|rom| rom.get(usize::from(addr))) {
            return Some(v);
        }
        if self.is_scch() || addr < MINIBASIC_BASE {
            return None;
        }
        let rom = self.minibasic.as_ref()?;
        Some(rom.get(usize::from(addr - MINIBASIC_BASE)).unwrap_or(IDLE))
    }

    /// Copy a pending key change into PIO A. Until the first read after
    /// reset the port shows 0.
    fn sync_keyboard(&mut self) {
        let change = self.shared.keyboard.lock().take_change();
        if let Some(v) = change {
            self.pio.put_in_value(PioPort::A, v, 0xFF);
        }
    }

    fn write_pio_b<H: Host + ?Sized>(&mut self, host: &mut H, value: u8) {
        self.pio.write_data(PioPort::B, value);
        let out = self.pio.fetch_out_value(PioPort::B, false);
        let audio_bit = if host.loudspeaker_emulation() {
            PIO_B_LOUDSPEAKER
        } else {
            PIO_B_TAPE_OUT
        };
        self.audio.set(host, out & audio_bit != 0);
        if self.config.os.font_switchable() {
            let state = out & PIO_B_FONT != 0;
            if state != self.font_switch {
                self.font_switch = state;
                let has_bank = self.shared.font.as_ref().is_some_and(|f| f.len() > FONT_BANK);
                let offset = if state && has_bank { FONT_BANK } else { 0 };
                let mut video = self.shared.video.lock();
                if offset != video.font_offset {
                    debug!("AC1: font bank {}", offset / FONT_BANK);
                    video.font_offset = offset;
                    self.shared.flags.mark_dirty();
                }
            }
        }
    }

    fn set_lower_dram(&mut self, on: bool) {
        if on != self.lower_dram {
            debug!("AC1: lower DRAM {}", if on { "on" } else { "off" });
            self.lower_dram = on;
        }
    }
}

impl MemoryMap for Ac1 {
    fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8 {
        if self.is_scch() && self.gsbasic_enabled && (GSBASIC_BASE..GSBASIC_END).contains(&addr) {
            return self
                .gsbasic
                .as_ref()
                .and_then(|rom| rom.get(usize::from(addr - GSBASIC_BASE)))
                .unwrap_or(IDLE);
        }
        if !self.lower_dram && addr < LOWER_END {
            if addr < OS_END {
                if let Some(v) = self.os_byte(addr) {
                    return v;
                }
            } else if addr < STATIC_BASE {
                let video = self.shared.video.lock();
                return video.ram.get(usize::from(addr - VIDEO_BASE)).copied().unwrap_or(IDLE);
            } else {
                return self
                    .static_ram
                    .get(usize::from(addr - STATIC_BASE))
                    .copied()
                    .unwrap_or(IDLE);
            }
        }
        if self.config.os.is_64x16() {
            IDLE
        } else {
            host.read_ram(addr)
        }
    }

    fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool {
        if self.is_scch() && addr < OS_END {
            host.write_ram(addr, value);
            return true;
        }
        if !self.lower_dram && addr < LOWER_END {
            if addr < OS_END {
                if self.os_rom_enabled {
                    return true;
                }
                host.write_ram(addr, value);
                return true;
            }
            if addr < STATIC_BASE {
                let mut video = self.shared.video.lock();
                let Some(cell) = video.ram.get_mut(usize::from(addr - VIDEO_BASE)) else {
                    return false;
                };
                *cell = value;
                self.shared.flags.mark_dirty();
                return true;
            }
            let Some(cell) = self.static_ram.get_mut(usize::from(addr - STATIC_BASE)) else {
                return false;
            };
            *cell = value;
            return true;
        }
        if self.config.os.is_64x16() {
            return false;
        }
        host.write_ram(addr, value);
        true
    }
}

impl PortMap for Ac1 {
    fn read_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16) -> u8 {
        let p = port as u8;
        if p & 0xF8 == 0xE0 {
            return host.read_mass_storage(0, p & 7).unwrap_or(IDLE);
        }
        match p {
            0x00..=0x03 => self.ctc.read(usize::from(p & 3)),
            0x04 => {
                self.sync_keyboard();
                if !self.keyboard_used {
                    self.pio.put_in_value(PioPort::A, 0, 0xFF);
                    self.keyboard_used = true;
                }
                self.pio.read_data(PioPort::A)
            }
            0x05 => {
                let graphic_key = self.shared.keyboard.lock().graphic_key();
                let mut v = if graphic_key { 0 } else { PIO_B_GRAPHIC_KEY };
                if host.audio_in_phase() {
                    v |= PIO_B_TAPE_IN;
                }
                self.pio
                    .put_in_value(PioPort::B, v, PIO_B_GRAPHIC_KEY | PIO_B_TAPE_IN);
                self.pio.read_data(PioPort::B)
            }
            0x06 => self.pio.read_control(PioPort::A),
            0x07 => self.pio.read_control(PioPort::B),
            _ => IDLE,
        }
    }

    fn write_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16, value: u8) {
        let p = port as u8;
        if p & 0xF8 == 0xE0 {
            host.write_mass_storage(0, p & 7, value);
            return;
        }
        match p {
            0x00..=0x03 => self.ctc.write(usize::from(p & 3), value),
            0x04 => self.pio.write_data(PioPort::A, value),
            0x05 => self.write_pio_b(host, value),
            0x06 => self.pio.write_control(PioPort::A, value),
            0x07 => self.pio.write_control(PioPort::B, value),
            0x14 if self.is_scch() => {
                self.gsbasic_enabled = value & 0x02 != 0;
                self.set_lower_dram(value & 0x04 != 0);
            }
            0x16 if self.is_scch() => self.os_rom_enabled = false,
            0x17 if self.is_scch() => self.os_rom_enabled = true,
            0x1C..=0x1F if !self.config.os.is_64x16() => self.set_lower_dram(value & 0x01 != 0),
            _ => {}
        }
        let mut chain = self.chain();
        propagate_enable(&mut chain);
    }
}

impl MachineUnit for Ac1 {
    type Frontend = Ac1Frontend;

    fn name(&self) -> &'static str {
        "AC1"
    }

    fn frontend(&self) -> Ac1Frontend {
        Ac1Frontend {
            shared: Arc::clone(&self.shared),
        }
    }

    fn default_speed_khz(&self) -> u32 {
        Ac1Config::DEFAULT_SPEED_KHZ
    }

    fn cycles_elapsed<H: Host + ?Sized>(&mut self, _host: &mut H, cycles: u32) {
        self.ctc.system_update(cycles);
        self.sync_keyboard();
        let mut chain = self.chain();
        propagate_enable(&mut chain);
    }

    fn interrupt_requested(&self) -> bool {
        self.ctc.interrupt_requested() || self.pio.interrupt_requested()
    }

    fn accept_interrupt(&mut self) -> Option<u8> {
        accept(&mut self.chain())
    }

    fn interrupt_finished(&mut self) {
        finish(&mut self.chain());
    }

    fn reset<H: Host + ?Sized>(&mut self, _host: &mut H, level: ResetLevel) {
        info!("AC1: {level:?} reset");
        if level.is_power_on() {
            fill_random(&mut self.static_ram);
            fill_random(&mut self.shared.video.lock().ram);
        }
        self.ctc.reset(level.resets_chips());
        self.pio.reset(level.resets_chips());
        self.keyboard_used = false;
        self.lower_dram = false;
        self.os_rom_enabled = true;
        self.gsbasic_enabled = false;
        self.font_switch = false;
        self.shared.video.lock().font_offset = 0;
        self.shared.keyboard.lock().reset();
        self.pio.put_in_value(PioPort::B, 0, PIO_B_GRAPHIC_KEY);
        self.shared.flags.mark_dirty();
    }

    fn attach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.attach(cpu, &[Subscription::Cycles], 2);
    }

    fn detach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.release(cpu);
    }

    fn requires_reset(&self, profile: &Profile) -> bool {
        Ac1Config::from_profile(profile).is_none_or(|c| c != self.config)
    }
}

impl Observable for Ac1 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ctc.") {
            return self.ctc.query(rest);
        }
        if let Some(rest) = path.strip_prefix("pio.") {
            return self.pio.query(rest);
        }
        match path {
            "lower_dram" => Some(self.lower_dram.into()),
            "os_rom_enabled" => Some(self.os_rom_enabled.into()),
            "gsbasic_enabled" => Some(self.gsbasic_enabled.into()),
            "keyboard_used" => Some(self.keyboard_used.into()),
            "font_offset" => Some((self.shared.video.lock().font_offset as u16).into()),
            "inverse" => Some(self.shared.video.lock().inverse_by_key.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "lower_dram",
            "os_rom_enabled",
            "gsbasic_enabled",
            "keyboard_used",
            "font_offset",
            "inverse",
            "ctc.<ctc path>",
            "pio.<pio path>",
        ]
    }
}
