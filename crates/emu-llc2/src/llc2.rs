//! The LLC2 board.
//!
//! # Memory map
//!
//! | Range     | Content                                         |
//! |-----------|-------------------------------------------------|
//! | 0000-BFFF | Monitor ROM until a port E0-E3 access           |
//! | 4000-5FFF | GS-BASIC ROM when port EC bit 1 is set          |
//! | C000-C7FF | Video RAM                                       |
//! | rest      | Generic RAM                                     |
//!
//! # Ports
//!
//! | Port  | Function                                         |
//! |-------|--------------------------------------------------|
//! | E0-E3 | Switch the monitor ROM off                       |
//! | E8-EB | PIO: A data, B data, A control, B control        |
//! | EC    | Bit 1 GS-BASIC                                   |
//! | F8-FB | CTC                                              |

use std::sync::Arc;

use emu_core::{
    AudioLine, CpuLink, DisplayFlags, Host, InterruptSource, MachineUnit, MemoryMap, Observable,
    PortMap, Profile, Registrations, ResetLevel, Rom, Subscription, Value, accept, finish,
    propagate_enable,
};
use log::{debug, info};
use parking_lot::Mutex;
use zilog_z80_ctc::Z80Ctc;
use zilog_z80_pio::{PioPort, Z80Pio};

use crate::frontend::{Llc2Frontend, Shared};
use crate::keyboard::Llc2Keyboard;
use crate::roms::Llc2Roms;
use crate::video::{VIDEO_BASE, VIDEO_SIZE, Video};

const IDLE: u8 = 0xFF;

const ROM_END: u16 = 0xC000;
const GSBASIC_BASE: u16 = 0x4000;
const GSBASIC_END: u16 = 0x6000;

const PIO_B_TAPE_OUT: u8 = 0x01;
const PIO_B_TAPE_IN: u8 = 0x02;
const PIO_B_GRAPHIC_KEY: u8 = 0x04;
const PIO_B_FONT: u8 = 0x08;
const PIO_B_BIT7_INVERSE: u8 = 0x20;
const PIO_B_LOUDSPEAKER: u8 = 0x40;

const FONT_BANK: usize = 0x0800;

/// An LLC2 machine unit.
pub struct Llc2 {
    monitor: Option<Rom>,
    gsbasic: Option<Rom>,
    ctc: Z80Ctc,
    pio: Z80Pio,
    shared: Arc<Shared>,
    /// A user font replaced the built-in one; only then is B3 decoded.
    user_font: bool,
    keyboard_used: bool,
    rom_enabled: bool,
    gsbasic_enabled: bool,
    loudspeaker_enabled: bool,
    tape_out: AudioLine,
    loudspeaker: AudioLine,
    registrations: Registrations,
}

impl Llc2 {
    pub const DEFAULT_SPEED_KHZ: u32 = 3000;

    #[must_use]
    pub fn new(roms: &Llc2Roms, user_font: Option<&Rom>) -> Self {
        if roms.monitor.is_none() {
            info!("LLC2: no monitor image");
        }
        let shared = Arc::new(Shared {
            video: Mutex::new(Video::new()),
            keyboard: Mutex::new(Llc2Keyboard::new()),
            flags: DisplayFlags::new(),
            font: user_font.cloned().or_else(|| roms.font.clone()),
        });
        let mut ctc = Z80Ctc::new();
        ctc.connect(1, 3);
        Self {
            monitor: roms.monitor.clone(),
            gsbasic: roms.gsbasic.clone(),
            ctc,
            pio: Z80Pio::new(),
            shared,
            user_font: user_font.is_some(),
            keyboard_used: false,
            rom_enabled: true,
            gsbasic_enabled: false,
            loudspeaker_enabled: false,
            tape_out: AudioLine::new(),
            loudspeaker: AudioLine::new(),
            registrations: Registrations::new("LLC2"),
        }
    }

    /// Whether a profile selects this machine.
    #[must_use]
    pub fn handles(profile: &Profile) -> bool {
        profile.get_str("jkcemu.system").starts_with("LLC2")
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

    fn rom_off(&mut self) {
        if self.rom_enabled {
            debug!("LLC2: monitor ROM off");
            self.rom_enabled = false;
        }
    }

    fn sync_keyboard(&mut self) {
        let change = self.shared.keyboard.lock().take_change();
        if let Some(v) = change {
            self.pio.put_in_value(PioPort::A, v, 0xFF);
        }
    }

    fn write_pio_b<H: Host + ?Sized>(&mut self, host: &mut H, value: u8) {
        self.pio.write_data(PioPort::B, value);
        let out = self.pio.fetch_out_value(PioPort::B, false);
        let emulated = host.loudspeaker_emulation();
        if !emulated {
            self.tape_out.set(host, out & PIO_B_TAPE_OUT != 0);
        }

        let has_bank =
            self.user_font && self.shared.font.as_ref().is_some_and(|f| f.len() > FONT_BANK);
        let mut video = self.shared.video.lock();
        if has_bank {
            video.font_offset = if out & PIO_B_FONT != 0 { FONT_BANK } else { 0 };
        }
        let bit7 = out & PIO_B_BIT7_INVERSE != 0;
        if bit7 != video.bit7_inverse {
            video.bit7_inverse = bit7;
            self.shared.flags.mark_dirty();
        }
        drop(video);

        let enabled = out & PIO_B_LOUDSPEAKER != 0;
        if enabled != self.loudspeaker_enabled {
            self.loudspeaker_enabled = enabled;
            if emulated {
                self.loudspeaker.toggle(host);
            }
        }
    }
}

impl MemoryMap for Llc2 {
    fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8 {
        if self.gsbasic_enabled && (GSBASIC_BASE..GSBASIC_END).contains(&addr) {
            return self
                .gsbasic
                .as_ref()
                .and_then(|rom| rom.get(usize::from(addr - GSBASIC_BASE)))
                .unwrap_or(IDLE);
        }
        if self.rom_enabled && addr < ROM_END {
            if let Some(rom) = &self.monitor {
                return rom.get(usize::from(addr)).unwrap_or(IDLE);
            }
        }
        let offset = usize::from(addr.wrapping_sub(VIDEO_BASE));
        if addr >= VIDEO_BASE && offset < VIDEO_SIZE {
            return self.shared.video.lock().ram[offset];
        }
        host.read_ram(addr)
    }

    fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool {
        if self.rom_enabled && addr < ROM_END {
            return true;
        }
        let offset = usize::from(addr.wrapping_sub(VIDEO_BASE));
        if addr >= VIDEO_BASE && offset < VIDEO_SIZE {
            self.shared.video.lock().ram[offset] = value;
            self.shared.flags.mark_dirty();
            return true;
        }
        host.write_ram(addr, value);
        true
    }
}

impl PortMap for Llc2 {
    fn read_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16) -> u8 {
        match port as u8 {
            0xE0..=0xE3 => {
                self.rom_off();
                IDLE
            }
            0xE8 => {
                self.sync_keyboard();
                if !self.keyboard_used {
                    self.pio.put_in_value(PioPort::A, 0, 0xFF);
                    self.keyboard_used = true;
                }
                self.pio.read_data(PioPort::A)
            }
            0xE9 => {
                let graphic_key = self.shared.keyboard.lock().graphic_key();
                let mut v = if graphic_key { 0 } else { PIO_B_GRAPHIC_KEY };
                if host.audio_in_phase() {
                    v |= PIO_B_TAPE_IN;
                }
                self.pio
                    .put_in_value(PioPort::B, v, PIO_B_GRAPHIC_KEY | PIO_B_TAPE_IN);
                self.pio.read_data(PioPort::B)
            }
            0xEA => self.pio.read_control(PioPort::A),
            0xEB => self.pio.read_control(PioPort::B),
            p @ 0xF8..=0xFB => self.ctc.read(usize::from(p & 3)),
            _ => IDLE,
        }
    }

    fn write_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16, value: u8) {
        match port as u8 {
            0xE0..=0xE3 => self.rom_off(),
            0xE8 => self.pio.write_data(PioPort::A, value),
            0xE9 => self.write_pio_b(host, value),
            0xEA => self.pio.write_control(PioPort::A, value),
            0xEB => self.pio.write_control(PioPort::B, value),
            0xEC => self.gsbasic_enabled = value & 0x02 != 0,
            p @ 0xF8..=0xFB => self.ctc.write(usize::from(p & 3), value),
            _ => {}
        }
        let mut chain = self.chain();
        propagate_enable(&mut chain);
    }
}

impl MachineUnit for Llc2 {
    type Frontend = Llc2Frontend;

    fn name(&self) -> &'static str {
        "LLC2"
    }

    fn frontend(&self) -> Llc2Frontend {
        Llc2Frontend {
            shared: Arc::clone(&self.shared),
        }
    }

    fn default_speed_khz(&self) -> u32 {
        Self::DEFAULT_SPEED_KHZ
    }

    fn cycles_elapsed<H: Host + ?Sized>(&mut self, host: &mut H, cycles: u32) {
        let zeros = self.ctc.system_update(cycles);
        if self.loudspeaker_enabled && host.loudspeaker_emulation() {
            for _ in 0..zeros.channel(0) {
                self.loudspeaker.toggle(host);
            }
        }
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
        info!("LLC2: {level:?} reset");
        {
            let mut video = self.shared.video.lock();
            if level.is_power_on() {
                video.power_on();
            }
            video.bit7_inverse = false;
            video.screen_inverse = false;
            video.font_offset = 0;
        }
        self.ctc.reset(level.resets_chips());
        self.pio.reset(level.resets_chips());
        self.keyboard_used = false;
        self.rom_enabled = true;
        self.gsbasic_enabled = false;
        self.loudspeaker_enabled = false;
        self.shared.keyboard.lock().reset();
        self.pio.put_in_value(PioPort::B, PIO_B_GRAPHIC_KEY, PIO_B_GRAPHIC_KEY);
        self.shared.flags.mark_dirty();
    }

    fn attach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.attach(cpu, &[Subscription::Cycles], 2);
    }

    fn detach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.release(cpu);
    }

    fn requires_reset(&self, profile: &Profile) -> bool {
        !Self::handles(profile)
    }
}

impl Observable for Llc2 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ctc.") {
            return self.ctc.query(rest);
        }
        if let Some(rest) = path.strip_prefix("pio.") {
            return self.pio.query(rest);
        }
        match path {
            "rom_enabled" => Some(self.rom_enabled.into()),
            "gsbasic_enabled" => Some(self.gsbasic_enabled.into()),
            "keyboard_used" => Some(self.keyboard_used.into()),
            "loudspeaker_enabled" => Some(self.loudspeaker_enabled.into()),
            "bit7_inverse" => Some(self.shared.video.lock().bit7_inverse.into()),
            "font_offset" => Some((self.shared.video.lock().font_offset as u16).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "rom_enabled",
            "gsbasic_enabled",
            "keyboard_used",
            "loudspeaker_enabled",
            "bit7_inverse",
            "font_offset",
            "ctc.<ctc path>",
            "pio.<pio path>",
        ]
    }
}
