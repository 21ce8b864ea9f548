//! The Z9001 board.
//!
//! # Memory map
//!
//! | Range     | Content                                              |
//! |-----------|------------------------------------------------------|
//! | 0000-     | Generic RAM up to 3FFF, 7FFF, BFFF or E7FF           |
//! | 4000-7FFF | Extended RAM bank when switched in (74 KB)           |
//! | C000-E7FF | KC87 BASIC ROM unless RAM C000 is switched in        |
//! | E800-EBFF | Color RAM (color option)                             |
//! | EC00-EFFF | Video RAM                                            |
//! | F000-FFFF | OS ROM                                               |
//!
//! Writes at C000 and above land in RAM even under the BASIC ROM.
//!
//! # Ports
//!
//! A2 is not decoded for the chips.
//!
//! | Port  | Function                                          |
//! |-------|---------------------------------------------------|
//! | 04/05 | Extended RAM off/on                               |
//! | 06/07 | RAM C000 off/on                                   |
//! | 80-87 | CTC                                               |
//! | 88-8F | PIO88: screen config, tape, loudspeaker gate      |
//! | 90-97 | PIO90: keyboard columns (A) and rows (B)          |
//! | B8    | Graphics mode and colors                          |
//! | B9    | Graphics address low byte                         |
//! | BA    | Graphics data, high address byte from A15-A8      |

use std::sync::Arc;

use emu_core::{
    AudioLine, CpuLink, DisplayFlags, Host, InterruptSource, KeyboardMatrix, MachineUnit,
    MasterClock, MemoryMap, Observable, PortMap, Profile, Registrations, ResetLevel, Rom,
    Subscription, Ticks, Value, accept, finish, propagate_enable,
};
use log::{debug, info};
use parking_lot::Mutex;
use zilog_z80_ctc::Z80Ctc;
use zilog_z80_pio::{PioMode, PioPort, Z80Pio};

use crate::config::{Z9001Config, Z9001Model};
use crate::frontend::{Shared, Z9001Frontend};
use crate::keyboard::Z9001Keyboard;
use crate::roms::Z9001Roms;
use crate::video::{COLOR_BASE, VIDEO_BASE, Video};

const IDLE: u8 = 0xFF;

const EXT_BASE: u16 = 0x4000;
const EXT_SIZE: usize = 0x4000;
const BASIC_BASE: u16 = 0xC000;
const OS_BASE: u16 = 0xF000;

const PIO88_A_ROWS20: u8 = 0x04;
const PIO88_A_LOUDSPEAKER: u8 = 0x80;

const BLINK_MS: u64 = 200;
/// Tape input sampling interval; the shortest period a CTC prescaler
/// can measure.
const TAPE_SAMPLE_CYCLES: u32 = 16;

/// A Z9001, KC85/1 or KC87 machine unit.
pub struct Z9001 {
    config: Z9001Config,
    os_rom: Option<Rom>,
    basic: Option<Rom>,
    ram_ext: Option<Box<[u8; EXT_SIZE]>>,
    ext_enabled: bool,
    ram_c000_enabled: bool,
    ctc: Z80Ctc,
    pio88: Z80Pio,
    pio90: Z80Pio,
    shared: Arc<Shared>,
    tape_cycles: u32,
    tape_in_phase: bool,
    blink_left: Ticks,
    /// Output of the CTC channel 0 flip-flop before the loudspeaker gate.
    audio_phase: bool,
    audio: AudioLine,
    registrations: Registrations,
}

impl Z9001 {
    #[must_use]
    pub fn new(config: Z9001Config, roms: &Z9001Roms, user_font: Option<&Rom>) -> Self {
        let os_rom = roms.os(config.model).cloned();
        if os_rom.is_none() {
            info!("Z9001: no OS image for {:?}", config.model);
        }
        let shared = Arc::new(Shared {
            video: Mutex::new(Video::new(config.color)),
            keyboard: Mutex::new(Z9001Keyboard::default()),
            flags: DisplayFlags::new(),
            font: user_font.or(roms.font.as_ref()).cloned(),
        });
        let mut ctc = Z80Ctc::new();
        ctc.connect(2, 3);
        Self {
            basic: roms.basic(config.model).cloned(),
            ram_ext: config
                .has_extended_ram()
                .then(|| Box::new([0; EXT_SIZE])),
            config,
            os_rom,
            ext_enabled: false,
            ram_c000_enabled: false,
            ctc,
            pio88: Z80Pio::new(),
            pio90: Z80Pio::new(),
            shared,
            tape_cycles: 0,
            tape_in_phase: false,
            blink_left: Ticks::ZERO,
            audio_phase: false,
            audio: AudioLine::new(),
            registrations: Registrations::new("Z9001"),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Z9001Config {
        &self.config
    }

    fn chain(&mut self) -> [&mut dyn InterruptSource; 3] {
        [&mut self.pio90, &mut self.pio88, &mut self.ctc]
    }

    fn switch_ram(&mut self, port: u8) {
        let has_ext = self.ram_ext.is_some();
        match port {
            0x04 => self.ext_enabled = false,
            0x05 => self.ext_enabled = has_ext,
            0x06 => self.ram_c000_enabled = false,
            _ => self.ram_c000_enabled = has_ext,
        }
        debug!(
            "Z9001: extended RAM {}, RAM C000 {}",
            self.ext_enabled, self.ram_c000_enabled
        );
    }

    fn blink_period<H: Host + ?Sized>(host: &H) -> Ticks {
        MasterClock::from_khz(host.cpu_speed_khz()).ticks_for_millis(BLINK_MS)
    }

    /// Push the current matrix onto PIO90 if a key changed.
    fn sync_keyboard(&mut self) {
        let values = {
            let mut kb = self.shared.keyboard.lock();
            kb.take_changed().then(|| {
                (
                    kb.row_value(self.pio90.out_value(PioPort::A)),
                    kb.col_value(self.pio90.out_value(PioPort::B)),
                )
            })
        };
        if let Some((rows, cols)) = values {
            self.pio90.put_in_value(PioPort::B, rows, 0xFF);
            self.pio90.put_in_value(PioPort::A, cols, 0xFF);
        }
    }

    fn write_pio88_a<H: Host + ?Sized>(&mut self, host: &mut H, value: u8) {
        self.pio88.write_data(PioPort::A, value);
        let out = self.pio88.fetch_out_value(PioPort::A, false);
        {
            let mut video = self.shared.video.lock();
            let rows20 = out & PIO88_A_ROWS20 != 0;
            let border = (out >> 3) & 0x07;
            if video.rows20 != rows20 || video.border != border {
                video.rows20 = rows20;
                video.border = border;
                self.shared.flags.mark_dirty();
            }
        }
        if host.loudspeaker_emulation() && out & PIO88_A_LOUDSPEAKER != 0 {
            self.audio.set(host, self.audio_phase);
        }
    }

    fn sample_tape<H: Host + ?Sized>(&mut self, host: &mut H, cycles: u32) {
        self.tape_cycles = self.tape_cycles.saturating_add(cycles);
        if self.tape_cycles < TAPE_SAMPLE_CYCLES {
            return;
        }
        self.tape_cycles = 0;
        let phase = host.audio_in_phase();
        if phase == self.tape_in_phase {
            return;
        }
        self.tape_in_phase = phase;
        // Every edge pulses /ASTB.
        match self.pio88.mode(PioPort::A) {
            PioMode::ByteIn => {
                self.pio88.strobe_in_value(PioPort::A, 0xFF);
            }
            PioMode::ByteOut | PioMode::ByteInOut => {
                self.pio88.fetch_out_value(PioPort::A, true);
            }
            PioMode::BitInOut => {}
        }
    }

    fn advance_blink<H: Host + ?Sized>(&mut self, host: &H, cycles: u32) {
        self.blink_left -= Ticks::from(cycles);
        if !self.blink_left.is_zero() {
            return;
        }
        self.blink_left = Self::blink_period(host);
        self.shared.video.lock().blink ^= true;
        if self.config.color {
            self.shared.flags.mark_dirty();
        }
    }

    fn graphics_address(port: u16, low: u8) -> usize {
        usize::from((port & 0xFF00) | u16::from(low))
    }
}

fn pio_read(pio: &mut Z80Pio, reg: u8) -> u8 {
    match reg & 3 {
        0 => pio.read_data(PioPort::A),
        1 => pio.read_data(PioPort::B),
        2 => pio.read_control(PioPort::A),
        _ => pio.read_control(PioPort::B),
    }
}

fn pio_write(pio: &mut Z80Pio, reg: u8, value: u8) {
    match reg & 3 {
        0 => pio.write_data(PioPort::A, value),
        1 => pio.write_data(PioPort::B, value),
        2 => pio.write_control(PioPort::A, value),
        _ => pio.write_control(PioPort::B, value),
    }
}

impl MemoryMap for Z9001 {
    fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8 {
        if self.ext_enabled && (EXT_BASE..EXT_BASE * 2).contains(&addr) {
            if let Some(ext) = &self.ram_ext {
                return ext[usize::from(addr - EXT_BASE)];
            }
        }
        if (COLOR_BASE..VIDEO_BASE).contains(&addr) {
            if let Some(color) = &self.shared.video.lock().color {
                return color[usize::from(addr - COLOR_BASE)];
            }
        }
        if (VIDEO_BASE..OS_BASE).contains(&addr) {
            return self.shared.video.lock().ram[usize::from(addr - VIDEO_BASE)];
        }
        if addr >= BASIC_BASE && !self.ram_c000_enabled {
            if let Some(v) = self
                .basic
                .as_ref()
                .and_then(|rom| rom.get(usize::from(addr - BASIC_BASE)))
            {
                return v;
            }
        }
        if addr >= OS_BASE {
            if let Some(v) = self
                .os_rom
                .as_ref()
                .and_then(|rom| rom.get(usize::from(addr - OS_BASE)))
            {
                return v;
            }
        }
        if addr <= self.config.ram_end() && (addr < BASIC_BASE || self.ram_c000_enabled) {
            return host.read_ram(addr);
        }
        IDLE
    }

    fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool {
        if self.ext_enabled && (EXT_BASE..EXT_BASE * 2).contains(&addr) {
            if let Some(ext) = &mut self.ram_ext {
                ext[usize::from(addr - EXT_BASE)] = value;
                return true;
            }
        }
        if (COLOR_BASE..VIDEO_BASE).contains(&addr) {
            if let Some(color) = &mut self.shared.video.lock().color {
                color[usize::from(addr - COLOR_BASE)] = value;
                self.shared.flags.mark_dirty();
                return true;
            }
        }
        if (VIDEO_BASE..OS_BASE).contains(&addr) {
            self.shared.video.lock().ram[usize::from(addr - VIDEO_BASE)] = value;
            self.shared.flags.mark_dirty();
            return true;
        }
        if addr <= self.config.ram_end() {
            host.write_ram(addr, value);
            return true;
        }
        false
    }
}

impl PortMap for Z9001 {
    fn read_port<H: Host + ?Sized>(&mut self, _host: &mut H, port: u16) -> u8 {
        let v = match port as u8 {
            p @ 0x04..=0x07 => {
                self.switch_ram(p);
                IDLE
            }
            p @ 0x80..=0x87 => self.ctc.read(usize::from(p & 3)),
            p @ 0x88..=0x8F => pio_read(&mut self.pio88, p),
            p @ 0x90..=0x97 => {
                self.sync_keyboard();
                pio_read(&mut self.pio90, p)
            }
            0xB8 => self
                .shared
                .video
                .lock()
                .graphics
                .as_ref()
                .map_or(IDLE, |g| g.read_mode()),
            0xBA => {
                let video = self.shared.video.lock();
                video.graphics.as_ref().map_or(IDLE, |g| {
                    let addr = Self::graphics_address(port, g.addr_low);
                    g.ram.get(addr).copied().unwrap_or(IDLE)
                })
            }
            _ => IDLE,
        };
        let mut chain = self.chain();
        propagate_enable(&mut chain);
        v
    }

    fn write_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16, value: u8) {
        match port as u8 {
            p @ 0x04..=0x07 => self.switch_ram(p),
            p @ 0x80..=0x87 => self.ctc.write(usize::from(p & 3), value),
            0x88 | 0x8C => self.write_pio88_a(host, value),
            p @ 0x88..=0x8F => pio_write(&mut self.pio88, p, value),
            0x90 | 0x94 => {
                self.pio90.write_data(PioPort::A, value);
                let rows = self
                    .shared
                    .keyboard
                    .lock()
                    .row_value(self.pio90.out_value(PioPort::A));
                self.pio90.put_in_value(PioPort::B, rows, 0xFF);
            }
            0x91 | 0x95 => {
                self.pio90.write_data(PioPort::B, value);
                let cols = self
                    .shared
                    .keyboard
                    .lock()
                    .col_value(self.pio90.out_value(PioPort::B));
                self.pio90.put_in_value(PioPort::A, cols, 0xFF);
            }
            p @ 0x90..=0x97 => pio_write(&mut self.pio90, p, value),
            0xB8 => {
                if let Some(g) = &mut self.shared.video.lock().graphics {
                    g.write_mode(value);
                    self.shared.flags.mark_dirty();
                }
            }
            0xB9 => {
                if let Some(g) = &mut self.shared.video.lock().graphics {
                    g.addr_low = value;
                }
            }
            0xBA => {
                if let Some(g) = &mut self.shared.video.lock().graphics {
                    let addr = Self::graphics_address(port, g.addr_low);
                    if let Some(cell) = g.ram.get_mut(addr) {
                        *cell = value;
                        self.shared.flags.mark_dirty();
                    }
                }
            }
            _ => {}
        }
        let mut chain = self.chain();
        propagate_enable(&mut chain);
    }
}

impl MachineUnit for Z9001 {
    type Frontend = Z9001Frontend;

    fn name(&self) -> &'static str {
        match self.config.model {
            Z9001Model::Kc851 => "KC85/1",
            Z9001Model::Kc87 => "KC87",
        }
    }

    fn frontend(&self) -> Z9001Frontend {
        Z9001Frontend {
            shared: Arc::clone(&self.shared),
        }
    }

    fn default_speed_khz(&self) -> u32 {
        Z9001Config::DEFAULT_SPEED_KHZ
    }

    fn cycles_elapsed<H: Host + ?Sized>(&mut self, host: &mut H, cycles: u32) {
        let zeros = self.ctc.system_update(cycles);
        for _ in 0..zeros.channel(0) {
            self.audio_phase = !self.audio_phase;
            if !host.loudspeaker_emulation()
                || self.pio88.out_value(PioPort::A) & PIO88_A_LOUDSPEAKER != 0
            {
                self.audio.set(host, self.audio_phase);
            }
        }
        self.sample_tape(host, cycles);
        self.advance_blink(host, cycles);
        self.sync_keyboard();
        let mut chain = self.chain();
        propagate_enable(&mut chain);
    }

    fn interrupt_requested(&self) -> bool {
        self.pio90.interrupt_requested()
            || self.pio88.interrupt_requested()
            || self.ctc.interrupt_requested()
    }

    fn accept_interrupt(&mut self) -> Option<u8> {
        accept(&mut self.chain())
    }

    fn interrupt_finished(&mut self) {
        finish(&mut self.chain());
    }

    fn reset<H: Host + ?Sized>(&mut self, host: &mut H, level: ResetLevel) {
        info!("Z9001: {level:?} reset");
        {
            let mut video = self.shared.video.lock();
            if level.is_power_on() {
                video.power_on();
            }
            if let Some(g) = &mut video.graphics {
                g.reset();
            }
            video.rows20 = false;
            video.border = 0;
        }
        self.ctc.reset(level.resets_chips());
        self.pio88.reset(level.resets_chips());
        self.pio90.reset(level.resets_chips());
        self.ext_enabled = false;
        self.ram_c000_enabled = false;
        self.tape_cycles = 0;
        self.tape_in_phase = host.audio_in_phase();
        self.blink_left = Self::blink_period(host);
        self.shared.keyboard.lock().key_released();
        self.sync_keyboard();
        self.shared.flags.mark_dirty();
    }

    fn attach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.attach(cpu, &[Subscription::Cycles], 3);
    }

    fn detach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.release(cpu);
    }

    fn requires_reset(&self, profile: &Profile) -> bool {
        Z9001Config::from_profile(profile).is_none_or(|c| c != self.config)
    }
}

impl Observable for Z9001 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ctc.") {
            return self.ctc.query(rest);
        }
        if let Some(rest) = path.strip_prefix("pio88.") {
            return self.pio88.query(rest);
        }
        if let Some(rest) = path.strip_prefix("pio90.") {
            return self.pio90.query(rest);
        }
        match path {
            "ext_enabled" => Some(self.ext_enabled.into()),
            "ram_c000_enabled" => Some(self.ram_c000_enabled.into()),
            "rows" => Some(u8::from(if self.shared.video.lock().rows20 { 20 } else { 24 }).into()),
            "border" => Some(self.shared.video.lock().border.into()),
            "blink" => Some(self.shared.video.lock().blink.into()),
            "graphics_mode" => Some(
                self.shared
                    .video
                    .lock()
                    .graphics
                    .as_ref()
                    .is_some_and(|g| g.active)
                    .into(),
            ),
            "audio" => Some(self.audio.phase().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ext_enabled",
            "ram_c000_enabled",
            "rows",
            "border",
            "blink",
            "graphics_mode",
            "audio",
            "ctc.<ctc path>",
            "pio88.<pio path>",
            "pio90.<pio path>",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::{KeyboardInput, SimpleHost, VideoSource};

    fn machine(config: Z9001Config) -> (Z9001, SimpleHost) {
        let mut host = SimpleHost::new(Z9001Config::DEFAULT_SPEED_KHZ);
        let roms = Z9001Roms {
            os12: Some(Rom::from_bytes(&[0x12; 0x1000])),
            os13: Some(Rom::from_bytes(&[0x13; 0x1000])),
            basic86: Some(Rom::from_bytes(&[0x86; 0x2800])),
            font: None,
        };
        let mut m = Z9001::new(config, &roms, None);
        m.reset(&mut host, ResetLevel::PowerOn);
        (m, host)
    }

    fn kc87(ram_kbyte: u16) -> Z9001Config {
        Z9001Config {
            ram_kbyte,
            ..Z9001Config::default()
        }
    }

    #[test]
    fn roms_follow_model() {
        let (mut m, mut host) = machine(kc87(16));
        assert_eq!(m.read_memory(&mut host, 0xC000), 0x86);
        assert_eq!(m.read_memory(&mut host, 0xF000), 0x13);

        let (mut m, mut host) = machine(Z9001Config {
            model: Z9001Model::Kc851,
            ..Z9001Config::default()
        });
        assert_eq!(m.read_memory(&mut host, 0xC000), IDLE);
        assert_eq!(m.read_memory(&mut host, 0xF000), 0x12);
    }

    #[test]
    fn ram_size_limits_generic_ram() {
        let (mut m, mut host) = machine(kc87(32));
        assert!(m.write_memory(&mut host, 0x7FFF, 0x42));
        assert_eq!(m.read_memory(&mut host, 0x7FFF), 0x42);
        assert!(!m.write_memory(&mut host, 0x8000, 0x42));
        assert_eq!(m.read_memory(&mut host, 0x8000), IDLE);
    }

    #[test]
    fn writes_under_basic_land_in_ram() {
        let (mut m, mut host) = machine(kc87(74));
        assert!(m.write_memory(&mut host, 0xC000, 0x55));
        assert_eq!(m.read_memory(&mut host, 0xC000), 0x86);
        // Port 7 switches RAM in at C000.
        m.write_port(&mut host, 0x07, 0);
        assert_eq!(m.read_memory(&mut host, 0xC000), 0x55);
        m.write_port(&mut host, 0x06, 0);
        assert_eq!(m.read_memory(&mut host, 0xC000), 0x86);
    }

    #[test]
    fn extended_bank_overlays_4000() {
        let (mut m, mut host) = machine(kc87(74));
        m.write_memory(&mut host, 0x4000, 0x11);
        m.read_port(&mut host, 0x05);
        assert_eq!(m.query("ext_enabled"), Some(Value::Bool(true)));
        m.write_memory(&mut host, 0x4000, 0x22);
        assert_eq!(m.read_memory(&mut host, 0x4000), 0x22);
        m.write_port(&mut host, 0x04, 0);
        assert_eq!(m.read_memory(&mut host, 0x4000), 0x11);

        // Without the 74 KB option the switches do nothing.
        let (mut m, mut host) = machine(kc87(48));
        m.write_port(&mut host, 0x05, 0);
        m.write_port(&mut host, 0x07, 0);
        assert_eq!(m.query("ext_enabled"), Some(Value::Bool(false)));
        assert_eq!(m.query("ram_c000_enabled"), Some(Value::Bool(false)));
    }

    #[test]
    fn color_ram_needs_color_option() {
        let (mut m, mut host) = machine(kc87(16));
        assert!(m.write_memory(&mut host, 0xE800, 0x70));
        assert_eq!(m.read_memory(&mut host, 0xE800), 0x70);

        let (mut m, mut host) = machine(Z9001Config {
            color: false,
            ..Z9001Config::default()
        });
        assert!(!m.write_memory(&mut host, 0xE800, 0x70));
        assert_eq!(m.read_memory(&mut host, 0xE800), IDLE);
        assert!(m.write_memory(&mut host, 0xEC00, b'A'));
        assert_eq!(m.read_memory(&mut host, 0xEC00), b'A');
    }

    #[test]
    fn pio88_a_sets_rows_and_border() {
        let (mut m, mut host) = machine(kc87(16));
        m.write_port(&mut host, 0x8A, 0x0F);
        m.write_port(&mut host, 0x88, PIO88_A_ROWS20 | (5 << 3));
        assert_eq!(m.query("rows"), Some(Value::U8(20)));
        assert_eq!(m.query("border"), Some(Value::U8(5)));
        assert_eq!(m.frontend().border_color_index(), 6);
    }

    #[test]
    fn keyboard_scan_through_pio90() {
        let (mut m, mut host) = machine(kc87(16));
        m.frontend().key_typed('E');
        // Select column 5 on A; rows read back on B.
        m.write_port(&mut host, 0x92, 0x0F);
        m.write_port(&mut host, 0x90, !0x20);
        assert_eq!(m.read_port(&mut host, 0x91), !0x04);
        m.write_port(&mut host, 0x90, !0x01);
        assert_eq!(m.read_port(&mut host, 0x95), 0xFF);
    }

    #[test]
    fn ctc_channel_0_audio_gated_by_pio88_a7() {
        let (mut m, mut host) = machine(kc87(16));
        host.loudspeaker = true;
        // Channel 0: timer, prescaler 16, constant 1.
        m.write_port(&mut host, 0x80, 0x05);
        m.write_port(&mut host, 0x80, 0x01);
        m.cycles_elapsed(&mut host, 16);
        assert!(host.audio_edges.is_empty());

        m.write_port(&mut host, 0x8A, 0x0F);
        m.write_port(&mut host, 0x88, PIO88_A_LOUDSPEAKER);
        assert_eq!(host.audio_edges, vec![true]);
        m.cycles_elapsed(&mut host, 16);
        assert_eq!(host.audio_edges, vec![true, false]);
    }

    #[test]
    fn ctc_channel_2_clocks_channel_3() {
        let (mut m, mut host) = machine(kc87(16));
        m.write_port(&mut host, 0x83, 0x45);
        m.write_port(&mut host, 0x83, 0x02);
        m.write_port(&mut host, 0x82, 0x05);
        m.write_port(&mut host, 0x82, 0x01);
        m.cycles_elapsed(&mut host, 16);
        assert_eq!(m.read_port(&mut host, 0x83), 1);
    }

    #[test]
    fn blink_toggles_after_200ms() {
        let (mut m, mut host) = machine(kc87(16));
        assert_eq!(m.query("blink"), Some(Value::Bool(false)));
        let period = Z9001Config::DEFAULT_SPEED_KHZ * 200;
        m.cycles_elapsed(&mut host, period - 1);
        assert_eq!(m.query("blink"), Some(Value::Bool(false)));
        m.cycles_elapsed(&mut host, 1);
        assert_eq!(m.query("blink"), Some(Value::Bool(true)));
    }

    #[test]
    fn graphics_ports() {
        let (mut m, mut host) = machine(kc87(16));
        m.write_port(&mut host, 0xB8, 0x08 | 0x70);
        assert_eq!(m.read_port(&mut host, 0xB8), 0x78);
        m.write_port(&mut host, 0xB9, 0x20);
        m.write_port(&mut host, 0x00BA, 0x80);
        assert_eq!(m.read_port(&mut host, 0x00BA), 0x80);
        assert!(m.frontend().extract_text().is_none());
        assert_eq!(m.frontend().color_index_at(32, 1), emu_core::WHITE);
        // The high byte of the port address is the high address byte.
        m.write_port(&mut host, 0x01BA, 0x55);
        assert_eq!(m.read_port(&mut host, 0x01BA), 0x55);
        assert_eq!(m.read_port(&mut host, 0x00BA), 0x80);
    }

    #[test]
    fn tape_edge_strobes_pio88_a() {
        let (mut m, mut host) = machine(kc87(16));
        // Byte input, interrupt enabled.
        m.write_port(&mut host, 0x8A, 0x10);
        m.write_port(&mut host, 0x8A, 0x4F);
        m.write_port(&mut host, 0x8A, 0x83);
        host.audio_in = true;
        m.cycles_elapsed(&mut host, TAPE_SAMPLE_CYCLES);
        assert!(m.interrupt_requested());
        assert_eq!(m.accept_interrupt(), Some(0x10));
    }
}
