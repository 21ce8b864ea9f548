//! The BCS3 board.
//!
//! # Memory map
//!
//! Below 4000 address line A13 is not decoded, so 2000-3FFF mirrors
//! 0000-1FFF.
//!
//! | Range     | Content                                             |
//! |-----------|-----------------------------------------------------|
//! | 0000-0FFF | BASIC ROM                                           |
//! | 1000-13FF | Keyboard columns (A0-A9, low active), tape in on D7 |
//! | 1800-1BFF | Static RAM as the video generator sees it           |
//! | 1C00-1FFF | Static RAM                                          |
//! | 4000-7FFF | Generic RAM with the 17 KB option                   |
//! | F000-FFFF | Machine-code editor (SE 3.1, 29 columns)            |
//!
//! Unmapped reads give 0F.
//!
//! # Ports
//!
//! Only the CTC is decoded, on every port with A2 low.
//!
//! # CTC
//!
//! ZC/TO0 toggles the audio line and clocks channel 1. ZC/TO1 resets
//! the audio line and clocks channel 2. ZC/TO2 is the frame sync.

use std::sync::Arc;

use emu_core::{
    AudioLine, CpuLink, DisplayFlags, Host, InterruptSource, KeyboardMatrix, MachineUnit,
    MemoryMap, Observable, PortMap, Profile, Registrations, ResetLevel, Rom, Subscription, Ticks,
    Value, accept, finish,
};
use log::{debug, info};
use parking_lot::Mutex;
use zilog_z80_ctc::Z80Ctc;

use crate::config::Bcs3Config;
use crate::frontend::{Bcs3Frontend, Shared};
use crate::keyboard::Bcs3Keyboard;
use crate::roms::Bcs3Roms;
use crate::video::{SYNC_TIMEOUT, Video};

const IDLE: u8 = 0x0F;

const A13: u16 = 0x2000;
const LOW_END: u16 = 0x4000;
const F000: u16 = 0xF000;
const ROW_CELL: usize = 0x06;

const TAPE_IN: u8 = 0x80;

/// A BCS3 machine unit.
pub struct Bcs3 {
    config: Bcs3Config,
    os_rom: Option<Rom>,
    f000_rom: Option<Rom>,
    ctc: Z80Ctc,
    shared: Arc<Shared>,
    /// Cycles until the screen goes dark without another sync pulse.
    sync_left: Ticks,
    audio: AudioLine,
    registrations: Registrations,
}

impl Bcs3 {
    #[must_use]
    pub fn new(config: Bcs3Config, roms: &Bcs3Roms, user_font: Option<&Rom>) -> Self {
        let os = config.os;
        let os_rom = roms.os(os).cloned();
        if os_rom.is_none() {
            info!("BCS3: no image for {os:?}");
        }
        let flags = DisplayFlags::new();
        flags.set_enabled(false);
        let shared = Arc::new(Shared {
            video: Mutex::new(Video::new(os)),
            keyboard: Mutex::new(Bcs3Keyboard::default()),
            flags,
            font: user_font.or_else(|| roms.font(os)).cloned(),
        });
        let mut ctc = Z80Ctc::new();
        ctc.connect(0, 1);
        ctc.connect(1, 2);
        Self {
            config,
            os_rom,
            f000_rom: roms.f000(os).cloned(),
            ctc,
            shared,
            sync_left: Ticks::ZERO,
            audio: AudioLine::new(),
            registrations: Registrations::new("BCS3"),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Bcs3Config {
        &self.config
    }

    #[must_use]
    pub fn ctc(&self) -> &Z80Ctc {
        &self.ctc
    }

    fn set_screen_enabled(&self, enabled: bool) {
        let mut video = self.shared.video.lock();
        if video.enabled != enabled {
            debug!("BCS3: screen {}", if enabled { "on" } else { "off" });
            video.enabled = enabled;
        }
        self.shared.flags.set_enabled(enabled);
    }

    fn write_sram(&mut self, idx: usize, value: u8) {
        let mut video = self.shared.video.lock();
        video.ram[idx] = value;
        let mut dirty = false;
        if idx == ROW_CELL && self.config.os.has_row_cell() {
            let rows = usize::from(value);
            if rows != video.rows {
                video.rows = rows;
                dirty = true;
            }
        }
        let layout = video.layout;
        let screen = layout.offset..layout.offset + video.rows * layout.columns;
        if dirty || screen.contains(&idx) {
            self.shared.flags.mark_dirty();
        }
    }
}

impl MemoryMap for Bcs3 {
    fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8 {
        if addr < LOW_END {
            let a = addr & !A13;
            return match a {
                0x1000..=0x13FF => {
                    let v = self.shared.keyboard.lock().read(a) & !TAPE_IN;
                    if host.audio_in_phase() { v | TAPE_IN } else { v }
                }
                0x1800..=0x1BFF => {
                    let v = self.shared.video.lock().ram[usize::from(a - 0x1800)];
                    // Codes without bit 7 reach the CPU as NOPs.
                    if v & 0x80 != 0 { v } else { 0 }
                }
                0x1C00..=0x1FFF => self.shared.video.lock().ram[usize::from(a - 0x1C00)],
                _ => self
                    .os_rom
                    .as_ref()
                    .and_then(|rom| rom.get(usize::from(a)))
                    .unwrap_or(IDLE),
            };
        }
        if addr <= self.config.ram_end() {
            return host.read_ram(addr);
        }
        if addr >= F000 {
            return self
                .f000_rom
                .as_ref()
                .and_then(|rom| rom.get(usize::from(addr - F000)))
                .unwrap_or(IDLE);
        }
        IDLE
    }

    fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool {
        if addr < LOW_END {
            let a = addr & !A13;
            if (0x1C00..0x2000).contains(&a) {
                self.write_sram(usize::from(a - 0x1C00), value);
                return true;
            }
            return false;
        }
        if addr <= self.config.ram_end() {
            host.write_ram(addr, value);
            return true;
        }
        false
    }
}

impl PortMap for Bcs3 {
    fn read_port<H: Host + ?Sized>(&mut self, _host: &mut H, port: u16) -> u8 {
        if port & 0x04 == 0 {
            self.ctc.read(usize::from(port & 3))
        } else {
            0xFF
        }
    }

    fn write_port<H: Host + ?Sized>(&mut self, _host: &mut H, port: u16, value: u8) {
        if port & 0x04 == 0 {
            self.ctc.write(usize::from(port & 3), value);
        }
    }
}

impl MachineUnit for Bcs3 {
    type Frontend = Bcs3Frontend;

    fn name(&self) -> &'static str {
        "BCS3"
    }

    fn frontend(&self) -> Bcs3Frontend {
        Bcs3Frontend {
            shared: Arc::clone(&self.shared),
        }
    }

    fn default_speed_khz(&self) -> u32 {
        self.config.default_speed_khz()
    }

    fn cycles_elapsed<H: Host + ?Sized>(&mut self, host: &mut H, cycles: u32) {
        let zeros = self.ctc.system_update(cycles);

        if !self.sync_left.is_zero() {
            self.sync_left -= Ticks::from(cycles);
            if self.sync_left.is_zero() {
                self.set_screen_enabled(false);
            }
        }

        for _ in 0..zeros.channel(0) {
            self.audio.toggle(host);
        }
        if zeros.channel(1) > 0 {
            self.audio.set(host, false);
        }
        if zeros.channel(2) > 0 {
            self.sync_left = SYNC_TIMEOUT;
            self.set_screen_enabled(true);
        }
    }

    fn interrupt_requested(&self) -> bool {
        self.ctc.interrupt_requested()
    }

    fn accept_interrupt(&mut self) -> Option<u8> {
        accept(&mut [&mut self.ctc as &mut dyn InterruptSource])
    }

    fn interrupt_finished(&mut self) {
        finish(&mut [&mut self.ctc as &mut dyn InterruptSource]);
    }

    fn reset<H: Host + ?Sized>(&mut self, _host: &mut H, level: ResetLevel) {
        info!("BCS3: {level:?} reset");
        {
            let mut video = self.shared.video.lock();
            if level.resets_chips() {
                video.power_on();
                if self.config.os.has_row_cell() {
                    video.rows = 3;
                }
            }
        }
        self.ctc.reset(level.resets_chips());
        self.shared.keyboard.lock().key_released();
        self.shared.flags.mark_dirty();
    }

    fn attach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.attach(cpu, &[Subscription::Cycles], 1);
    }

    fn detach(&mut self, cpu: &mut dyn CpuLink) {
        self.registrations.release(cpu);
    }

    fn requires_reset(&self, profile: &Profile) -> bool {
        Bcs3Config::from_profile(profile).is_none_or(|c| c != self.config)
    }
}

impl Observable for Bcs3 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ctc.") {
            return self.ctc.query(rest);
        }
        match path {
            "screen_enabled" => Some(self.shared.video.lock().enabled.into()),
            "rows" => Some((self.shared.video.lock().rows as u16).into()),
            "sync_left" => Some(Value::U64(self.sync_left.get())),
            "audio" => Some(self.audio.phase().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["screen_enabled", "rows", "sync_left", "audio", "ctc.<ctc path>"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bcs3Os;
    use emu_core::{KeyboardInput, SimpleHost, VideoSource};

    fn machine(os: Bcs3Os, ram_17k: bool) -> (Bcs3, SimpleHost) {
        let config = Bcs3Config { os, ram_17k };
        let mut host = SimpleHost::new(config.default_speed_khz());
        let roms = Bcs3Roms {
            se24: Some(Rom::from_bytes(&[0x24; 0x1000])),
            se31_29: Some(Rom::from_bytes(&[0x31; 0x1000])),
            se32: Some(Rom::from_bytes(&[0x32; 0x0800])),
            mc_editor: Some(Rom::from_bytes(&[0xED; 0x0400])),
            ..Bcs3Roms::default()
        };
        let mut m = Bcs3::new(config, &roms, None);
        m.reset(&mut host, ResetLevel::PowerOn);
        (m, host)
    }

    #[test]
    fn a13_is_ignored_below_4000() {
        let (mut m, mut host) = machine(Bcs3Os::Se24, false);
        assert_eq!(m.read_memory(&mut host, 0x0000), 0x24);
        assert_eq!(m.read_memory(&mut host, 0x2000), 0x24);
        assert!(m.write_memory(&mut host, 0x3C10, 0x55));
        assert_eq!(m.read_memory(&mut host, 0x1C10), 0x55);
    }

    #[test]
    fn short_rom_and_gaps_read_0f() {
        let (mut m, mut host) = machine(Bcs3Os::Se32, false);
        assert_eq!(m.read_memory(&mut host, 0x07FF), 0x32);
        assert_eq!(m.read_memory(&mut host, 0x0800), 0x0F);
        assert_eq!(m.read_memory(&mut host, 0x1400), 0x0F);
        assert_eq!(m.read_memory(&mut host, 0x4000), 0x0F);
        assert_eq!(m.read_memory(&mut host, 0xF000), 0x0F);
        assert!(!m.write_memory(&mut host, 0x4000, 1));
        assert!(!m.write_memory(&mut host, 0x0000, 1));
    }

    #[test]
    fn generic_ram_with_17k() {
        let (mut m, mut host) = machine(Bcs3Os::Se24, true);
        assert!(m.write_memory(&mut host, 0x7FFF, 0x42));
        assert_eq!(m.read_memory(&mut host, 0x7FFF), 0x42);
        assert!(!m.write_memory(&mut host, 0x8000, 0x42));
        assert_eq!(m.read_memory(&mut host, 0x8000), 0x0F);
    }

    #[test]
    fn editor_rom_at_f000() {
        let (mut m, mut host) = machine(Bcs3Os::Se31_29, false);
        assert_eq!(m.read_memory(&mut host, 0xF000), 0xED);
        assert_eq!(m.read_memory(&mut host, 0xF400), 0x0F);
    }

    #[test]
    fn video_alias_shows_only_bit7_codes() {
        let (mut m, mut host) = machine(Bcs3Os::Se24, false);
        m.write_memory(&mut host, 0x1C00, 0x41);
        m.write_memory(&mut host, 0x1C01, 0xC1);
        assert_eq!(m.read_memory(&mut host, 0x1800), 0);
        assert_eq!(m.read_memory(&mut host, 0x1801), 0xC1);
    }

    #[test]
    fn keyboard_and_tape_on_data_bus() {
        let (mut m, mut host) = machine(Bcs3Os::Se24, false);
        m.frontend().key_typed('A');
        assert_eq!(m.read_memory(&mut host, 0x13FE), 0x04);
        assert_eq!(m.read_memory(&mut host, 0x13FD), 0);
        host.audio_in = true;
        assert_eq!(m.read_memory(&mut host, 0x13FE), 0x84);
    }

    #[test]
    fn row_cell_sets_rows() {
        let (mut m, mut host) = machine(Bcs3Os::Se31_29, false);
        assert_eq!(m.query("rows"), Some(Value::U16(3)));
        m.write_memory(&mut host, 0x1C06, 20);
        assert_eq!(m.query("rows"), Some(Value::U16(20)));

        let (mut m, mut host) = machine(Bcs3Os::Se24, false);
        m.write_memory(&mut host, 0x1C06, 20);
        assert_eq!(m.query("rows"), Some(Value::U16(12)));
    }

    #[test]
    fn ctc_only_on_a2_low() {
        let (mut m, mut host) = machine(Bcs3Os::Se24, false);
        assert_eq!(m.read_port(&mut host, 0x04), 0xFF);
        // Channel 2: counter mode, constant 7.
        m.write_port(&mut host, 0x0A, 0x45);
        m.write_port(&mut host, 0x0A, 0x07);
        assert_eq!(m.read_port(&mut host, 0x02), 7);
        m.write_port(&mut host, 0x06, 0x45);
        assert_eq!(m.read_port(&mut host, 0x02), 7);
    }

    #[test]
    fn channel_0_toggles_and_channel_1_clears_audio() {
        let (mut m, mut host) = machine(Bcs3Os::Se24, false);
        // Channel 1: counter, constant 3. Channel 0: timer, prescaler 16,
        // constant 1.
        m.write_port(&mut host, 0x01, 0x45);
        m.write_port(&mut host, 0x01, 0x03);
        m.write_port(&mut host, 0x00, 0x05);
        m.write_port(&mut host, 0x00, 0x01);
        m.cycles_elapsed(&mut host, 16);
        m.cycles_elapsed(&mut host, 16);
        assert_eq!(host.audio_edges, vec![true, false]);
        m.cycles_elapsed(&mut host, 16);
        assert_eq!(host.audio_edges, vec![true, false, true, false]);
        assert_eq!(m.query("audio"), Some(Value::Bool(false)));
    }

    #[test]
    fn sync_pulse_turns_screen_on() {
        let (mut m, mut host) = machine(Bcs3Os::Se24, false);
        let fe = m.frontend();
        assert!(!fe.display_flags().is_enabled());
        // Channel 2: counter, constant 1; pulse it by writing channel 1
        // as a 1-count counter fed from channel 0.
        m.write_port(&mut host, 0x02, 0x45);
        m.write_port(&mut host, 0x02, 0x01);
        m.write_port(&mut host, 0x01, 0x45);
        m.write_port(&mut host, 0x01, 0x01);
        m.write_port(&mut host, 0x00, 0x05);
        m.write_port(&mut host, 0x00, 0x01);
        m.cycles_elapsed(&mut host, 16);
        assert!(fe.display_flags().is_enabled());
        assert_eq!(fe.border_color_index(), emu_core::WHITE);
    }
}
