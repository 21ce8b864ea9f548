//! The execution context a machine unit runs in.

/// Services the surrounding emulator provides to a machine unit.
///
/// The host owns the generic 64 KB RAM behind the board's own windows,
/// the tape/audio lines, the RAM-floppy devices and the CPU speed setting.
/// Machine units never hold a reference to the host; it is passed into
/// every dispatch call instead.
pub trait Host {
    /// Read a byte of generic RAM.
    fn read_ram(&mut self, addr: u16) -> u8;

    /// Write a byte of generic RAM.
    fn write_ram(&mut self, addr: u16, value: u8);

    /// Current phase of the tape/audio input line.
    fn audio_in_phase(&mut self) -> bool {
        false
    }

    /// Report an edge on the audio output line.
    fn write_audio_phase(&mut self, _phase: bool) {}

    /// Whether the built-in loudspeaker is emulated (as opposed to the
    /// tape output only).
    fn loudspeaker_emulation(&self) -> bool {
        false
    }

    /// Read register `reg` (0-7) of RAM-floppy `unit`. `None` when no
    /// device is attached.
    fn read_mass_storage(&mut self, _unit: usize, _reg: u8) -> Option<u8> {
        None
    }

    /// Write register `reg` (0-7) of RAM-floppy `unit`.
    fn write_mass_storage(&mut self, _unit: usize, _reg: u8, _value: u8) {}

    /// Current CPU speed in kHz.
    fn cpu_speed_khz(&self) -> u32;

    /// Request a CPU speed change (e.g. the Z1013 4 MHz switch).
    fn set_cpu_speed_khz(&mut self, _khz: u32) {}
}

/// A self-contained host for tests and headless runs.
///
/// 64 KB of RAM, two RAM-floppy register files, a settable audio input
/// and a log of every audio output edge.
pub struct SimpleHost {
    pub ram: Box<[u8]>,
    pub audio_in: bool,
    pub audio_edges: Vec<bool>,
    pub loudspeaker: bool,
    pub ram_floppies: [Option<[u8; 8]>; 2],
    pub speed_khz: u32,
}

impl SimpleHost {
    #[must_use]
    pub fn new(speed_khz: u32) -> Self {
        Self {
            ram: vec![0; 0x10000].into_boxed_slice(),
            audio_in: false,
            audio_edges: Vec::new(),
            loudspeaker: false,
            ram_floppies: [None; 2],
            speed_khz,
        }
    }

    /// Attach a RAM floppy with zeroed registers to `unit`.
    pub fn attach_ram_floppy(&mut self, unit: usize) {
        if let Some(slot) = self.ram_floppies.get_mut(unit) {
            *slot = Some([0; 8]);
        }
    }
}

impl Default for SimpleHost {
    fn default() -> Self {
        Self::new(2000)
    }
}

impl Host for SimpleHost {
    fn read_ram(&mut self, addr: u16) -> u8 {
        self.ram[usize::from(addr)]
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        self.ram[usize::from(addr)] = value;
    }

    fn audio_in_phase(&mut self) -> bool {
        self.audio_in
    }

    fn write_audio_phase(&mut self, phase: bool) {
        self.audio_edges.push(phase);
    }

    fn loudspeaker_emulation(&self) -> bool {
        self.loudspeaker
    }

    fn read_mass_storage(&mut self, unit: usize, reg: u8) -> Option<u8> {
        self.ram_floppies
            .get(unit)
            .copied()
            .flatten()
            .map(|regs| regs[usize::from(reg & 7)])
    }

    fn write_mass_storage(&mut self, unit: usize, reg: u8, value: u8) {
        if let Some(Some(regs)) = self.ram_floppies.get_mut(unit) {
            regs[usize::from(reg & 7)] = value;
        }
    }

    fn cpu_speed_khz(&self) -> u32 {
        self.speed_khz
    }

    fn set_cpu_speed_khz(&mut self, khz: u32) {
        self.speed_khz = khz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_floppy_registers_are_per_unit() {
        let mut host = SimpleHost::default();
        assert_eq!(host.read_mass_storage(0, 3), None);
        host.attach_ram_floppy(0);
        host.write_mass_storage(0, 3, 0x5A);
        host.write_mass_storage(1, 3, 0xA5);
        assert_eq!(host.read_mass_storage(0, 3), Some(0x5A));
        assert_eq!(host.read_mass_storage(1, 3), None);
    }

    #[test]
    fn speed_change_is_recorded() {
        let mut host = SimpleHost::new(2000);
        host.set_cpu_speed_khz(4000);
        assert_eq!(host.cpu_speed_khz(), 4000);
    }
}
