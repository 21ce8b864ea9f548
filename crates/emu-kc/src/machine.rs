//! One type for every machine unit.
//!
//! [`Machine`] forwards each trait call to the wrapped unit through a
//! single `match`, so the emulator core needs no generics over the
//! machine type.

use emu_ac1::{Ac1, Ac1Config, Ac1Frontend};
use emu_bcs3::{Bcs3, Bcs3Config, Bcs3Frontend};
use emu_core::{
    ColorIndex, CpuLink, DisplayFlags, Host, Key, KeyboardInput, MachineUnit, MemoryMap,
    Observable, PortMap, Profile, ResetLevel, Value, VideoSource,
};
use emu_llc2::{Llc2, Llc2Frontend};
use emu_z1013::{Z1013, Z1013Config, Z1013Frontend};
use emu_z9001::{Z9001, Z9001Config, Z9001Frontend};
use log::info;

use crate::{MachineError, MachineKind, Resources};

/// Expand `$body` once per variant with `$m` bound to the inner value.
macro_rules! dispatch {
    ($enum:ident, $value:expr, $m:ident => $body:expr) => {
        match $value {
            $enum::Z1013($m) => $body,
            $enum::Ac1($m) => $body,
            $enum::Llc2($m) => $body,
            $enum::Bcs3($m) => $body,
            $enum::Z9001($m) => $body,
        }
    };
}

pub enum Machine {
    Z1013(Z1013),
    Ac1(Ac1),
    Llc2(Llc2),
    Bcs3(Bcs3),
    Z9001(Z9001),
}

impl Machine {
    /// Build the unit the profile selects.
    pub fn from_profile(profile: &Profile, resources: &Resources) -> Result<Self, MachineError> {
        let font = resources.user_font.as_ref();
        let machine = match MachineKind::from_profile(profile)? {
            MachineKind::Z1013 => Self::Z1013(Z1013::new(
                Z1013Config::from_profile(profile).unwrap_or_default(),
                &resources.z1013,
                font,
            )),
            MachineKind::Ac1 => Self::Ac1(Ac1::new(
                Ac1Config::from_profile(profile).unwrap_or_default(),
                &resources.ac1,
                font,
            )),
            MachineKind::Llc2 => Self::Llc2(Llc2::new(&resources.llc2, font)),
            MachineKind::Bcs3 => Self::Bcs3(Bcs3::new(
                Bcs3Config::from_profile(profile).unwrap_or_default(),
                &resources.bcs3,
                font,
            )),
            MachineKind::Z9001 => Self::Z9001(Z9001::new(
                Z9001Config::from_profile(profile).unwrap_or_default(),
                &resources.z9001,
                font,
            )),
        };
        info!("created {} unit", machine.name());
        Ok(machine)
    }

    #[must_use]
    pub fn kind(&self) -> MachineKind {
        match self {
            Self::Z1013(_) => MachineKind::Z1013,
            Self::Ac1(_) => MachineKind::Ac1,
            Self::Llc2(_) => MachineKind::Llc2,
            Self::Bcs3(_) => MachineKind::Bcs3,
            Self::Z9001(_) => MachineKind::Z9001,
        }
    }
}

impl MemoryMap for Machine {
    fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8 {
        dispatch!(Machine, self, m => m.read_memory(host, addr))
    }

    fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool {
        dispatch!(Machine, self, m => m.write_memory(host, addr, value))
    }
}

impl PortMap for Machine {
    fn read_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16) -> u8 {
        dispatch!(Machine, self, m => m.read_port(host, port))
    }

    fn write_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16, value: u8) {
        dispatch!(Machine, self, m => m.write_port(host, port, value));
    }
}

impl MachineUnit for Machine {
    type Frontend = Frontend;

    fn name(&self) -> &'static str {
        dispatch!(Machine, self, m => m.name())
    }

    fn frontend(&self) -> Frontend {
        match self {
            Self::Z1013(m) => Frontend::Z1013(m.frontend()),
            Self::Ac1(m) => Frontend::Ac1(m.frontend()),
            Self::Llc2(m) => Frontend::Llc2(m.frontend()),
            Self::Bcs3(m) => Frontend::Bcs3(m.frontend()),
            Self::Z9001(m) => Frontend::Z9001(m.frontend()),
        }
    }

    fn default_speed_khz(&self) -> u32 {
        dispatch!(Machine, self, m => m.default_speed_khz())
    }

    fn cycles_elapsed<H: Host + ?Sized>(&mut self, host: &mut H, cycles: u32) {
        dispatch!(Machine, self, m => m.cycles_elapsed(host, cycles));
    }

    fn address_changed<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) {
        dispatch!(Machine, self, m => m.address_changed(host, addr));
    }

    fn interrupt_requested(&self) -> bool {
        dispatch!(Machine, self, m => m.interrupt_requested())
    }

    fn accept_interrupt(&mut self) -> Option<u8> {
        dispatch!(Machine, self, m => m.accept_interrupt())
    }

    fn interrupt_finished(&mut self) {
        dispatch!(Machine, self, m => m.interrupt_finished());
    }

    fn reset<H: Host + ?Sized>(&mut self, host: &mut H, level: ResetLevel) {
        dispatch!(Machine, self, m => m.reset(host, level));
    }

    fn attach(&mut self, cpu: &mut dyn CpuLink) {
        dispatch!(Machine, self, m => m.attach(cpu));
    }

    fn detach(&mut self, cpu: &mut dyn CpuLink) {
        dispatch!(Machine, self, m => m.detach(cpu));
    }

    fn requires_reset(&self, profile: &Profile) -> bool {
        dispatch!(Machine, self, m => m.requires_reset(profile))
    }
}

impl Observable for Machine {
    fn query(&self, path: &str) -> Option<Value> {
        dispatch!(Machine, self, m => m.query(path))
    }

    fn query_paths(&self) -> &'static [&'static str] {
        dispatch!(Machine, self, m => m.query_paths())
    }
}

/// Screen and keyboard handle of whichever machine is running.
#[derive(Clone)]
pub enum Frontend {
    Z1013(Z1013Frontend),
    Ac1(Ac1Frontend),
    Llc2(Llc2Frontend),
    Bcs3(Bcs3Frontend),
    Z9001(Z9001Frontend),
}

impl VideoSource for Frontend {
    fn screen_width(&self) -> usize {
        dispatch!(Frontend, self, f => f.screen_width())
    }

    fn screen_height(&self) -> usize {
        dispatch!(Frontend, self, f => f.screen_height())
    }

    fn color_count(&self) -> usize {
        dispatch!(Frontend, self, f => f.color_count())
    }

    fn border_color_index(&self) -> ColorIndex {
        dispatch!(Frontend, self, f => f.border_color_index())
    }

    fn color_index_at(&self, x: usize, y: usize) -> ColorIndex {
        dispatch!(Frontend, self, f => f.color_index_at(x, y))
    }

    fn extract_text(&self) -> Option<String> {
        dispatch!(Frontend, self, f => f.extract_text())
    }

    fn display_flags(&self) -> &DisplayFlags {
        dispatch!(Frontend, self, f => f.display_flags())
    }

    fn render(&self, out: &mut Vec<ColorIndex>) {
        dispatch!(Frontend, self, f => f.render(out));
    }
}

impl KeyboardInput for Frontend {
    fn key_pressed(&self, key: Key, shift: bool) -> bool {
        dispatch!(Frontend, self, f => f.key_pressed(key, shift))
    }

    fn key_released(&self) {
        dispatch!(Frontend, self, f => f.key_released());
    }

    fn key_typed(&self, ch: char) -> bool {
        dispatch!(Frontend, self, f => f.key_typed(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_selects_unit() {
        let res = Resources::default();
        for (tag, kind, name) in [
            ("Z1013.64", MachineKind::Z1013, "Z1013"),
            ("AC1", MachineKind::Ac1, "AC1"),
            ("LLC2", MachineKind::Llc2, "LLC2"),
            ("BCS3", MachineKind::Bcs3, "BCS3"),
            ("KC87", MachineKind::Z9001, "KC87"),
        ] {
            let p = Profile::new().with("jkcemu.system", tag);
            let m = Machine::from_profile(&p, &res).unwrap();
            assert_eq!(m.kind(), kind);
            assert!(m.name().starts_with(name), "{tag}: {}", m.name());
            assert!(!m.requires_reset(&p));
        }
    }

    #[test]
    fn unknown_system_is_refused() {
        let p = Profile::new().with("jkcemu.system", "PC/M");
        assert!(matches!(
            Machine::from_profile(&p, &Resources::default()),
            Err(MachineError::UnknownSystem(_))
        ));
    }
}
