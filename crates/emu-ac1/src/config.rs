//! AC1 configuration read from the profile.

use emu_core::Profile;

/// Operating system in the 0000 ROM. It also fixes the screen geometry
/// and whether the SCCH switches exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ac1Os {
    /// Monitor 3.1 with 64x32 screen and Mini-BASIC at 0800.
    Mon31_64x32,
    /// Monitor 3.1 with the original 64x16 screen.
    Mon31_64x16,
    /// SCCH monitor 8.0.
    Scch80,
    /// SCCH monitor 10/88 with the switchable character set.
    Scch1088,
}

impl Ac1Os {
    fn from_code(code: &str) -> Self {
        match code {
            "3.1_64x16" => Self::Mon31_64x16,
            "SCCH8.0" => Self::Scch80,
            "SCCH10/88" => Self::Scch1088,
            _ => Self::Mon31_64x32,
        }
    }

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Mon31_64x32 => "mon_31_64x32.bin",
            Self::Mon31_64x16 => "mon_31_64x16.bin",
            Self::Scch80 => "scchmon_80g.bin",
            Self::Scch1088 => "scchmon_1088g.bin",
        }
    }

    #[must_use]
    pub const fn is_scch(self) -> bool {
        matches!(self, Self::Scch80 | Self::Scch1088)
    }

    #[must_use]
    pub const fn is_64x16(self) -> bool {
        matches!(self, Self::Mon31_64x16)
    }

    /// PIO B3 selects between two character sets.
    #[must_use]
    pub const fn font_switchable(self) -> bool {
        matches!(self, Self::Scch1088)
    }

    /// Size of the video RAM and of the static RAM.
    #[must_use]
    pub const fn sram_size(self) -> usize {
        if self.is_64x16() { 0x0400 } else { 0x0800 }
    }
}

/// Everything about an AC1 that is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ac1Config {
    pub os: Ac1Os,
}

impl Ac1Config {
    pub const DEFAULT_SPEED_KHZ: u32 = 2000;

    /// Read the configuration. `None` when the profile selects another
    /// machine.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        if !profile.get_str("jkcemu.system").starts_with("AC1") {
            return None;
        }
        Some(Self {
            os: Ac1Os::from_code(profile.get_str("jkcemu.ac1.os.version")),
        })
    }
}

impl Default for Ac1Config {
    fn default() -> Self {
        Self {
            os: Ac1Os::Mon31_64x32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_versions() {
        let p = Profile::new()
            .with("jkcemu.system", "AC1")
            .with("jkcemu.ac1.os.version", "SCCH10/88");
        let cfg = Ac1Config::from_profile(&p).unwrap();
        assert_eq!(cfg.os, Ac1Os::Scch1088);
        assert!(cfg.os.is_scch());
        assert!(cfg.os.font_switchable());

        let p = p.with("jkcemu.ac1.os.version", "bogus");
        assert_eq!(Ac1Config::from_profile(&p), Some(Ac1Config::default()));
    }

    #[test]
    fn small_screen_has_small_rams() {
        assert_eq!(Ac1Os::Mon31_64x16.sram_size(), 0x0400);
        assert_eq!(Ac1Os::Scch80.sram_size(), 0x0800);
    }

    #[test]
    fn other_machine_is_none() {
        assert_eq!(Ac1Config::from_profile(&Profile::new()), None);
        let p = Profile::new().with("jkcemu.system", "LLC2");
        assert_eq!(Ac1Config::from_profile(&p), None);
    }
}
