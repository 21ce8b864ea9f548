//! Z1013 configuration read from the profile.

use emu_core::Profile;

/// RAM fitting of the board, from the `jkcemu.system` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Z1013Variant {
    /// 16 KB dynamic RAM, 1 MHz.
    Z1013_01,
    /// 1 KB static RAM at 0000.
    Z1013_12,
    /// 16 KB dynamic RAM.
    Z1013_16,
    /// 64 KB dynamic RAM.
    Z1013_64,
}

impl Z1013Variant {
    /// Parse a `jkcemu.system` tag. Anything starting with `Z1013` that
    /// is not one of the small variants is the 64 KB board.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        if !tag.starts_with("Z1013") {
            return None;
        }
        Some(if tag.starts_with("Z1013.01") {
            Self::Z1013_01
        } else if tag.starts_with("Z1013.12") {
            Self::Z1013_12
        } else if tag.starts_with("Z1013.16") {
            Self::Z1013_16
        } else {
            Self::Z1013_64
        })
    }

    /// Highest address served by generic RAM.
    #[must_use]
    pub const fn ram_end(self) -> u16 {
        match self {
            Self::Z1013_01 | Self::Z1013_16 => 0x3FFF,
            Self::Z1013_12 => 0x03FF,
            Self::Z1013_64 => 0xFFFF,
        }
    }

    #[must_use]
    pub const fn has_static_ram(self) -> bool {
        matches!(self, Self::Z1013_12)
    }

    #[must_use]
    pub const fn default_speed_khz(self) -> u32 {
        match self {
            Self::Z1013_01 => 1000,
            _ => 2000,
        }
    }
}

/// Monitor program in the F000 ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monitor {
    M202,
    A2,
    RbK7659,
    RbS6009,
    Jm1992,
}

impl Monitor {
    fn from_code(code: &str) -> Self {
        match code {
            "A.2" => Self::A2,
            "RB_K7659" => Self::RbK7659,
            "RB_S6009" => Self::RbS6009,
            "JM_1992" => Self::Jm1992,
            _ => Self::M202,
        }
    }

    /// Image file name inside the ROM directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::M202 => "mon_202.bin",
            Self::A2 => "mon_a2.bin",
            Self::RbK7659 => "mon_rb_k7659.bin",
            Self::RbS6009 => "mon_rb_s6009.bin",
            Self::Jm1992 => "mon_jm_1992.bin",
        }
    }

    /// RAM cell holding the monitor's input mode; `'H'` there means hex
    /// input, which changes the 8x4 key encoding.
    #[must_use]
    pub const fn hex_mode_cell(self) -> Option<u16> {
        match self {
            Self::M202 => Some(0x0042),
            Self::Jm1992 => Some(0x003E),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardKind {
    /// Original membrane keyboard, 8 columns x 4 rows.
    Matrix8x4,
    /// Alpha keyboard, 8 columns x 8 rows read as two nibbles.
    Matrix8x8,
}

/// Everything about a Z1013 that is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Z1013Config {
    pub variant: Z1013Variant,
    pub monitor: Monitor,
    /// Eight pixel banks behind the video window.
    pub graphic: bool,
    /// CC-Jena GDC graphics card on ports 18/19.
    pub cc_jena: bool,
    pub keyboard: KeyboardKind,
    pub prehold_ms: u64,
}

impl Z1013Config {
    pub const DEFAULT_PREHOLD_MS: u64 = 50;

    /// Read the configuration. `None` when the profile selects another
    /// machine.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        let tag = profile.get_str("jkcemu.system");
        let variant = if tag.is_empty() {
            Z1013Variant::Z1013_64
        } else {
            Z1013Variant::from_tag(tag)?
        };
        let keyboard = match profile.get_str("jkcemu.z1013.keyboard") {
            "8x8" => KeyboardKind::Matrix8x8,
            _ => KeyboardKind::Matrix8x4,
        };
        let prehold = profile.get_int(
            "jkcemu.z1013.keyboard.prehold_ms",
            Self::DEFAULT_PREHOLD_MS as i64,
        );
        Some(Self {
            variant,
            monitor: Monitor::from_code(profile.get_str("jkcemu.z1013.monitor")),
            graphic: profile.get_bool("jkcemu.z1013.graphic", false),
            cc_jena: profile.get_bool("jkcemu.z1013.graph_ccj.enabled", false),
            keyboard,
            prehold_ms: u64::try_from(prehold).unwrap_or(Self::DEFAULT_PREHOLD_MS),
        })
    }
}

impl Default for Z1013Config {
    fn default() -> Self {
        Self {
            variant: Z1013Variant::Z1013_64,
            monitor: Monitor::M202,
            graphic: false,
            cc_jena: false,
            keyboard: KeyboardKind::Matrix8x4,
            prehold_ms: Self::DEFAULT_PREHOLD_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_gives_defaults() {
        assert_eq!(
            Z1013Config::from_profile(&Profile::new()),
            Some(Z1013Config::default())
        );
    }

    #[test]
    fn variant_tags() {
        assert_eq!(Z1013Variant::from_tag("Z1013.12"), Some(Z1013Variant::Z1013_12));
        assert_eq!(Z1013Variant::from_tag("Z1013.01"), Some(Z1013Variant::Z1013_01));
        assert_eq!(Z1013Variant::from_tag("Z1013"), Some(Z1013Variant::Z1013_64));
        assert_eq!(Z1013Variant::from_tag("AC1"), None);
        assert_eq!(Z1013Variant::Z1013_12.ram_end(), 0x03FF);
        assert_eq!(Z1013Variant::Z1013_16.ram_end(), 0x3FFF);
    }

    #[test]
    fn options_are_read() {
        let p = Profile::new()
            .with("jkcemu.system", "Z1013.16")
            .with("jkcemu.z1013.monitor", "A.2")
            .with("jkcemu.z1013.graphic", "true")
            .with("jkcemu.z1013.keyboard", "8x8")
            .with("jkcemu.z1013.keyboard.prehold_ms", "-5");
        let cfg = Z1013Config::from_profile(&p).unwrap();
        assert_eq!(cfg.variant, Z1013Variant::Z1013_16);
        assert_eq!(cfg.monitor, Monitor::A2);
        assert!(cfg.graphic);
        assert!(!cfg.cc_jena);
        assert_eq!(cfg.keyboard, KeyboardKind::Matrix8x8);
        assert_eq!(cfg.prehold_ms, Z1013Config::DEFAULT_PREHOLD_MS);
    }

    #[test]
    fn other_machine_is_none() {
        let p = Profile::new().with("jkcemu.system", "KC87");
        assert_eq!(Z1013Config::from_profile(&p), None);
    }
}
