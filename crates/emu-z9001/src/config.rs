//! Z9001 configuration read from the profile.

use emu_core::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Z9001Model {
    /// Z9001 or KC85/1 with OS 1.2.
    Kc851,
    /// KC87 with OS 1.3 and BASIC at C000.
    Kc87,
}

/// Everything about a Z9001 that is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Z9001Config {
    pub model: Z9001Model,
    /// Color RAM at E800 and the graphics extension.
    pub color: bool,
    /// 16, 32, 48 or 74.
    pub ram_kbyte: u16,
}

impl Default for Z9001Config {
    fn default() -> Self {
        Self {
            model: Z9001Model::Kc87,
            color: true,
            ram_kbyte: 16,
        }
    }
}

impl Z9001Config {
    pub const DEFAULT_SPEED_KHZ: u32 = 2458;

    /// Read the configuration. `None` when the profile selects another
    /// machine.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        let model = match profile.get_str("jkcemu.system") {
            "KC87" => Z9001Model::Kc87,
            "KC85/1" => Z9001Model::Kc851,
            _ => return None,
        };
        let ram_kbyte = match profile.get_int("jkcemu.z9001.ram.kbyte", 16) {
            32 => 32,
            48 => 48,
            74 => 74,
            _ => 16,
        };
        Some(Self {
            model,
            color: profile.get_bool("jkcemu.z9001.color", true),
            ram_kbyte,
        })
    }

    /// Last address of generic RAM.
    #[must_use]
    pub const fn ram_end(&self) -> u16 {
        match self.ram_kbyte {
            32 => 0x7FFF,
            48 => 0xBFFF,
            74 => 0xE7FF,
            _ => 0x3FFF,
        }
    }

    /// The 74 KB option adds a switchable 16 KB bank at 4000 and RAM
    /// under the BASIC ROM.
    #[must_use]
    pub const fn has_extended_ram(&self) -> bool {
        self.ram_end() > 0xC000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_from_system_tag() {
        let kc87 = Profile::new().with("jkcemu.system", "KC87");
        let config = Z9001Config::from_profile(&kc87).unwrap();
        assert_eq!(config.model, Z9001Model::Kc87);
        assert!(config.color);
        assert_eq!(config.ram_end(), 0x3FFF);

        let kc851 = Profile::new()
            .with("jkcemu.system", "KC85/1")
            .with("jkcemu.z9001.color", "false")
            .with("jkcemu.z9001.ram.kbyte", "48");
        let config = Z9001Config::from_profile(&kc851).unwrap();
        assert_eq!(config.model, Z9001Model::Kc851);
        assert!(!config.color);
        assert_eq!(config.ram_end(), 0xBFFF);
        assert!(!config.has_extended_ram());

        assert!(Z9001Config::from_profile(&Profile::new().with("jkcemu.system", "LLC2")).is_none());
    }

    #[test]
    fn only_74k_has_extended_ram() {
        let config = Z9001Config {
            ram_kbyte: 74,
            ..Z9001Config::default()
        };
        assert_eq!(config.ram_end(), 0xE7FF);
        assert!(config.has_extended_ram());
    }
}
