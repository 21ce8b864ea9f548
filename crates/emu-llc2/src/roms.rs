//! ROM and font images used by the LLC2.

use std::path::Path;

use emu_core::Rom;

/// All LLC2 images.
#[derive(Debug, Clone, Default)]
pub struct Llc2Roms {
    /// SCCH monitor 9.1, mapped over 0000-BFFF after reset.
    pub monitor: Option<Rom>,
    /// GS-BASIC at 4000.
    pub gsbasic: Option<Rom>,
    pub font: Option<Rom>,
}

impl Llc2Roms {
    /// Load every image from `dir/llc2/`.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let sub = dir.join("llc2");
        let rom = |name: &str| Rom::load_optional(sub.join(name));
        Self {
            monitor: rom("scchmon_91g.bin"),
            gsbasic: rom("gsbasic.bin"),
            font: rom("llc2font.bin"),
        }
    }
}
