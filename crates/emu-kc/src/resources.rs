//! ROM images for every machine, loaded once and shared.

use std::path::Path;

use emu_ac1::Ac1Roms;
use emu_bcs3::Bcs3Roms;
use emu_core::Rom;
use emu_llc2::Llc2Roms;
use emu_z1013::Z1013Roms;
use emu_z9001::Z9001Roms;
use log::info;

/// All image sets plus an optional user font that replaces each
/// machine's built-in character set.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub z1013: Z1013Roms,
    pub ac1: Ac1Roms,
    pub llc2: Llc2Roms,
    pub bcs3: Bcs3Roms,
    pub z9001: Z9001Roms,
    pub user_font: Option<Rom>,
}

impl Resources {
    /// Load every set from its subdirectory of `dir`. Missing files are
    /// logged and left empty.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        info!("loading ROM images from {}", dir.display());
        Self {
            z1013: Z1013Roms::load(dir),
            ac1: Ac1Roms::load(dir),
            llc2: Llc2Roms::load(dir),
            bcs3: Bcs3Roms::load(dir),
            z9001: Z9001Roms::load(dir),
            user_font: None,
        }
    }

    #[must_use]
    pub fn with_user_font(mut self, font: Option<Rom>) -> Self {
        self.user_font = font;
        self
    }
}
