//! ROM and font images used by the Z9001 family.

use std::path::Path;

use emu_core::Rom;

use crate::config::Z9001Model;

/// All Z9001 images.
#[derive(Debug, Clone, Default)]
pub struct Z9001Roms {
    pub os12: Option<Rom>,
    pub os13: Option<Rom>,
    /// KC87 BASIC at C000.
    pub basic86: Option<Rom>,
    pub font: Option<Rom>,
}

impl Z9001Roms {
    /// Load every image from `dir/z9001/`.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let sub = dir.join("z9001");
        let rom = |name: &str| Rom::load_optional(sub.join(name));
        Self {
            os12: rom("os12.bin"),
            os13: rom("os13.bin"),
            basic86: rom("basic86.bin"),
            font: rom("z9001font.bin"),
        }
    }

    #[must_use]
    pub fn os(&self, model: Z9001Model) -> Option<&Rom> {
        match model {
            Z9001Model::Kc851 => self.os12.as_ref(),
            Z9001Model::Kc87 => self.os13.as_ref(),
        }
    }

    #[must_use]
    pub fn basic(&self, model: Z9001Model) -> Option<&Rom> {
        match model {
            Z9001Model::Kc851 => None,
            Z9001Model::Kc87 => self.basic86.as_ref(),
        }
    }
}
