//! ROM and font images used by the BCS3.

use std::path::Path;

use emu_core::Rom;

use crate::config::Bcs3Os;

/// All BCS3 images.
#[derive(Debug, Clone, Default)]
pub struct Bcs3Roms {
    pub se24: Option<Rom>,
    pub se31_29: Option<Rom>,
    pub se31_40: Option<Rom>,
    pub se32: Option<Rom>,
    pub se24_font: Option<Rom>,
    pub se31_font: Option<Rom>,
    pub se32_font: Option<Rom>,
    /// Machine-code editor at F000 for SE 3.1 with 29 columns.
    pub mc_editor: Option<Rom>,
}

impl Bcs3Roms {
    /// Load every image from `dir/bcs3/`.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let sub = dir.join("bcs3");
        let rom = |name: &str| Rom::load_optional(sub.join(name));
        Self {
            se24: rom(Bcs3Os::Se24.file_name()),
            se31_29: rom(Bcs3Os::Se31_29.file_name()),
            se31_40: rom(Bcs3Os::Se31_40.file_name()),
            se32: rom(Bcs3Os::Se32.file_name()),
            se24_font: rom("se24font.bin"),
            se31_font: rom("se31font.bin"),
            se32_font: rom("se32font.bin"),
            mc_editor: rom("se31mceditor.bin"),
        }
    }

    #[must_use]
    pub fn os(&self, os: Bcs3Os) -> Option<&Rom> {
        match os {
            Bcs3Os::Se24 => self.se24.as_ref(),
            Bcs3Os::Se31_29 => self.se31_29.as_ref(),
            Bcs3Os::Se31_40 => self.se31_40.as_ref(),
            Bcs3Os::Se32 => self.se32.as_ref(),
        }
    }

    #[must_use]
    pub fn font(&self, os: Bcs3Os) -> Option<&Rom> {
        match os {
            Bcs3Os::Se24 => self.se24_font.as_ref(),
            Bcs3Os::Se31_29 | Bcs3Os::Se31_40 => self.se31_font.as_ref(),
            Bcs3Os::Se32 => self.se32_font.as_ref(),
        }
    }

    /// The F000 ROM, which only the 29-column SE 3.1 has.
    #[must_use]
    pub fn f000(&self, os: Bcs3Os) -> Option<&Rom> {
        match os {
            Bcs3Os::Se31_29 => self.mc_editor.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fonts_follow_version() {
        let roms = Bcs3Roms {
            se31_font: Some(Rom::from_bytes(&[0x31])),
            mc_editor: Some(Rom::from_bytes(&[0xED])),
            ..Bcs3Roms::default()
        };
        assert_eq!(roms.font(Bcs3Os::Se31_40).and_then(|r| r.get(0)), Some(0x31));
        assert!(roms.font(Bcs3Os::Se24).is_none());
        assert!(roms.f000(Bcs3Os::Se31_29).is_some());
        assert!(roms.f000(Bcs3Os::Se31_40).is_none());
    }
}
