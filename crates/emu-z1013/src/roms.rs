//! ROM and font images used by the Z1013.

use std::path::Path;

use emu_core::Rom;

use crate::config::Monitor;

/// All Z1013 images. Missing entries leave their window unmapped or
/// their glyphs blank.
#[derive(Debug, Clone, Default)]
pub struct Z1013Roms {
    pub mon_202: Option<Rom>,
    pub mon_a2: Option<Rom>,
    pub mon_rb_k7659: Option<Rom>,
    pub mon_rb_s6009: Option<Rom>,
    pub mon_jm_1992: Option<Rom>,
    /// Standard character set, 256 x 8 bytes.
    pub font: Option<Rom>,
    /// Alternative character set selected by port 4 bit 5.
    pub alt_font: Option<Rom>,
    /// CC-Jena card character set (16 lines per glyph, optional cursor
    /// glyphs from 0x1000).
    pub ccj_font: Option<Rom>,
}

impl Z1013Roms {
    /// Load every image from `dir/z1013/`.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let sub = dir.join("z1013");
        let rom = |name: &str| Rom::load_optional(sub.join(name));
        Self {
            mon_202: rom(Monitor::M202.file_name()),
            mon_a2: rom(Monitor::A2.file_name()),
            mon_rb_k7659: rom(Monitor::RbK7659.file_name()),
            mon_rb_s6009: rom(Monitor::RbS6009.file_name()),
            mon_jm_1992: rom(Monitor::Jm1992.file_name()),
            font: rom("z1013font.bin"),
            alt_font: rom("altfont.bin"),
            ccj_font: rom("gccjfont.bin"),
        }
    }

    #[must_use]
    pub fn monitor(&self, monitor: Monitor) -> Option<&Rom> {
        match monitor {
            Monitor::M202 => self.mon_202.as_ref(),
            Monitor::A2 => self.mon_a2.as_ref(),
            Monitor::RbK7659 => self.mon_rb_k7659.as_ref(),
            Monitor::RbS6009 => self.mon_rb_s6009.as_ref(),
            Monitor::Jm1992 => self.mon_jm_1992.as_ref(),
        }
    }
}

/// The character sets in effect.
///
/// A user font of 4 KB carries the alternative set in its upper half;
/// a shorter one serves both.
#[derive(Debug, Clone, Default)]
pub(crate) struct Fonts {
    pub standard: Option<Rom>,
    pub alternative: Option<Rom>,
}

impl Fonts {
    pub fn new(roms: &Z1013Roms, user_font: Option<&Rom>) -> Self {
        match user_font {
            Some(font) if font.len() >= 0x1000 => Self {
                standard: Some(font.clone()),
                alternative: Some(Rom::from_bytes(&font.as_bytes()[0x0800..0x1000])),
            },
            Some(font) => Self {
                standard: Some(font.clone()),
                alternative: Some(font.clone()),
            },
            None => Self {
                standard: roms.font.clone(),
                alternative: roms.alt_font.clone(),
            },
        }
    }

    pub fn select(&self, alternative: bool) -> Option<&Rom> {
        if alternative {
            self.alternative.as_ref()
        } else {
            self.standard.as_ref()
        }
    }
}
