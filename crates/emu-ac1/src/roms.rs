//! ROM and font images used by the AC1.

use std::path::Path;

use emu_core::Rom;

use crate::config::Ac1Os;

const FONT_SIZE: usize = 0x0800;

/// All AC1 images. Missing entries leave their window to RAM or their
/// glyphs blank.
#[derive(Debug, Clone, Default)]
pub struct Ac1Roms {
    pub mon_31_64x32: Option<Rom>,
    pub mon_31_64x16: Option<Rom>,
    pub scch_80: Option<Rom>,
    pub scch_1088: Option<Rom>,
    /// Mini-BASIC at 0800 next to monitor 3.1.
    pub minibasic: Option<Rom>,
    /// SCCH GS-BASIC at 4000.
    pub gsbasic: Option<Rom>,
    pub acc_font: Option<Rom>,
    pub scch_font: Option<Rom>,
    /// U402 character ROM of the original 64x16 board.
    pub u402_font: Option<Rom>,
}

impl Ac1Roms {
    /// Load every image from `dir/ac1/`.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let sub = dir.join("ac1");
        let rom = |name: &str| Rom::load_optional(sub.join(name));
        Self {
            mon_31_64x32: rom(Ac1Os::Mon31_64x32.file_name()),
            mon_31_64x16: rom(Ac1Os::Mon31_64x16.file_name()),
            scch_80: rom(Ac1Os::Scch80.file_name()),
            scch_1088: rom(Ac1Os::Scch1088.file_name()),
            minibasic: rom("minibasic.bin"),
            gsbasic: rom("gsbasic.bin"),
            acc_font: rom("accfont.bin"),
            scch_font: rom("scchfont.bin"),
            u402_font: rom("u402bm513x4.bin"),
        }
    }

    #[must_use]
    pub fn os(&self, os: Ac1Os) -> Option<&Rom> {
        match os {
            Ac1Os::Mon31_64x32 => self.mon_31_64x32.as_ref(),
            Ac1Os::Mon31_64x16 => self.mon_31_64x16.as_ref(),
            Ac1Os::Scch80 => self.scch_80.as_ref(),
            Ac1Os::Scch1088 => self.scch_1088.as_ref(),
        }
    }

    /// The character set for `os`. A user font wins. The switchable set
    /// has the ACC glyphs in its lower and the SCCH glyphs in its upper
    /// 2 KB, so that PIO B3 = 1 selects SCCH.
    #[must_use]
    pub fn font(&self, os: Ac1Os, user_font: Option<&Rom>) -> Option<Rom> {
        if let Some(font) = user_font {
            return Some(font.clone());
        }
        match os {
            Ac1Os::Mon31_64x16 => self.u402_font.clone(),
            Ac1Os::Scch80 => self.scch_font.clone(),
            Ac1Os::Scch1088 => match (&self.acc_font, &self.scch_font) {
                (Some(acc), Some(scch)) => {
                    let mut bytes = vec![0; 2 * FONT_SIZE];
                    copy_prefix(&mut bytes[..FONT_SIZE], acc);
                    copy_prefix(&mut bytes[FONT_SIZE..], scch);
                    Some(Rom::from_bytes(&bytes))
                }
                (acc, scch) => scch.clone().or_else(|| acc.clone()),
            },
            Ac1Os::Mon31_64x32 => self.acc_font.clone(),
        }
    }
}

fn copy_prefix(dst: &mut [u8], src: &Rom) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src.as_bytes()[..n]);
}
