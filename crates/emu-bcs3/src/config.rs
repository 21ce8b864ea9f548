//! BCS3 configuration read from the profile.

use emu_core::Profile;

/// BASIC version in the 0000 ROM. It also fixes the screen layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bcs3Os {
    /// SE 2.4: 27 columns, 12 fixed rows of 16 lines.
    Se24,
    /// SE 3.1, 29 columns, with the machine-code editor at F000.
    Se31_29,
    /// SE 3.1, 40 columns.
    Se31_40,
    /// SE 3.2 (S/P-BASIC), 29 columns.
    Se32,
}

/// Where the OS keeps its screen and how it is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Offset of the first cell in static RAM.
    pub offset: usize,
    pub columns: usize,
    /// Bytes from one row to the next; one more than `columns`, the
    /// extra byte being the sync terminator.
    pub stride: usize,
    pub row_height: usize,
    pub height: usize,
}

impl Bcs3Os {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Se24 => "se24.bin",
            Self::Se31_29 => "se31_29.bin",
            Self::Se31_40 => "se31_40.bin",
            Self::Se32 => "se32_29.bin",
        }
    }

    #[must_use]
    pub const fn layout(self) -> Layout {
        match self {
            Self::Se24 => Layout {
                offset: 0x50,
                columns: 27,
                stride: 28,
                row_height: 16,
                height: 192,
            },
            Self::Se31_29 => Layout {
                offset: 0x80,
                columns: 29,
                stride: 30,
                row_height: 8,
                height: 232,
            },
            Self::Se31_40 => Layout {
                offset: 0x80,
                columns: 40,
                stride: 41,
                row_height: 8,
                height: 232,
            },
            Self::Se32 => Layout {
                offset: 0xA0,
                columns: 29,
                stride: 30,
                row_height: 8,
                height: 232,
            },
        }
    }

    /// Rows before the OS has written its row count.
    #[must_use]
    pub const fn initial_rows(self) -> usize {
        match self {
            Self::Se24 => 12,
            _ => 4,
        }
    }

    /// The OS keeps its row count in static RAM cell 1C06.
    #[must_use]
    pub const fn has_row_cell(self) -> bool {
        !matches!(self, Self::Se24)
    }
}

/// Everything about a BCS3 that is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bcs3Config {
    pub os: Bcs3Os,
    /// 16 KB of generic RAM at 4000.
    pub ram_17k: bool,
}

impl Bcs3Config {
    /// Read the configuration. `None` when the profile selects another
    /// machine.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        if !profile.get_str("jkcemu.system").starts_with("BCS3") {
            return None;
        }
        let os = match profile.get_str("jkcemu.bcs3.os.version") {
            "3.1" if profile.get_int("jkcemu.bcs3.chars_per_line", 29) == 40 => Bcs3Os::Se31_40,
            "3.1" => Bcs3Os::Se31_29,
            "3.2" => Bcs3Os::Se32,
            _ => Bcs3Os::Se24,
        };
        Some(Self {
            os,
            ram_17k: profile.get_int("jkcemu.bcs3.ram.kbyte", 1) == 17,
        })
    }

    #[must_use]
    pub const fn default_speed_khz(&self) -> u32 {
        if matches!(self.os, Bcs3Os::Se31_40) { 3500 } else { 2500 }
    }

    /// Last address of generic RAM.
    #[must_use]
    pub const fn ram_end(&self) -> u16 {
        if self.ram_17k { 0x7FFF } else { 0x3FFF }
    }
}

impl Default for Bcs3Config {
    fn default() -> Self {
        Self {
            os: Bcs3Os::Se24,
            ram_17k: false,
        }
    }
}
