//! CPU clock configuration.

use crate::Ticks;

/// CPU clock of a board.
///
/// All peripheral timing (prescalers, blink phases, line counters,
/// watchdogs) is derived from the T-state count at this frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// CPU frequency in Hz (e.g., `2_000_000` for a Z1013 at 2 MHz).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    #[must_use]
    pub const fn from_khz(khz: u32) -> Self {
        Self::new(khz as u64 * 1000)
    }

    #[must_use]
    pub const fn khz(&self) -> u32 {
        (self.frequency_hz / 1000) as u32
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }

    /// Ticks per raster line for a 50 Hz frame of `lines` lines.
    #[must_use]
    pub const fn ticks_per_line(&self, lines: u64) -> Ticks {
        Ticks::new(self.frequency_hz / 50 / lines)
    }

    /// Ticks in the given number of milliseconds.
    #[must_use]
    pub const fn ticks_for_millis(&self, millis: u64) -> Ticks {
        Ticks::new(self.frequency_hz * millis / 1000)
    }
}
