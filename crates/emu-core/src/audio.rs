//! Edge-reporting audio output line.

use crate::Host;

/// One audio output line. Reports each level change to the host once;
/// writes of the current level are swallowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioLine {
    phase: bool,
}

impl AudioLine {
    #[must_use]
    pub const fn new() -> Self {
        Self { phase: false }
    }

    #[must_use]
    pub const fn phase(&self) -> bool {
        self.phase
    }

    pub fn set<H: Host + ?Sized>(&mut self, host: &mut H, phase: bool) {
        if phase != self.phase {
            self.phase = phase;
            host.write_audio_phase(phase);
        }
    }

    pub fn toggle<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.set(host, !self.phase);
    }
}
