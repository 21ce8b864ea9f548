//! Flags shared between the emulation context and the renderer.

use std::sync::atomic::{AtomicBool, Ordering};

/// Index into a machine's palette. 0 is always black, 1 always white.
pub type ColorIndex = u8;

pub const BLACK: ColorIndex = 0;
pub const WHITE: ColorIndex = 1;

/// Screen-dirty and screen-enabled flags.
///
/// Written on the CPU side (video RAM stores, sync pulses, watchdog
/// expiry) and read by the renderer without locking.
#[derive(Debug)]
pub struct DisplayFlags {
    dirty: AtomicBool,
    enabled: AtomicBool,
}

impl DisplayFlags {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dirty: AtomicBool::new(true),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Return the dirty flag and clear it.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Set the enabled flag. A change marks the screen dirty.
    pub fn set_enabled(&self, enabled: bool) {
        if self.enabled.swap(enabled, Ordering::AcqRel) != enabled {
            self.mark_dirty();
        }
    }
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_dirty_clears() {
        let flags = DisplayFlags::new();
        assert!(flags.take_dirty());
        assert!(!flags.take_dirty());
        flags.mark_dirty();
        assert!(flags.is_dirty());
    }

    #[test]
    fn enable_change_marks_dirty() {
        let flags = DisplayFlags::new();
        flags.take_dirty();
        flags.set_enabled(true);
        assert!(!flags.is_dirty());
        flags.set_enabled(false);
        assert!(flags.is_dirty());
        assert!(!flags.is_enabled());
    }
}
