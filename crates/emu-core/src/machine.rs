//! Contracts every machine unit implements.

use crate::cpu_link::CpuLink;
use crate::display::{BLACK, ColorIndex, DisplayFlags};
use crate::host::Host;
use crate::keyboard::Key;
use crate::profile::Profile;

/// Reset depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetLevel {
    /// Power cycle: RAM is randomised, chips lose their vectors.
    PowerOn,
    /// Reset button on boards that reset the chips.
    Cold,
    /// CPU-only reset; RAM and interrupt vectors survive.
    Warm,
}

impl ResetLevel {
    #[must_use]
    pub const fn is_power_on(self) -> bool {
        matches!(self, Self::PowerOn)
    }

    /// Chips are reset on power-on and cold reset.
    #[must_use]
    pub const fn resets_chips(self) -> bool {
        matches!(self, Self::PowerOn | Self::Cold)
    }
}

/// Memory address decoding.
pub trait MemoryMap {
    fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8;

    /// Returns `true` when some window accepted the write. A write into
    /// an active ROM window counts as accepted.
    fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool;
}

/// I/O port decoding. `port` is the full 16-bit port address.
pub trait PortMap {
    fn read_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16) -> u8;
    fn write_port<H: Host + ?Sized>(&mut self, host: &mut H, port: u16, value: u8);
}

/// Pixel source for the renderer.
///
/// Every method is a pure read of shared video state; calling
/// `color_index_at` twice without an intervening write returns the same
/// value.
pub trait VideoSource: Send + Sync {
    fn screen_width(&self) -> usize;
    fn screen_height(&self) -> usize;

    fn color_count(&self) -> usize {
        2
    }

    fn border_color_index(&self) -> ColorIndex {
        BLACK
    }

    fn color_index_at(&self, x: usize, y: usize) -> ColorIndex;

    /// Text currently on screen, if the display mode has a character
    /// raster.
    fn extract_text(&self) -> Option<String> {
        None
    }

    fn display_flags(&self) -> &DisplayFlags;

    /// Render the whole screen row by row into `out`.
    fn render(&self, out: &mut Vec<ColorIndex>) {
        let (w, h) = (self.screen_width(), self.screen_height());
        out.clear();
        out.reserve(w * h);
        for y in 0..h {
            for x in 0..w {
                out.push(self.color_index_at(x, y));
            }
        }
    }
}

/// Key events from the input context.
pub trait KeyboardInput: Send + Sync {
    /// A non-character key went down. Returns `false` if the machine has
    /// no use for it.
    fn key_pressed(&self, key: Key, shift: bool) -> bool;

    /// All keys up.
    fn key_released(&self);

    /// A character key went down. Returns `false` for characters the
    /// keyboard cannot produce.
    fn key_typed(&self, ch: char) -> bool;
}

/// A complete board driven by an external Z80 core.
///
/// The unit is owned by the emulation context; [`MachineUnit::frontend`]
/// hands out the shared video/keyboard handle for the render and input
/// contexts.
pub trait MachineUnit: MemoryMap + PortMap {
    type Frontend: VideoSource + KeyboardInput + Clone;

    fn name(&self) -> &'static str;

    fn frontend(&self) -> Self::Frontend;

    fn default_speed_khz(&self) -> u32;

    /// Cycle feed: `cycles` T-states have elapsed since the last call.
    fn cycles_elapsed<H: Host + ?Sized>(&mut self, host: &mut H, cycles: u32);

    /// Address bus changed (only delivered when subscribed).
    fn address_changed<H: Host + ?Sized>(&mut self, _host: &mut H, _addr: u16) {}

    fn interrupt_requested(&self) -> bool {
        false
    }

    /// Interrupt acknowledge through the board's daisy chain.
    fn accept_interrupt(&mut self) -> Option<u8> {
        None
    }

    /// RETI executed.
    fn interrupt_finished(&mut self) {}

    fn reset<H: Host + ?Sized>(&mut self, host: &mut H, level: ResetLevel);

    /// Register cycle/address subscriptions and interrupt sources.
    fn attach(&mut self, cpu: &mut dyn CpuLink);

    /// Undo everything [`MachineUnit::attach`] registered.
    fn detach(&mut self, cpu: &mut dyn CpuLink);

    /// Whether switching to `profile` needs a new unit. Never returns
    /// `false` for a change that alters emulated hardware.
    fn requires_reset(&self, profile: &Profile) -> bool;
}
