//! Leipziger Lerncomputer LLC2 machine unit.
//!
//! The LLC2 pairs a U880 with one CTC and one PIO. The SCCH monitor 9.1
//! covers the lower 48 KB after reset and is switched off by the first
//! access to ports E0-E3. Text video is a 64x32 screen at C000 with
//! per-line and bit-7 inverse modes.

mod frontend;
mod keyboard;
mod llc2;
mod roms;
mod video;

pub use frontend::Llc2Frontend;
pub use llc2::Llc2;
pub use roms::Llc2Roms;
