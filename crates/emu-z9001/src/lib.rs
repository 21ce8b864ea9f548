//! Robotron Z9001, KC85/1 and KC87 machine unit.
//!
//! The Z9001 and the KC85/1 share OS 1.2; the KC87 adds OS 1.3 and the
//! BASIC ROM at C000. All three have a 40-column text screen with an
//! optional color RAM, an 8x8 keyboard matrix scanned through a PIO and
//! a CTC for sound and timing.

mod config;
mod frontend;
mod keyboard;
mod roms;
mod video;
mod z9001;

pub use config::{Z9001Config, Z9001Model};
pub use frontend::Z9001Frontend;
pub use roms::Z9001Roms;
pub use video::PALETTE;
pub use z9001::Z9001;
