//! BCS3 machine unit.
//!
//! The BCS3 has no video controller. The CPU executes each screen row
//! from the static RAM alias at 1800 while a CTC channel times the
//! lines; ZC/TO2 marks the frame. The emulation renders the screen from
//! static RAM whenever frame sync pulses keep arriving.
//!
//! Supported ROMs: BASIC SE 2.4, SE 3.1 (29 or 40 columns) and S/P-BASIC
//! SE 3.2.

mod bcs3;
mod config;
mod frontend;
mod keyboard;
mod roms;
mod video;

pub use bcs3::Bcs3;
pub use config::{Bcs3Config, Bcs3Os, Layout};
pub use frontend::Bcs3Frontend;
pub use roms::Bcs3Roms;
