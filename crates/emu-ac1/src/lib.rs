//! Amateurcomputer AC1 machine unit.
//!
//! The AC1 carries a U880 CPU, a CTC, a PIO, 2 KB of backwards-addressed
//! video RAM and an OS ROM at 0000. Besides monitor 3.1 on the 64x32 and
//! the original 64x16 board, the SCCH monitors 8.0 and 10/88 are covered
//! with their GS-BASIC, lower-DRAM and ROM switches and the 10/88
//! switchable character set.
//!
//! Keys arrive as ASCII codes latched onto PIO A.

mod ac1;
mod config;
mod frontend;
mod keyboard;
mod roms;
mod video;

pub use ac1::Ac1;
pub use config::{Ac1Config, Ac1Os};
pub use frontend::Ac1Frontend;
pub use roms::Ac1Roms;
