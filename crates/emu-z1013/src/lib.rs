//! Robotron Z1013 machine unit.
//!
//! The Z1013 is a single-board computer with a U880 (Z80) CPU, one PIO,
//! a 32x32 character screen at EC00 and a monitor ROM at F000. Extensions
//! covered here: the 64x16 screen mode, the alternative character set,
//! the 4 MHz switch, the eight-bank pixel graphics option, the CC-Jena
//! GDC graphics card, RAM floppies and the 8x8 alpha keyboard.
//!
//! The board is driven by an external Z80 core through
//! [`emu_core::MachineUnit`]. Screen and keyboard are reached from other
//! threads through [`Z1013Frontend`].

mod ccjena;
mod config;
mod frontend;
mod keyboard;
mod roms;
mod video;
mod z1013;

pub use config::{KeyboardKind, Monitor, Z1013Config, Z1013Variant};
pub use frontend::Z1013Frontend;
pub use keyboard::{Matrix8x4, Matrix8x8, Z1013Keyboard};
pub use roms::Z1013Roms;
pub use z1013::Z1013;
