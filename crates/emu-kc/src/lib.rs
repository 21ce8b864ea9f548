//! Machine selection for the Z80 kleincomputer units.
//!
//! The `jkcemu.system` profile entry picks one of the machine crates;
//! [`Machine`] wraps the chosen unit so the emulator core drives every
//! machine through the same traits.

mod error;
mod kind;
mod machine;
mod resources;

pub use error::MachineError;
pub use kind::MachineKind;
pub use machine::{Frontend, Machine};
pub use resources::Resources;
