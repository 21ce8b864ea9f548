//! Core traits and types for Z80 home-computer machine units.
//!
//! A machine unit owns the board around an external Z80 core: the memory
//! map, the port map, its peripheral chips, video synthesis and the
//! keyboard matrix. Everything here is shared by the chip and machine
//! crates. Time is counted in CPU T-states; the cycle feed from the CPU
//! core is the only clock.

mod audio;
mod bus;
mod clock;
mod cpu_link;
mod display;
mod host;
mod interrupt;
mod keyboard;
mod machine;
mod observable;
mod profile;
mod random;
mod rom;
mod text;
mod ticks;

pub use audio::AudioLine;
pub use bus::{Bound, Bus, ReadResult};
pub use clock::MasterClock;
pub use cpu_link::{CpuLink, Registrations, SimpleCpuLink, Subscription};
pub use display::{BLACK, ColorIndex, DisplayFlags, WHITE};
pub use host::{Host, SimpleHost};
pub use interrupt::{InterruptSource, accept, finish, propagate_enable};
pub use keyboard::{Key, KeyLatch, KeyboardMatrix, PreHold};
pub use machine::{KeyboardInput, MachineUnit, MemoryMap, PortMap, ResetLevel, VideoSource};
pub use observable::{Observable, Value};
pub use profile::Profile;
pub use random::fill_random;
pub use rom::{ResourceError, Rom};
pub use text::{TextMap, ascii_char, extract_text};
pub use ticks::Ticks;
