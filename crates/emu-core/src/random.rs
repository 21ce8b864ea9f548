//! Power-on RAM contents.

use rand::Rng;

/// Fill `buf` with random bytes, the way DRAM and SRAM come up after
/// power-on.
pub fn fill_random(buf: &mut [u8]) {
    rand::rng().fill(buf);
}
