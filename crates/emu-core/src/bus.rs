//! Memory and I/O bus interface.

use crate::host::Host;
use crate::machine::{MemoryMap, PortMap};

/// Result of a bus read: the data byte plus any wait states inserted.
///
/// None of the supported boards stretch bus cycles, but the CPU core
/// interface carries the field so a contended board can be added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadResult {
    pub data: u8,
    pub wait: u8,
}

impl ReadResult {
    #[must_use]
    pub const fn new(data: u8) -> Self {
        Self { data, wait: 0 }
    }

    #[must_use]
    pub const fn with_wait(data: u8, wait: u8) -> Self {
        Self { data, wait }
    }
}

/// Memory and I/O bus interface, as seen by the CPU core.
///
/// Addresses are passed as `u32` and masked to 16 bits by the board.
pub trait Bus {
    /// Read a byte from memory.
    fn read(&mut self, addr: u32) -> ReadResult;

    /// Write a byte to memory. Returns wait states.
    fn write(&mut self, addr: u32, value: u8) -> u8;

    /// Read a byte from an I/O port. The full 16-bit port address is used.
    fn io_read(&mut self, addr: u32) -> ReadResult;

    /// Write a byte to an I/O port. Returns wait states.
    fn io_write(&mut self, addr: u32, value: u8) -> u8;
}

/// A machine unit bound to the host it runs in, presented as a [`Bus`].
///
/// The binding lives only for the duration of one CPU step so the machine
/// and the host stay separately owned.
pub struct Bound<'a, M: ?Sized, H: ?Sized> {
    pub machine: &'a mut M,
    pub host: &'a mut H,
}

impl<'a, M: ?Sized, H: ?Sized> Bound<'a, M, H> {
    pub fn new(machine: &'a mut M, host: &'a mut H) -> Self {
        Self { machine, host }
    }
}

impl<M, H> Bus for Bound<'_, M, H>
where
    M: MemoryMap + PortMap + ?Sized,
    H: Host + ?Sized,
{
    fn read(&mut self, addr: u32) -> ReadResult {
        ReadResult::new(self.machine.read_memory(&mut *self.host, addr as u16))
    }

    fn write(&mut self, addr: u32, value: u8) -> u8 {
        self.machine.write_memory(&mut *self.host, addr as u16, value);
        0
    }

    fn io_read(&mut self, addr: u32) -> ReadResult {
        ReadResult::new(self.machine.read_port(&mut *self.host, addr as u16))
    }

    fn io_write(&mut self, addr: u32, value: u8) -> u8 {
        self.machine.write_port(&mut *self.host, addr as u16, value);
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimpleHost;

    /// RAM everywhere, one latch port at 0x10.
    struct Board {
        latch: u8,
    }

    impl MemoryMap for Board {
        fn read_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16) -> u8 {
            host.read_ram(addr)
        }

        fn write_memory<H: Host + ?Sized>(&mut self, host: &mut H, addr: u16, value: u8) -> bool {
            host.write_ram(addr, value);
            true
        }
    }

    impl PortMap for Board {
        fn read_port<H: Host + ?Sized>(&mut self, _host: &mut H, port: u16) -> u8 {
            if port as u8 == 0x10 { self.latch } else { 0xFF }
        }

        fn write_port<H: Host + ?Sized>(&mut self, _host: &mut H, port: u16, value: u8) {
            if port as u8 == 0x10 {
                self.latch = value;
            }
        }
    }

    #[test]
    fn bound_forwards_to_machine_and_host() {
        let mut board = Board { latch: 0 };
        let mut host = SimpleHost::new(2000);
        let mut bus = Bound::new(&mut board, &mut host);
        assert_eq!(bus.write(0x1_2345, 0x5A), 0);
        assert_eq!(bus.read(0x2345), ReadResult::new(0x5A));
        bus.io_write(0x3F10, 0x77);
        assert_eq!(bus.io_read(0x0010).data, 0x77);
        assert_eq!(bus.io_read(0x0011).data, 0xFF);
        assert_eq!(host.ram[0x2345], 0x5A);
        assert_eq!(board.latch, 0x77);
    }
}
