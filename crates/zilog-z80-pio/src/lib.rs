//! Zilog Z80 PIO (Parallel Input/Output controller).
//!
//! Two 8-bit ports, each in one of four modes. The CPU side talks to the
//! data and control registers; the board side drives input pins with
//! [`Z80Pio::put_in_value`] / [`Z80Pio::strobe_in_value`] and samples
//! output pins with [`Z80Pio::out_value`] / [`Z80Pio::fetch_out_value`].
//!
//! # Control words
//!
//! | Pattern       | Meaning                                          |
//! |---------------|--------------------------------------------------|
//! | `mm xx 1111`  | Mode: 0 out, 1 in, 2 bidirectional, 3 bit mode   |
//! | `vvvv vvv0`   | Interrupt vector                                 |
//! | `e xxx 0011`  | Interrupt enable flip-flop                       |
//! | `eahm 0111`   | Interrupt control: enable, AND, active high, mask follows |
//!
//! In bit mode the word after the mode word is the I/O mask (1 = input);
//! after an interrupt control word with `m` set, the next word is the
//! interrupt mask (1 = bit not monitored).
//!
//! In bidirectional mode the port B handshake lines serve port A input;
//! port B's own ready line is then not modelled.

use bitflags::bitflags;
use emu_core::{InterruptSource, Observable, Value};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PioPort {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PioMode {
    ByteOut = 0,
    ByteIn = 1,
    ByteInOut = 2,
    BitInOut = 3,
}

impl PioMode {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::ByteOut,
            2 => Self::ByteInOut,
            3 => Self::BitInOut,
            _ => Self::ByteIn,
        }
    }
}

bitflags! {
    /// Port events for the board, accumulated until taken.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PortStatus: u8 {
        const MODE_CHANGED = 0x01;
        const READY_FOR_INPUT = 0x02;
        const OUTPUT_AVAILABLE = 0x04;
        const OUTPUT_CHANGED = 0x08;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextControl {
    None,
    IoMask,
    InterruptMask,
}

#[derive(Debug, Clone)]
struct Port {
    in_value: u8,
    out_value: u8,
    ready: bool,
    mode: PioMode,
    next_control: NextControl,
    io_mask: u8,
    vector: u8,
    int_mask: u8,
    int_active_high: bool,
    int_and: bool,
    int_enabled: bool,
    int_requested: bool,
    int_in_service: bool,
    /// Bit-mode condition was true at the last input change.
    condition_met: bool,
    status: PortStatus,
}

impl Port {
    const fn new() -> Self {
        Self {
            in_value: 0xFF,
            out_value: 0xFF,
            ready: false,
            mode: PioMode::ByteIn,
            next_control: NextControl::None,
            io_mask: 0,
            vector: 0,
            int_mask: 0,
            int_active_high: false,
            int_and: false,
            int_enabled: false,
            int_requested: false,
            int_in_service: false,
            condition_met: false,
            status: PortStatus::empty(),
        }
    }

    fn reset(&mut self, power_on: bool) {
        let vector = self.vector;
        *self = Self::new();
        if !power_on {
            self.vector = vector;
        }
    }

    fn bit_value(&self) -> u8 {
        (self.io_mask & self.in_value) | (!self.io_mask & self.out_value)
    }

    /// Bit-mode interrupt condition over the monitored input bits.
    fn condition(&self) -> bool {
        let monitored = self.io_mask & !self.int_mask;
        if monitored == 0 {
            return false;
        }
        let v = self.bit_value();
        let level = if self.int_active_high { v } else { !v };
        if self.int_and {
            level & monitored == monitored
        } else {
            level & monitored != 0
        }
    }
}

/// Zilog Z80 PIO.
pub struct Z80Pio {
    a: Port,
    b: Port,
    iei: bool,
}

impl Z80Pio {
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: Port::new(),
            b: Port::new(),
            iei: true,
        }
    }

    /// Power-on clears the interrupt vectors; otherwise they survive.
    pub fn reset(&mut self, power_on: bool) {
        self.a.reset(power_on);
        self.b.reset(power_on);
        self.iei = true;
    }

    // --- CPU side ---

    pub fn read_data(&mut self, port: PioPort) -> u8 {
        let handshake = self.input_handshake(port);
        let p = self.port_mut(port);
        let value = match p.mode {
            PioMode::ByteOut => p.out_value,
            PioMode::ByteIn | PioMode::ByteInOut => {
                if handshake {
                    p.ready = true;
                }
                p.in_value
            }
            PioMode::BitInOut => p.bit_value(),
        };
        if p.mode != PioMode::ByteOut {
            p.status |= PortStatus::READY_FOR_INPUT;
        }
        value
    }

    #[must_use]
    pub fn read_control(&self, port: PioPort) -> u8 {
        ((self.port(port).mode as u8) << 6) | 0x3F
    }

    pub fn write_data(&mut self, port: PioPort, value: u8) {
        let handshake = self.output_handshake(port);
        let p = self.port_mut(port);
        let old = p.out_value;
        p.out_value = value;
        if handshake {
            p.ready = true;
        }
        match p.mode {
            PioMode::ByteOut | PioMode::ByteInOut => p.status |= PortStatus::OUTPUT_AVAILABLE,
            PioMode::BitInOut if old != value => p.status |= PortStatus::OUTPUT_CHANGED,
            _ => {}
        }
    }

    pub fn write_control(&mut self, port: PioPort, value: u8) {
        let a_bidirectional = self.a.mode == PioMode::ByteInOut;
        let p = self.port_mut(port);
        match p.next_control {
            NextControl::IoMask => {
                p.io_mask = value;
                p.next_control = NextControl::None;
                return;
            }
            NextControl::InterruptMask => {
                p.int_mask = value;
                p.next_control = NextControl::None;
                return;
            }
            NextControl::None => {}
        }

        if value & 0x0F == 0x0F {
            let old_mode = p.mode;
            p.mode = PioMode::from_bits(value >> 6);
            let owns_handshake = port == PioPort::A || !a_bidirectional;
            match p.mode {
                PioMode::ByteOut => {
                    if owns_handshake {
                        p.ready = false;
                    }
                }
                PioMode::ByteInOut => {
                    if port == PioPort::A {
                        p.ready = false;
                    }
                }
                PioMode::BitInOut => {
                    p.ready = false;
                    p.next_control = NextControl::IoMask;
                }
                PioMode::ByteIn => {
                    if owns_handshake {
                        p.ready = true;
                    }
                }
            }
            if old_mode != p.mode {
                debug!("PIO {port:?}: mode {:?}", p.mode);
                p.status |= PortStatus::MODE_CHANGED;
                if old_mode == PioMode::ByteOut {
                    p.status |= PortStatus::READY_FOR_INPUT;
                }
            }
        } else if value & 0x01 == 0 {
            p.vector = value;
        } else if value & 0x0F == 0x03 {
            p.int_enabled = value & 0x80 != 0;
        } else if value & 0x0F == 0x07 {
            if value & 0x10 != 0 {
                p.int_requested = false;
                p.int_in_service = false;
                p.condition_met = false;
                p.next_control = NextControl::InterruptMask;
            }
            p.int_active_high = value & 0x20 != 0;
            p.int_and = value & 0x40 != 0;
            p.int_enabled = value & 0x80 != 0;
        }
    }

    // --- Board side ---

    /// Drive the input pins selected by `mask`. No handshake.
    ///
    /// In bit mode a false-to-true change of the interrupt condition
    /// requests an interrupt. Returns `false` only in output mode, where
    /// the pins are not sampled.
    pub fn put_in_value(&mut self, port: PioPort, value: u8, mask: u8) -> bool {
        let p = self.port_mut(port);
        match p.mode {
            PioMode::ByteOut => false,
            PioMode::ByteIn | PioMode::ByteInOut => {
                p.in_value = (value & mask) | (p.in_value & !mask);
                true
            }
            PioMode::BitInOut => {
                p.in_value = (value & mask) | (p.in_value & !mask);
                if p.int_enabled {
                    let met = p.condition();
                    let rising = met && !p.condition_met;
                    p.condition_met = met;
                    if rising {
                        self.fire(port);
                    }
                }
                true
            }
        }
    }

    /// Latch a full input byte with an /STB pulse. Clears ready and, if
    /// enabled, requests an interrupt.
    pub fn strobe_in_value(&mut self, port: PioPort, value: u8) -> bool {
        if !self.put_in_value(port, value, 0xFF) {
            return false;
        }
        let handshake = self.input_handshake(port);
        let p = self.port_mut(port);
        if handshake && matches!(p.mode, PioMode::ByteIn | PioMode::ByteInOut) {
            p.ready = false;
            if p.int_enabled {
                self.fire(port);
            }
        }
        true
    }

    /// Sample the output register. With `strobe` an output-mode port
    /// completes its handshake: ready drops and an interrupt may be
    /// requested.
    pub fn fetch_out_value(&mut self, port: PioPort, strobe: bool) -> u8 {
        let handshake = self.output_handshake(port);
        let p = self.port_mut(port);
        let value = p.out_value;
        if strobe && handshake {
            p.ready = false;
            if p.int_enabled {
                self.fire(port);
            }
        }
        value
    }

    /// Output register without handshake side effects.
    #[must_use]
    pub fn out_value(&self, port: PioPort) -> u8 {
        self.port(port).out_value
    }

    #[must_use]
    pub fn in_value(&self, port: PioPort) -> u8 {
        self.port(port).in_value
    }

    #[must_use]
    pub fn mode(&self, port: PioPort) -> PioMode {
        self.port(port).mode
    }

    #[must_use]
    pub fn io_mask(&self, port: PioPort) -> u8 {
        self.port(port).io_mask
    }

    #[must_use]
    pub fn is_ready(&self, port: PioPort) -> bool {
        self.port(port).ready
    }

    /// Return and clear the accumulated port events.
    pub fn take_status(&mut self, port: PioPort) -> PortStatus {
        std::mem::take(&mut self.port_mut(port).status)
    }

    fn port(&self, port: PioPort) -> &Port {
        match port {
            PioPort::A => &self.a,
            PioPort::B => &self.b,
        }
    }

    fn port_mut(&mut self, port: PioPort) -> &mut Port {
        match port {
            PioPort::A => &mut self.a,
            PioPort::B => &mut self.b,
        }
    }

    /// Whether the port runs its own input handshake in its current mode.
    fn input_handshake(&self, port: PioPort) -> bool {
        match port {
            PioPort::A => true,
            PioPort::B => self.b.mode == PioMode::ByteIn && self.a.mode != PioMode::ByteInOut,
        }
    }

    /// Whether the port runs its own output handshake in its current mode.
    fn output_handshake(&self, port: PioPort) -> bool {
        match port {
            PioPort::A => matches!(self.a.mode, PioMode::ByteOut | PioMode::ByteInOut),
            PioPort::B => self.b.mode == PioMode::ByteOut && self.a.mode != PioMode::ByteInOut,
        }
    }

    fn busy(&self) -> bool {
        self.a.int_requested || self.a.int_in_service || self.b.int_requested || self.b.int_in_service
    }

    fn fire(&mut self, port: PioPort) {
        if self.iei && !self.busy() {
            self.port_mut(port).int_requested = true;
        }
    }
}

impl Default for Z80Pio {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSource for Z80Pio {
    fn interrupt_requested(&self) -> bool {
        self.a.int_requested || self.b.int_requested
    }

    fn interrupt_pending(&self) -> bool {
        self.a.int_in_service || self.b.int_in_service
    }

    fn accept_interrupt(&mut self) -> u8 {
        let p = if self.a.int_requested {
            &mut self.a
        } else if self.b.int_requested {
            &mut self.b
        } else {
            return 0xFF;
        };
        p.int_requested = false;
        p.int_in_service = true;
        p.vector
    }

    fn interrupt_finished(&mut self) {
        let p = if self.a.int_in_service {
            &mut self.a
        } else if self.b.int_in_service {
            &mut self.b
        } else {
            return;
        };
        p.int_in_service = false;
        p.condition_met = false;
    }

    fn set_interrupt_enable_in(&mut self, enabled: bool) {
        self.iei = enabled;
    }
}

impl Observable for Z80Pio {
    fn query(&self, path: &str) -> Option<Value> {
        let (port, field) = path.split_once('.')?;
        let p = match port {
            "a" => &self.a,
            "b" => &self.b,
            _ => return None,
        };
        match field {
            "mode" => Some((p.mode as u8).into()),
            "in" => Some(p.in_value.into()),
            "out" => Some(p.out_value.into()),
            "ready" => Some(p.ready.into()),
            "io_mask" => Some(p.io_mask.into()),
            "vector" => Some(p.vector.into()),
            "interrupt_enabled" => Some(p.int_enabled.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "a.mode",
            "a.in",
            "a.out",
            "a.ready",
            "a.io_mask",
            "a.vector",
            "a.interrupt_enabled",
            "b.<same as a>",
        ]
    }
}
