//! Zilog Z80 CTC (Counter/Timer Circuit).
//!
//! Four independent 8-bit down-counters. In timer mode a channel counts
//! system-clock pulses through a 16 or 256 prescaler; in counter mode it
//! counts edges on its CLK/TRG input. Each zero count reloads the time
//! constant, pulses the ZC/TO output and can request an interrupt.
//!
//! # Channel control word (bit 0 = 1)
//!
//! | Bit | Meaning                                   |
//! |-----|-------------------------------------------|
//! | 7   | Interrupt enable                          |
//! | 6   | Mode: 0 = timer, 1 = counter              |
//! | 5   | Prescaler: 0 = 16, 1 = 256 (timer mode)   |
//! | 4   | CLK/TRG edge (not modelled)               |
//! | 3   | Timer waits for CLK/TRG before starting   |
//! | 2   | Time constant follows                     |
//! | 1   | Software reset (channel stops)            |
//!
//! A write with bit 0 = 0 that is not an expected time constant sets the
//! interrupt vector base. The vector delivered on acknowledge is
//! `base + 2 * channel`.
//!
//! ZC/TO outputs of channels 0-2 are often wired to the CLK/TRG input of
//! a later channel on the board; [`Z80Ctc::connect`] models that trace.

use emu_core::{InterruptSource, Observable, Value};
use log::debug;

pub const CHANNELS: usize = 4;

/// Zero-count pulses produced per channel during one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroCounts(pub [u32; CHANNELS]);

impl ZeroCounts {
    #[must_use]
    pub fn channel(&self, ch: usize) -> u32 {
        self.0.get(ch).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.0.iter().any(|&n| n > 0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Channel {
    time_constant: u32,
    counter: u32,
    prescaler: u32,
    prescale_256: bool,
    counter_mode: bool,
    wait_for_trigger: bool,
    int_enabled: bool,
    expects_constant: bool,
    running: bool,
    int_requested: bool,
    int_in_service: bool,
}

impl Channel {
    const fn new() -> Self {
        Self {
            time_constant: 0x100,
            counter: 0x100,
            prescaler: 0,
            prescale_256: false,
            counter_mode: false,
            wait_for_trigger: false,
            int_enabled: false,
            expects_constant: false,
            running: false,
            int_requested: false,
            int_in_service: false,
        }
    }

    fn write(&mut self, value: u8) {
        if self.expects_constant {
            self.time_constant = if value == 0 { 0x100 } else { u32::from(value) };
            self.expects_constant = false;
            if !self.wait_for_trigger && !self.running {
                self.start();
            }
        } else {
            self.int_enabled = value & 0x80 != 0;
            self.counter_mode = value & 0x40 != 0;
            self.prescale_256 = value & 0x20 != 0;
            self.wait_for_trigger = value & 0x08 != 0;
            self.expects_constant = value & 0x04 != 0;
            // A stopped channel waiting for its constant starts on the
            // constant write; a running one keeps counting and picks the
            // new constant up at the next zero count.
            self.running = if value & 0x02 != 0 {
                false
            } else {
                self.running || !self.expects_constant
            };
        }
    }

    fn start(&mut self) {
        self.prescaler = 0;
        self.counter = self.time_constant;
        self.running = true;
    }

    /// Run the prescaler; returns the number of counter decrements.
    fn prescale(&mut self, mut pulses: u32) -> u32 {
        let mut out = 0;
        while self.running && pulses > 0 {
            if self.prescaler == 0 {
                self.prescaler = if self.prescale_256 { 256 } else { 16 };
            }
            if pulses < self.prescaler {
                self.prescaler -= pulses;
                pulses = 0;
            } else {
                pulses -= self.prescaler;
                self.prescaler = 0;
                out += 1;
            }
        }
        out
    }

    /// Count down; returns the number of zero counts. `may_fire` gates
    /// the interrupt request for the first zero count.
    fn count(&mut self, mut pulses: u32, may_fire: &mut bool) -> u32 {
        let mut zeros = 0;
        while self.running && pulses > 0 {
            if pulses < self.counter {
                self.counter -= pulses;
                pulses = 0;
            } else {
                pulses -= self.counter;
                self.counter = self.time_constant;
                zeros += 1;
                if self.int_enabled && *may_fire {
                    self.int_requested = true;
                    *may_fire = false;
                }
            }
        }
        zeros
    }
}

/// Zilog Z80 CTC.
pub struct Z80Ctc {
    channels: [Channel; CHANNELS],
    vector: u8,
    /// ZC/TO(n) -> CLK/TRG(links[n]).
    links: [Option<usize>; CHANNELS],
    iei: bool,
}

impl Z80Ctc {
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: [Channel::new(); CHANNELS],
            vector: 0,
            links: [None; CHANNELS],
            iei: true,
        }
    }

    /// Wire ZC/TO of channel `from` to CLK/TRG of channel `to`.
    ///
    /// Only forward links (`from < to`) exist on real boards; anything
    /// else is ignored.
    pub fn connect(&mut self, from: usize, to: usize) {
        if from < to && to < CHANNELS {
            self.links[from] = Some(to);
        } else {
            debug!("CTC: ignoring link ZC/TO{from} -> CLK/TRG{to}");
        }
    }

    /// Read the current count of a channel. Channels outside 0-3 read `FF`.
    #[must_use]
    pub fn read(&self, ch: usize) -> u8 {
        self.channels
            .get(ch)
            .map_or(0xFF, |c| (c.counter & 0xFF) as u8)
    }

    /// Write a channel register: time constant, vector or control word.
    pub fn write(&mut self, ch: usize, value: u8) {
        let Some(channel) = self.channels.get_mut(ch) else {
            if value & 0x01 == 0 {
                self.vector = value;
            }
            return;
        };
        if channel.expects_constant || value & 0x01 != 0 {
            let was_counter_mode = channel.counter_mode;
            channel.write(value);
            if channel.counter_mode != was_counter_mode {
                debug!(
                    "CTC{ch}: {} mode",
                    if channel.counter_mode { "counter" } else { "timer" }
                );
            }
        } else {
            self.vector = value;
        }
    }

    /// Power-on clears the vector; every reset stops all channels.
    pub fn reset(&mut self, power_on: bool) {
        if power_on {
            self.vector = 0;
        }
        self.channels = [Channel::new(); CHANNELS];
        self.iei = true;
    }

    /// Deliver `pulses` system clock cycles (timer mode channels).
    pub fn system_update(&mut self, pulses: u32) -> ZeroCounts {
        let mut zeros = ZeroCounts::default();
        if pulses == 0 {
            return zeros;
        }
        for ch in 0..CHANNELS {
            if !self.channels[ch].counter_mode {
                let decrements = self.channels[ch].prescale(pulses);
                zeros.0[ch] += self.count(ch, decrements);
            }
            self.cascade(ch, &mut zeros);
        }
        zeros
    }

    /// Deliver `pulses` edges to CLK/TRG of channel `ch`.
    ///
    /// A counter-mode channel counts them; a timer waiting for its trigger
    /// starts instead.
    pub fn external_update(&mut self, ch: usize, pulses: u32) -> ZeroCounts {
        let mut zeros = ZeroCounts::default();
        if ch < CHANNELS {
            zeros.0[ch] = self.trigger(ch, pulses);
            for from in ch..CHANNELS {
                self.cascade(from, &mut zeros);
            }
        }
        zeros
    }

    #[must_use]
    pub fn vector_base(&self) -> u8 {
        self.vector
    }

    #[must_use]
    pub fn is_running(&self, ch: usize) -> bool {
        self.channels.get(ch).is_some_and(|c| c.running)
    }

    fn trigger(&mut self, ch: usize, pulses: u32) -> u32 {
        if pulses == 0 {
            return 0;
        }
        let channel = &mut self.channels[ch];
        if channel.counter_mode {
            self.count(ch, pulses)
        } else {
            if channel.wait_for_trigger && !channel.running {
                channel.wait_for_trigger = false;
                channel.start();
            }
            0
        }
    }

    fn count(&mut self, ch: usize, pulses: u32) -> u32 {
        let mut may_fire = self.iei && !self.any_active();
        self.channels[ch].count(pulses, &mut may_fire)
    }

    /// Forward zero counts of `from` along its board link.
    fn cascade(&mut self, from: usize, zeros: &mut ZeroCounts) {
        if let Some(to) = self.links[from]
            && zeros.0[from] > 0
        {
            zeros.0[to] += self.trigger(to, zeros.0[from]);
        }
    }

    fn any_active(&self) -> bool {
        self.channels
            .iter()
            .any(|c| c.int_requested || c.int_in_service)
    }
}

impl Default for Z80Ctc {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSource for Z80Ctc {
    fn interrupt_requested(&self) -> bool {
        self.channels.iter().any(|c| c.int_requested)
    }

    fn interrupt_pending(&self) -> bool {
        self.channels.iter().any(|c| c.int_in_service)
    }

    fn accept_interrupt(&mut self) -> u8 {
        match self.channels.iter().position(|c| c.int_requested) {
            Some(ch) => {
                self.channels[ch].int_requested = false;
                self.channels[ch].int_in_service = true;
                self.vector.wrapping_add(2 * ch as u8)
            }
            None => 0,
        }
    }

    fn interrupt_finished(&mut self) {
        for c in &mut self.channels {
            c.int_in_service = false;
        }
    }

    fn set_interrupt_enable_in(&mut self, enabled: bool) {
        self.iei = enabled;
    }
}

impl Observable for Z80Ctc {
    fn query(&self, path: &str) -> Option<Value> {
        if path == "vector" {
            return Some(self.vector.into());
        }
        let (ch, field) = path.split_once('.')?;
        let c = self.channels.get(ch.parse::<usize>().ok()?)?;
        match field {
            "counter" => Some(c.counter.into()),
            "time_constant" => Some(c.time_constant.into()),
            "running" => Some(c.running.into()),
            "counter_mode" => Some(c.counter_mode.into()),
            "interrupt_enabled" => Some(c.int_enabled.into()),
            "interrupt_requested" => Some(c.int_requested.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "vector",
            "<n>.counter",
            "<n>.time_constant",
            "<n>.running",
            "<n>.counter_mode",
            "<n>.interrupt_enabled",
            "<n>.interrupt_requested",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Timer mode, prescaler 16, time constant follows.
    const TIMER_16: u8 = 0x05;
    /// Counter mode, time constant follows.
    const COUNTER: u8 = 0x45;

    #[test]
    fn reset_state() {
        let ctc = Z80Ctc::new();
        assert_eq!(ctc.read(0), 0x00); // 0x100 & 0xFF
        assert_eq!(ctc.read(4), 0xFF);
        assert!(!ctc.is_running(0));
    }

    #[test]
    fn timer_counts_through_prescaler() {
        let mut ctc = Z80Ctc::new();
        ctc.write(0, TIMER_16);
        ctc.write(0, 10);
        assert!(ctc.is_running(0));
        assert_eq!(ctc.read(0), 10);

        ctc.system_update(16 * 3);
        assert_eq!(ctc.read(0), 7);

        let zeros = ctc.system_update(16 * 7);
        assert_eq!(zeros.channel(0), 1);
        assert_eq!(ctc.read(0), 10);
    }

    #[test]
    fn zero_time_constant_means_256() {
        let mut ctc = Z80Ctc::new();
        ctc.write(1, COUNTER);
        ctc.write(1, 0);
        let zeros = ctc.external_update(1, 255);
        assert_eq!(zeros.channel(1), 0);
        let zeros = ctc.external_update(1, 1);
        assert_eq!(zeros.channel(1), 1);
    }

    #[test]
    fn control_with_bit1_stops_channel() {
        let mut ctc = Z80Ctc::new();
        ctc.write(0, TIMER_16);
        ctc.write(0, 4);
        ctc.write(0, 0x03);
        assert!(!ctc.is_running(0));
        assert!(!ctc.system_update(1000).any());
    }

    #[test]
    fn trigger_starts_waiting_timer() {
        let mut ctc = Z80Ctc::new();
        ctc.write(2, TIMER_16 | 0x08);
        ctc.write(2, 2);
        assert!(!ctc.is_running(2));
        ctc.external_update(2, 1);
        assert!(ctc.is_running(2));
    }

    #[test]
    fn linked_channel_counts_zero_pulses() {
        let mut ctc = Z80Ctc::new();
        ctc.connect(0, 1);
        ctc.write(0, TIMER_16);
        ctc.write(0, 1);
        ctc.write(1, COUNTER);
        ctc.write(1, 3);

        let zeros = ctc.system_update(16 * 3);
        assert_eq!(zeros.channel(0), 3);
        assert_eq!(zeros.channel(1), 1);
    }

    #[test]
    fn backward_link_is_ignored() {
        let mut ctc = Z80Ctc::new();
        ctc.connect(3, 1);
        ctc.write(3, TIMER_16);
        ctc.write(3, 1);
        ctc.write(1, COUNTER);
        ctc.write(1, 1);
        assert_eq!(ctc.system_update(16).channel(1), 0);
    }

    #[test]
    fn vector_follows_first_requesting_channel() {
        let mut ctc = Z80Ctc::new();
        ctc.write(0, 0x40); // vector base
        ctc.write(2, 0x80 | COUNTER);
        ctc.write(2, 1);
        ctc.external_update(2, 1);
        assert!(ctc.interrupt_requested());
        assert_eq!(ctc.accept_interrupt(), 0x44);
        assert!(ctc.interrupt_pending());
        assert!(!ctc.interrupt_requested());

        // In service: further zero counts do not request again.
        ctc.external_update(2, 1);
        assert!(!ctc.interrupt_requested());

        ctc.interrupt_finished();
        assert!(!ctc.interrupt_pending());
        ctc.external_update(2, 1);
        assert!(ctc.interrupt_requested());
    }

    #[test]
    fn low_iei_blocks_requests() {
        let mut ctc = Z80Ctc::new();
        ctc.set_interrupt_enable_in(false);
        ctc.write(0, 0x80 | COUNTER);
        ctc.write(0, 1);
        ctc.external_update(0, 1);
        assert!(!ctc.interrupt_requested());
    }

    #[test]
    fn warm_reset_keeps_vector() {
        let mut ctc = Z80Ctc::new();
        ctc.write(0, 0x20);
        ctc.reset(false);
        assert_eq!(ctc.vector_base(), 0x20);
        ctc.reset(true);
        assert_eq!(ctc.vector_base(), 0);
    }

    #[test]
    fn observable_paths() {
        let mut ctc = Z80Ctc::new();
        ctc.write(3, TIMER_16);
        ctc.write(3, 0x33);
        assert_eq!(ctc.query("3.counter"), Some(Value::U32(0x33)));
        assert_eq!(ctc.query("3.running"), Some(Value::Bool(true)));
        assert_eq!(ctc.query("9.counter"), None);
    }
}
