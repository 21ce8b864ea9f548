//! Registrations a machine unit holds with the CPU core.

use log::{debug, warn};

/// Per-instruction notifications a board can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Elapsed T-states after each instruction.
    Cycles,
    /// Every change of the address bus (used where an address line is
    /// wired to a chip input).
    AddressBus,
}

/// Registration surface offered by the external CPU core.
pub trait CpuLink {
    fn subscribe(&mut self, what: Subscription);
    fn unsubscribe(&mut self, what: Subscription);

    /// Install `count` interrupt sources; the board answers acceptance
    /// through its own daisy chain.
    fn set_interrupt_sources(&mut self, count: usize);
    fn clear_interrupt_sources(&mut self);
}

/// Tracks what a machine unit registered so teardown can undo all of it.
#[derive(Debug)]
pub struct Registrations {
    owner: &'static str,
    subscriptions: Vec<Subscription>,
    interrupt_sources: usize,
}

impl Registrations {
    #[must_use]
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            subscriptions: Vec::new(),
            interrupt_sources: 0,
        }
    }

    /// Register with the CPU core. A second attach first releases the
    /// previous registrations.
    pub fn attach(
        &mut self,
        cpu: &mut dyn CpuLink,
        subscriptions: &[Subscription],
        interrupt_sources: usize,
    ) {
        if self.is_attached() {
            self.release(cpu);
        }
        for &what in subscriptions {
            cpu.subscribe(what);
            self.subscriptions.push(what);
        }
        if interrupt_sources > 0 {
            cpu.set_interrupt_sources(interrupt_sources);
        }
        self.interrupt_sources = interrupt_sources;
        debug!(
            "{}: attached {:?}, {} interrupt source(s)",
            self.owner, self.subscriptions, interrupt_sources
        );
    }

    /// Remove every registration made by [`Registrations::attach`].
    pub fn release(&mut self, cpu: &mut dyn CpuLink) {
        for what in self.subscriptions.drain(..) {
            cpu.unsubscribe(what);
        }
        if self.interrupt_sources > 0 {
            cpu.clear_interrupt_sources();
            self.interrupt_sources = 0;
        }
        debug!("{}: released CPU registrations", self.owner);
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty() || self.interrupt_sources > 0
    }
}

impl Drop for Registrations {
    fn drop(&mut self) {
        if self.is_attached() {
            warn!(
                "{}: dropped while still registered with the CPU ({:?})",
                self.owner, self.subscriptions
            );
        }
    }
}

/// A CPU-side registry that just records what is registered.
#[derive(Debug, Default)]
pub struct SimpleCpuLink {
    pub subscribed: Vec<Subscription>,
    pub sources: usize,
}

impl CpuLink for SimpleCpuLink {
    fn subscribe(&mut self, what: Subscription) {
        self.subscribed.push(what);
    }

    fn unsubscribe(&mut self, what: Subscription) {
        self.subscribed.retain(|&s| s != what);
    }

    fn set_interrupt_sources(&mut self, count: usize) {
        self.sources = count;
    }

    fn clear_interrupt_sources(&mut self) {
        self.sources = 0;
    }
}
