//! Z80 mode-2 interrupt daisy chain.
//!
//! Sources are wired in a fixed priority order. A source that has an
//! interrupt in service pulls its IEO low, which blocks every source
//! behind it until RETI. A board passes its chain as an ordered array:
//!
//! ```text
//! CPU <- [ source 0 ] <- [ source 1 ] <- [ source 2 ]
//!        IEI=1          IEI=IEO(0)      IEI=IEO(1)
//! ```

use log::trace;

/// One participant in the daisy chain.
pub trait InterruptSource {
    /// The source has fired and waits for the CPU to acknowledge.
    fn interrupt_requested(&self) -> bool;

    /// An interrupt of this source was acknowledged and its service
    /// routine has not executed RETI yet.
    fn interrupt_pending(&self) -> bool;

    /// Acknowledge the highest-priority request; returns the vector byte.
    fn accept_interrupt(&mut self) -> u8;

    /// RETI seen for this source.
    fn interrupt_finished(&mut self);

    /// Level of the IEI input. A source only fires while IEI is high.
    fn set_interrupt_enable_in(&mut self, _enabled: bool) {}
}

/// Recompute every IEI input: high unless a higher-priority source is
/// requesting or in service.
pub fn propagate_enable(chain: &mut [&mut dyn InterruptSource]) {
    let mut enabled = true;
    for source in chain.iter_mut() {
        source.set_interrupt_enable_in(enabled);
        if source.interrupt_pending() || source.interrupt_requested() {
            enabled = false;
        }
    }
}

/// Acknowledge the first request in priority order.
///
/// Returns `None` when nothing requests or when a higher-priority source
/// is still in service.
pub fn accept(chain: &mut [&mut dyn InterruptSource]) -> Option<u8> {
    let mut vector = None;
    for (pos, source) in chain.iter_mut().enumerate() {
        if source.interrupt_requested() {
            let v = source.accept_interrupt();
            trace!("daisy chain: source {pos} accepted, vector {v:#04X}");
            vector = Some(v);
            break;
        }
        if source.interrupt_pending() {
            break;
        }
    }
    propagate_enable(chain);
    vector
}

/// Deliver RETI to the highest-priority source in service.
pub fn finish(chain: &mut [&mut dyn InterruptSource]) {
    if let Some(source) = chain.iter_mut().find(|s| s.interrupt_pending()) {
        source.interrupt_finished();
    }
    propagate_enable(chain);
}
