//! The byte-stream transport seam.
//!
//! The engine treats the consumer-facing buffer purely as a sink: it asks
//! it to back a number of note slots, writes encoded records into claimed
//! slots, and publishes them. Capacity negotiation, read cursors, and
//! poll/wakeup semantics all live behind this trait.

mod mem;
pub use mem::*;

#[cfg(test)]
mod mem_test;

#[cfg(test)]
use mockall::automock;

use crate::SlotId;
use crate::TransportError;

/// Sink side of a consumer's byte-stream buffer.
///
/// **Contract for implementors:**
/// - No method may block; `post` runs on the producer's thread, possibly
///   in contexts where sleeping is forbidden.
/// - `publish` after detach must fail rather than buffer.
#[cfg_attr(test, automock)]
pub trait Transport: Send + Sync + 'static {
    /// Confirm the buffer can back `nr_slots` note slots. Called during
    /// size negotiation, before the engine swaps in a new pool.
    fn reserve(
        &self,
        nr_slots: u32,
    ) -> std::result::Result<(), TransportError>;

    /// Write an encoded record into a claimed slot.
    fn write(
        &self,
        slot: SlotId,
        bytes: &[u8],
    ) -> std::result::Result<(), TransportError>;

    /// Make a written slot visible to the consumer.
    fn publish(
        &self,
        slot: SlotId,
    ) -> std::result::Result<(), TransportError>;

    /// Whether a consumer is still connected.
    fn is_attached(&self) -> bool;
}
