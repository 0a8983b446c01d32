//! In-memory transport implementation.
//!
//! Backs the note slots with plain vectors. Useful as the reference sink
//! for tests and for embedders that drain notifications in-process rather
//! than over a byte stream.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::SlotId;
use crate::Transport;
use crate::TransportError;

struct MemTransportState {
    /// Records written but not yet published.
    staged: HashMap<SlotId, Vec<u8>>,
    /// Published records in publication order.
    published: Vec<(SlotId, Vec<u8>)>,
    reserved_slots: u32,
    attached: bool,
}

/// Vector-backed [`Transport`].
pub struct MemTransport {
    /// Largest slot count `reserve` will accept.
    capacity_slots: u32,
    state: RwLock<MemTransportState>,
}

impl MemTransport {
    pub fn new(capacity_slots: u32) -> Self {
        Self {
            capacity_slots,
            state: RwLock::new(MemTransportState {
                staged: HashMap::new(),
                published: Vec::new(),
                reserved_slots: 0,
                attached: true,
            }),
        }
    }

    /// Simulate the consumer side going away.
    pub fn detach(&self) {
        self.state.write().attached = false;
    }

    /// Take every published record, in publication order.
    ///
    /// The caller owns releasing the drained slots back to the queue's
    /// note pool (`WatchQueue::release_note`).
    pub fn drain(&self) -> Vec<(SlotId, Vec<u8>)> {
        std::mem::take(&mut self.state.write().published)
    }

    pub fn published_count(&self) -> usize {
        self.state.read().published.len()
    }
}

impl Transport for MemTransport {
    fn reserve(
        &self,
        nr_slots: u32,
    ) -> std::result::Result<(), TransportError> {
        let mut state = self.state.write();
        if !state.attached {
            return Err(TransportError::Detached);
        }
        if nr_slots > self.capacity_slots {
            return Err(TransportError::CapacityRefused { requested: nr_slots });
        }
        trace!("mem transport reserving {} note slots", nr_slots);
        state.reserved_slots = nr_slots;
        Ok(())
    }

    fn write(
        &self,
        slot: SlotId,
        bytes: &[u8],
    ) -> std::result::Result<(), TransportError> {
        let mut state = self.state.write();
        if !state.attached {
            return Err(TransportError::Detached);
        }
        if slot >= state.reserved_slots {
            return Err(TransportError::SlotOutOfRange { slot });
        }
        state.staged.insert(slot, bytes.to_vec());
        Ok(())
    }

    fn publish(
        &self,
        slot: SlotId,
    ) -> std::result::Result<(), TransportError> {
        let mut state = self.state.write();
        if !state.attached {
            return Err(TransportError::Detached);
        }
        let bytes = state
            .staged
            .remove(&slot)
            .ok_or(TransportError::SlotOutOfRange { slot })?;
        state.published.push((slot, bytes));
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.state.read().attached
    }
}
