//! Fixed-capacity note slot pool.
//!
//! Each queue owns one [`NoteAllocator`]: a bitmap over a fixed number of
//! note slots. Posting threads claim the lowest free slot, the consumer
//! side releases slots as records are drained. There is no growth path;
//! an exhausted pool is the queue's overrun condition.

use parking_lot::Mutex;
use tracing::warn;

use crate::constants::MAX_QUEUE_NOTES;
use crate::SizeError;

/// Index of one note slot within a queue's pool.
pub type SlotId = u32;

struct AllocatorState {
    /// Bit set ⇔ slot free.
    bitmap: Vec<u64>,
    free: u32,
}

/// Bitmap allocator over a power-of-two number of note slots.
///
/// All operations take the allocator's own lock and complete in bounded
/// time; this is the only point where concurrent posting threads contend.
pub struct NoteAllocator {
    capacity: u32,
    state: Mutex<AllocatorState>,
}

impl NoteAllocator {
    /// Build a pool of `nr_notes` slots.
    ///
    /// `limit` is the queue's configured ceiling; the hard cap
    /// [`MAX_QUEUE_NOTES`] applies regardless.
    pub fn new(
        nr_notes: u32,
        limit: u32,
    ) -> std::result::Result<Self, SizeError> {
        if nr_notes == 0 {
            return Err(SizeError::Zero);
        }
        if !nr_notes.is_power_of_two() {
            return Err(SizeError::NotPowerOfTwo { requested: nr_notes });
        }
        let limit = limit.min(MAX_QUEUE_NOTES);
        if nr_notes > limit {
            return Err(SizeError::ExceedsLimit {
                requested: nr_notes,
                limit,
            });
        }

        let words = nr_notes.div_ceil(64) as usize;
        let mut bitmap = vec![u64::MAX; words];
        if nr_notes % 64 != 0 {
            // Mask off the bits beyond capacity in the last word.
            bitmap[words - 1] = (1u64 << (nr_notes % 64)) - 1;
        }

        Ok(Self {
            capacity: nr_notes,
            state: Mutex::new(AllocatorState {
                bitmap,
                free: nr_notes,
            }),
        })
    }

    /// Claim the lowest-numbered free slot, if any.
    pub fn allocate(&self) -> Option<SlotId> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        for (word_idx, word) in state.bitmap.iter_mut().enumerate() {
            if *word != 0 {
                let bit = word.trailing_zeros();
                *word &= !(1u64 << bit);
                state.free -= 1;
                return Some(word_idx as u32 * 64 + bit);
            }
        }
        None
    }

    /// Return a slot to the pool.
    ///
    /// Releasing a slot that is already free, or out of range, is a logic
    /// error on the caller's side; state is left untouched either way.
    pub fn free(
        &self,
        slot: SlotId,
    ) {
        if slot >= self.capacity {
            warn!("free of out-of-range note slot {} (capacity {})", slot, self.capacity);
            return;
        }
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let word = &mut state.bitmap[(slot / 64) as usize];
        let mask = 1u64 << (slot % 64);
        if *word & mask != 0 {
            warn!("double free of note slot {}", slot);
            return;
        }
        *word |= mask;
        state.free += 1;
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn free_count(&self) -> u32 {
        self.state.lock().free
    }

    /// True when no note is outstanding.
    pub fn all_free(&self) -> bool {
        self.free_count() == self.capacity
    }
}

impl std::fmt::Debug for NoteAllocator {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NoteAllocator")
            .field("capacity", &self.capacity)
            .field("free", &self.free_count())
            .finish()
    }
}
