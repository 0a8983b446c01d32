//! The delivery endpoint of one subscriber.
//!
//! A [`WatchQueue`] combines a fixed note pool, an optional type filter,
//! and the transport sink the consumer drains. The filter and the pool
//! are published through copy-on-write swaps so the posting path reads
//! them without holding any queue lock; the queue's own locks only guard
//! reconfiguration and watch-set edits.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::metrics::OVERRUNS_MARKED;
use crate::FilterSpec;
use crate::NoteAllocator;
use crate::QueueConfig;
use crate::Result;
use crate::SizeError;
use crate::SlotId;
use crate::SubscriptionError;
use crate::Transport;
use crate::TransportError;
use crate::TypeFilter;
use crate::Watch;

/// One subscriber's notification queue.
pub struct WatchQueue {
    /// Active filter; `None` accepts everything. Swapped whole, never
    /// edited in place.
    filter: ArcSwapOption<TypeFilter>,
    /// Note pool; replaced only by `set_size` while the queue is idle.
    allocator: ArcSwap<NoteAllocator>,
    /// `None` once the queue has been cleared.
    transport: RwLock<Option<Arc<dyn Transport>>>,
    /// Watches feeding this queue (queue-side strong references).
    watches: Mutex<Vec<Arc<Watch>>>,
    /// Sticky until the consumer acknowledges.
    overrun: AtomicBool,
    max_notes: u32,
}

impl WatchQueue {
    /// Create a queue over a transport, sized from configuration.
    ///
    /// The transport must confirm it can back the initial pool.
    pub fn new(
        transport: Arc<dyn Transport>,
        config: &QueueConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        if !transport.is_attached() {
            return Err(TransportError::Detached.into());
        }
        let allocator = NoteAllocator::new(config.default_note_capacity, config.max_note_capacity)?;
        transport.reserve(allocator.capacity())?;

        debug!("queue created with {} note slot(s)", allocator.capacity());
        Ok(Arc::new(Self {
            filter: ArcSwapOption::empty(),
            allocator: ArcSwap::from_pointee(allocator),
            transport: RwLock::new(Some(transport)),
            watches: Mutex::new(Vec::new()),
            overrun: AtomicBool::new(false),
            max_notes: config.max_note_capacity,
        }))
    }

    /// Replace the note pool with a freshly sized one.
    ///
    /// Legal only while no watch is attached and no note is outstanding;
    /// rejected otherwise with no change to the current pool.
    pub fn set_size(
        &self,
        nr_notes: u32,
    ) -> Result<()> {
        // Holding the watch-set lock blocks a concurrent attach for the
        // duration of the swap.
        let watches = self.watches.lock();
        let current = self.allocator.load();
        let outstanding = current.capacity() - current.free_count();
        if !watches.is_empty() || outstanding > 0 {
            return Err(SizeError::QueueInUse {
                watches: watches.len(),
                outstanding,
            }
            .into());
        }

        let allocator = NoteAllocator::new(nr_notes, self.max_notes)?;
        let transport = self.transport.read().clone().ok_or(TransportError::Detached)?;
        transport.reserve(nr_notes)?;

        self.allocator.store(Arc::new(allocator));
        debug!(
            "queue resized to {} note slot(s) across {} page(s)",
            nr_notes,
            nr_notes.div_ceil(crate::NOTES_PER_PAGE)
        );
        Ok(())
    }

    /// Validate, compile, and publish a filter specification.
    ///
    /// An empty specification removes the active filter. Concurrent
    /// deliveries observe either the previous or the new filter in full.
    pub fn install_filter(
        &self,
        spec: &FilterSpec,
    ) -> Result<()> {
        if spec.filters.is_empty() {
            self.remove_filter();
            return Ok(());
        }
        let compiled = TypeFilter::compile(spec)?;
        debug!("installing filter with {} entries", compiled.entry_count());
        self.filter.store(Some(Arc::new(compiled)));
        Ok(())
    }

    /// Drop the active filter; the queue accepts everything again.
    pub fn remove_filter(&self) {
        self.filter.store(None);
    }

    /// Detach the transport. Posting to a cleared queue is a silent
    /// no-op; attached watches stay registered until explicitly removed.
    pub fn clear(&self) {
        if self.transport.write().take().is_some() {
            debug!("queue cleared");
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.transport.read().is_none()
    }

    /// Whether notifications have been dropped since the last
    /// acknowledgement.
    pub fn has_overrun(&self) -> bool {
        self.overrun.load(Ordering::Relaxed)
    }

    /// Consumer acknowledgement; clears the sticky overrun condition.
    pub fn ack_overrun(&self) {
        self.overrun.store(false, Ordering::Relaxed);
    }

    /// Return a drained note slot to the pool. Called by the consumer
    /// side once a published record has been read off the transport.
    pub fn release_note(
        &self,
        slot: SlotId,
    ) {
        self.allocator.load().free(slot);
    }

    pub fn note_capacity(&self) -> u32 {
        self.allocator.load().capacity()
    }

    pub fn free_notes(&self) -> u32 {
        self.allocator.load().free_count()
    }

    pub fn watch_count(&self) -> usize {
        self.watches.lock().len()
    }

    pub(crate) fn attach_watch(
        &self,
        watch: Arc<Watch>,
    ) -> Result<()> {
        let mut watches = self.watches.lock();
        if self.is_cleared() {
            return Err(SubscriptionError::QueueDetached.into());
        }
        trace!("attaching watch {} to queue", watch.id());
        watches.push(watch);
        Ok(())
    }

    pub(crate) fn detach_watch(
        &self,
        watch: &Arc<Watch>,
    ) {
        let mut watches = self.watches.lock();
        let before = watches.len();
        watches.retain(|w| !Arc::ptr_eq(w, watch));
        if watches.len() == before {
            warn!("detach of watch {} not held by this queue", watch.id());
        }
    }

    pub(crate) fn filter_snapshot(&self) -> Option<Arc<TypeFilter>> {
        self.filter.load_full()
    }

    pub(crate) fn allocator(&self) -> Arc<NoteAllocator> {
        self.allocator.load_full()
    }

    pub(crate) fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport.read().clone()
    }

    pub(crate) fn mark_overrun(&self) {
        if !self.overrun.swap(true, Ordering::Relaxed) {
            warn!("note pool exhausted, queue marked overrun");
        }
        OVERRUNS_MARKED.inc();
    }
}

impl std::fmt::Debug for WatchQueue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WatchQueue")
            .field("cleared", &self.is_cleared())
            .field("notes", &self.note_capacity())
            .field("free", &self.free_notes())
            .field("overrun", &self.has_overrun())
            .finish()
    }
}
