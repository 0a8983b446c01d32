//! Handle table mapping embedder-chosen handles to live queues.
//!
//! An embedder registers a queue under a numeric handle (a descriptor,
//! a connection id, whatever it keys consumers by) and producers or
//! configurators resolve it later, taking their own reference.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::WatchQueue;

/// Concurrent handle → queue table.
#[derive(Debug, Default)]
pub struct QueueRegistry {
    queues: DashMap<u64, Arc<WatchQueue>>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a queue under a handle, returning any queue previously
    /// registered there.
    pub fn register(
        &self,
        handle: u64,
        queue: Arc<WatchQueue>,
    ) -> Option<Arc<WatchQueue>> {
        debug!("registering queue under handle {}", handle);
        self.queues.insert(handle, queue)
    }

    /// Resolve a handle, taking a reference on the queue.
    pub fn lookup(
        &self,
        handle: u64,
    ) -> Option<Arc<WatchQueue>> {
        self.queues.get(&handle).map(|entry| entry.value().clone())
    }

    /// Drop the table's reference. The queue itself lives on until every
    /// watch and in-flight reader has released it.
    pub fn deregister(
        &self,
        handle: u64,
    ) -> Option<Arc<WatchQueue>> {
        self.queues.remove(&handle).map(|(_, queue)| queue)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
