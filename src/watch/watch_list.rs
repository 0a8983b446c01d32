//! The set of watches attached to one watched object.
//!
//! This module:
//! - Tracks every watch registered on an object, keyed by (queue, id)
//! - Enforces at most one watch per (object, queue) pair
//! - Publishes the watcher set as a copy-on-write snapshot so posting
//!   threads traverse it without taking any lock
//! - Detaches watches from their queues on removal and teardown,
//!   synthesizing the final removal notification
//!
//! Mutation is serialized by the list's own lock; readers holding an old
//! snapshot keep its watches alive through their `Arc` clones, which is
//! what makes concurrent post-during-teardown safe.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use crate::post::post_removal_notification;
use crate::CredentialGate;
use crate::PermitAll;
use crate::Result;
use crate::SubscriptionError;
use crate::Watch;
use crate::WatchQueue;

type RemovalCallback = Box<dyn Fn(&Arc<Watch>) + Send + Sync>;

/// All watches on one watched object; owned by that object.
pub struct WatchList {
    watchers: ArcSwap<Vec<Arc<Watch>>>,
    /// Serializes membership edits; never held while posting.
    lock: Mutex<()>,
    on_remove: Option<RemovalCallback>,
    gate: Arc<dyn CredentialGate>,
}

impl Default for WatchList {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchList {
    pub fn new() -> Self {
        Self {
            watchers: ArcSwap::from_pointee(Vec::new()),
            lock: Mutex::new(()),
            on_remove: None,
            gate: Arc::new(PermitAll),
        }
    }

    /// Install a callback fired exactly once per removed watch, whichever
    /// side triggers the removal.
    pub fn with_release(
        mut self,
        on_remove: impl Fn(&Arc<Watch>) + Send + Sync + 'static,
    ) -> Self {
        self.on_remove = Some(Box::new(on_remove));
        self
    }

    /// Install the authorization collaborator consulted per delivery.
    pub fn with_gate(
        mut self,
        gate: Arc<dyn CredentialGate>,
    ) -> Self {
        self.gate = gate;
        self
    }

    /// Register a watch on this object.
    ///
    /// Links the watch into both this list and its queue's watch set.
    /// Fails with `AlreadyWatching` when another watch on this object
    /// already feeds the same queue, and with `QueueDetached` when the
    /// queue has been cleared.
    pub fn add(
        &self,
        watch: Arc<Watch>,
    ) -> Result<()> {
        let queue = watch.queue().ok_or(SubscriptionError::QueueDetached)?;

        let _guard = self.lock.lock();
        let current = self.watchers.load();
        if let Some(existing) = current
            .iter()
            .find(|w| w.queue().is_some_and(|q| Arc::ptr_eq(&q, &queue)))
        {
            return Err(SubscriptionError::AlreadyWatching {
                existing_id: existing.id(),
            }
            .into());
        }

        queue.attach_watch(watch.clone())?;

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(watch.clone());
        self.watchers.store(Arc::new(next));

        debug!("watch {} added, {} watcher(s) on object", watch.id(), current.len() + 1);
        Ok(())
    }

    /// Remove the watch identified by (queue, id).
    ///
    /// Fires the removal callback, posts the final removal notification
    /// to the queue, and releases both sides' references.
    pub fn remove(
        &self,
        queue: &Arc<WatchQueue>,
        id: u64,
    ) -> Result<()> {
        let removed = {
            let _guard = self.lock.lock();
            let current = self.watchers.load();
            let position = current
                .iter()
                .position(|w| w.id() == id && w.queue().is_some_and(|q| Arc::ptr_eq(&q, queue)));
            let Some(position) = position else {
                return Err(SubscriptionError::WatchNotFound { id }.into());
            };

            let mut next = current.as_ref().clone();
            let removed = next.remove(position);
            self.watchers.store(Arc::new(next));
            removed
        };

        // Released outside the list lock: the callback may re-enter.
        self.release_watch(&removed);
        Ok(())
    }

    /// Detach every remaining watch; used at watched-object teardown.
    pub fn teardown(&self) {
        let removed = {
            let _guard = self.lock.lock();
            let removed = self.watchers.load_full();
            self.watchers.store(Arc::new(Vec::new()));
            removed
        };

        trace!("tearing down watch list with {} watcher(s)", removed.len());
        for watch in removed.iter() {
            self.release_watch(watch);
        }
    }

    pub fn len(&self) -> usize {
        self.watchers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.load().is_empty()
    }

    /// Current watcher snapshot for lock-free traversal.
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<Watch>>> {
        self.watchers.load_full()
    }

    pub(crate) fn gate(&self) -> &dyn CredentialGate {
        self.gate.as_ref()
    }

    fn release_watch(
        &self,
        watch: &Arc<Watch>,
    ) {
        debug!("releasing watch {}", watch.id());
        if let Some(on_remove) = &self.on_remove {
            on_remove(watch);
        }
        post_removal_notification(watch);
        if let Some(queue) = watch.queue() {
            queue.detach_watch(watch);
        }
        watch.detach_queue();
    }
}

impl std::fmt::Debug for WatchList {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WatchList").field("watchers", &self.len()).finish()
    }
}
