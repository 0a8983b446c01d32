//! A single subscription: one watched object bound to one delivery queue.

use std::any::Any;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

#[cfg(test)]
use mockall::automock;

use crate::record::INFO_ID_MASK;
use crate::WatchQueue;

/// Opaque credential attached to a watch at registration time.
///
/// The engine never interprets the token; it only stores it and forwards
/// it to the [`CredentialGate`] at delivery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialToken(u64);

impl CredentialToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Authorization collaborator consulted once per candidate delivery.
///
/// `watch_cred` is the token captured when the watch was registered,
/// `post_cred` the one supplied by the posting producer. Returning false
/// silently skips the delivery.
#[cfg_attr(test, automock)]
pub trait CredentialGate: Send + Sync + 'static {
    fn allow(
        &self,
        watch_cred: &CredentialToken,
        post_cred: &CredentialToken,
    ) -> bool;
}

/// Default gate: every delivery is allowed.
#[derive(Debug, Default)]
pub struct PermitAll;

impl CredentialGate for PermitAll {
    fn allow(
        &self,
        _watch_cred: &CredentialToken,
        _post_cred: &CredentialToken,
    ) -> bool {
        true
    }
}

/// One watch: the link between a watched object and a delivery queue.
///
/// A watch is jointly held by its [`WatchList`](crate::WatchList) and its
/// queue's watch set; posting threads take transient `Arc` clones during
/// traversal, so the backing memory outlives any concurrent reader.
pub struct Watch {
    id: u64,
    /// Low id bits, precomputed in wire position for stamping.
    info_id: u32,
    cred: CredentialToken,
    /// Goes `None` once the queue side has let go; posting skips such
    /// watches until the list side removes them too.
    queue: ArcSwapOption<WatchQueue>,
    private: Option<Arc<dyn Any + Send + Sync>>,
}

impl Watch {
    /// Bind a new watch to a queue (one reference taken on the queue).
    ///
    /// The watch is otherwise unlinked until
    /// [`WatchList::add`](crate::WatchList::add) wires it into an object.
    pub fn new(
        id: u64,
        cred: CredentialToken,
        queue: &Arc<WatchQueue>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            info_id: (id as u32) & INFO_ID_MASK,
            cred,
            queue: ArcSwapOption::from(Some(queue.clone())),
            private: None,
        })
    }

    /// As [`Watch::new`], carrying per-object private data for the
    /// removal callback to reclaim.
    pub fn with_private(
        id: u64,
        cred: CredentialToken,
        queue: &Arc<WatchQueue>,
        private: Arc<dyn Any + Send + Sync>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            info_id: (id as u32) & INFO_ID_MASK,
            cred,
            queue: ArcSwapOption::from(Some(queue.clone())),
            private: Some(private),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cred(&self) -> &CredentialToken {
        &self.cred
    }

    pub fn private(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.private.as_ref()
    }

    /// Resolve the delivery queue, taking a reference; `None` once
    /// detached.
    pub fn queue(&self) -> Option<Arc<WatchQueue>> {
        self.queue.load_full()
    }

    pub(crate) fn info_id(&self) -> u32 {
        self.info_id
    }

    pub(crate) fn detach_queue(&self) {
        self.queue.store(None);
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("id", &self.id)
            .field("attached", &self.queue.load().is_some())
            .finish()
    }
}
