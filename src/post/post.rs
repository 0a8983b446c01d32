//! Delivery: fan one record out to every watch on an object.
//!
//! This path runs on whatever thread triggered the event. The contract is
//! strict: it must never sleep, never block on a consumer, and never grow
//! memory beyond the fixed slot write. Everything that can go wrong on a
//! single watch (detached queue, rejected filter, exhausted pool, dead
//! transport) degrades to a skip; the producer always proceeds.
//!
//! Traversal reads the watch list's copy-on-write snapshot, so posting
//! threads take no lock at all until note allocation. A concurrent
//! removal or teardown swaps the snapshot out from under us harmlessly:
//! the watches we hold stay alive through our `Arc` clones and at worst
//! deliver one final time into their (possibly already detached) queue.

use std::sync::Arc;

use tracing::trace;

use crate::metrics::NOTIFICATIONS_DELIVERED;
use crate::metrics::NOTIFICATIONS_DENIED;
use crate::metrics::NOTIFICATIONS_DROPPED_OVERRUN;
use crate::metrics::NOTIFICATIONS_FILTERED;
use crate::metrics::NOTIFICATIONS_SKIPPED_DETACHED;
use crate::metrics::REMOVAL_NOTIFICATIONS;
use crate::record::META_REMOVAL_NOTIFICATION;
use crate::CredentialToken;
use crate::Notification;
use crate::Watch;
use crate::WatchList;
use crate::WatchQueue;

/// Post a record to every watch on the object's list.
///
/// `cred` is the producer's credential, forwarded to the list's
/// [`CredentialGate`](crate::CredentialGate) per watch. `id` identifies
/// the emitting object instance and is carried for tracing and
/// attribution; the watch's own id is what gets stamped into the
/// delivered record.
pub fn post_watch_notification(
    wlist: &WatchList,
    n: &Notification,
    cred: &CredentialToken,
    id: u64,
) {
    let watchers = wlist.snapshot();
    trace!(
        "posting {:?}/{} from object {} to {} watcher(s)",
        n.ntype(),
        n.subtype(),
        id,
        watchers.len()
    );

    for watch in watchers.iter() {
        if !wlist.gate().allow(watch.cred(), cred) {
            NOTIFICATIONS_DENIED.inc();
            continue;
        }
        let Some(queue) = watch.queue() else {
            NOTIFICATIONS_SKIPPED_DETACHED.inc();
            continue;
        };
        if let Some(filter) = queue.filter_snapshot() {
            if !filter.matches(n) {
                NOTIFICATIONS_FILTERED.inc();
                continue;
            }
        }
        post_one_notification(watch, &queue, n);
    }
}

/// Deliver one record into one queue: claim a note slot, stamp the
/// watch's id into the info word, write, publish.
///
/// Returns false on any skip. Pool exhaustion marks the queue overrun;
/// a transport rejection frees the claimed slot again.
pub(crate) fn post_one_notification(
    watch: &Arc<Watch>,
    queue: &WatchQueue,
    n: &Notification,
) -> bool {
    let Some(transport) = queue.transport() else {
        NOTIFICATIONS_SKIPPED_DETACHED.inc();
        return false;
    };

    let allocator = queue.allocator();
    let Some(slot) = allocator.allocate() else {
        queue.mark_overrun();
        NOTIFICATIONS_DROPPED_OVERRUN.inc();
        return false;
    };

    let buf = n.encode_stamped(watch.info_id());
    if let Err(e) = transport.write(slot, &buf).and_then(|()| transport.publish(slot)) {
        trace!("transport rejected slot {}: {}", slot, e);
        allocator.free(slot);
        NOTIFICATIONS_SKIPPED_DETACHED.inc();
        return false;
    }

    NOTIFICATIONS_DELIVERED.inc();
    true
}

/// Final notification when a watch is detached while its queue is still
/// live. Engine meta traffic: not subject to the queue's filter, and
/// best-effort like every other delivery.
pub(crate) fn post_removal_notification(watch: &Arc<Watch>) {
    let Some(queue) = watch.queue() else {
        return;
    };
    let n = Notification::meta(META_REMOVAL_NOTIFICATION);
    if post_one_notification(watch, &queue, &n) {
        REMOVAL_NOTIFICATIONS.inc();
    }
}
