use std::sync::Arc;

use super::*;
use crate::CredentialToken;
use crate::Error;
use crate::FilterSpec;
use crate::MemTransport;
use crate::MockTransport;
use crate::NotificationType;
use crate::QueueConfig;
use crate::SizeError;
use crate::TransportError;
use crate::TypeFilterSpec;
use crate::Watch;
use crate::WatchList;

fn mem_queue() -> Arc<WatchQueue> {
    WatchQueue::new(Arc::new(MemTransport::new(512)), &QueueConfig::default()).unwrap()
}

fn mount_spec() -> FilterSpec {
    FilterSpec {
        filters: vec![TypeFilterSpec {
            ntype: NotificationType::Mount.as_raw(),
            subtype_filter: [u64::MAX; 4],
            info_filter: 0,
            info_mask: 0,
        }],
    }
}

#[test]
fn new_queue_uses_configured_capacity() {
    let queue = mem_queue();
    assert_eq!(queue.note_capacity(), 32);
    assert_eq!(queue.free_notes(), 32);
    assert!(!queue.is_cleared());
    assert!(!queue.has_overrun());
}

#[test]
fn new_queue_rejects_detached_transport() {
    let transport = MemTransport::new(512);
    transport.detach();
    let err = WatchQueue::new(Arc::new(transport), &QueueConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Detached)));
}

#[test]
fn set_size_replaces_the_pool() {
    let queue = mem_queue();
    queue.set_size(64).unwrap();
    assert_eq!(queue.note_capacity(), 64);
    assert_eq!(queue.free_notes(), 64);
}

#[test]
fn set_size_validates_capacity() {
    let queue = mem_queue();
    assert!(matches!(
        queue.set_size(0),
        Err(Error::Size(SizeError::Zero))
    ));
    assert!(matches!(
        queue.set_size(48),
        Err(Error::Size(SizeError::NotPowerOfTwo { requested: 48 }))
    ));
    assert!(matches!(
        queue.set_size(1024),
        Err(Error::Size(SizeError::ExceedsLimit { .. }))
    ));
    assert_eq!(queue.note_capacity(), 32);
}

#[test]
fn set_size_rejected_while_watch_attached() {
    let queue = mem_queue();
    let wlist = WatchList::new();
    wlist.add(Watch::new(1, CredentialToken::new(0), &queue)).unwrap();

    let err = queue.set_size(64).unwrap_err();
    assert!(matches!(
        err,
        Error::Size(SizeError::QueueInUse { watches: 1, outstanding: 0 })
    ));
    assert_eq!(queue.note_capacity(), 32);
}

#[test]
fn set_size_rejected_while_notes_outstanding() {
    let queue = mem_queue();
    let slot = queue.allocator().allocate().unwrap();

    assert!(matches!(
        queue.set_size(64),
        Err(Error::Size(SizeError::QueueInUse { watches: 0, outstanding: 1 }))
    ));

    queue.release_note(slot);
    queue.set_size(64).unwrap();
    assert_eq!(queue.note_capacity(), 64);
}

#[test]
fn set_size_honours_transport_refusal() {
    let mut mock = MockTransport::new();
    mock.expect_is_attached().return_const(true);
    // Initial sizing succeeds, the resize is refused.
    mock.expect_reserve().returning(|nr| {
        if nr > 32 {
            Err(TransportError::CapacityRefused { requested: nr })
        } else {
            Ok(())
        }
    });
    let queue = WatchQueue::new(Arc::new(mock), &QueueConfig::default()).unwrap();

    assert!(matches!(
        queue.set_size(64),
        Err(Error::Transport(TransportError::CapacityRefused { requested: 64 }))
    ));
    assert_eq!(queue.note_capacity(), 32);
}

#[test]
fn install_filter_publishes_and_removes() {
    let queue = mem_queue();
    assert!(queue.filter_snapshot().is_none());

    queue.install_filter(&mount_spec()).unwrap();
    assert!(queue.filter_snapshot().is_some());

    // An empty specification removes the active filter.
    queue.install_filter(&FilterSpec::default()).unwrap();
    assert!(queue.filter_snapshot().is_none());
}

#[test]
fn invalid_filter_leaves_active_filter_untouched() {
    let queue = mem_queue();
    queue.install_filter(&mount_spec()).unwrap();

    let bad = FilterSpec {
        filters: vec![TypeFilterSpec {
            ntype: 99,
            subtype_filter: [u64::MAX; 4],
            info_filter: 0,
            info_mask: 0,
        }],
    };
    assert!(queue.install_filter(&bad).is_err());

    let active = queue.filter_snapshot().unwrap();
    assert_eq!(active.entry_count(), 1);
}

#[test]
fn clear_detaches_transport_but_keeps_watches() {
    let queue = mem_queue();
    let wlist = WatchList::new();
    wlist.add(Watch::new(1, CredentialToken::new(0), &queue)).unwrap();

    queue.clear();
    assert!(queue.is_cleared());
    assert_eq!(queue.watch_count(), 1);
    assert_eq!(wlist.len(), 1);

    // Cleared is idempotent.
    queue.clear();
    assert!(queue.is_cleared());

    // Resizing a cleared queue has no transport to negotiate with.
    wlist.teardown();
    assert!(matches!(
        queue.set_size(64),
        Err(Error::Transport(TransportError::Detached))
    ));
}

#[test]
fn overrun_flag_is_sticky_until_acknowledged() {
    let queue = mem_queue();
    queue.mark_overrun();
    queue.mark_overrun();
    assert!(queue.has_overrun());

    queue.ack_overrun();
    assert!(!queue.has_overrun());
}

#[test]
fn release_note_returns_slot_to_pool() {
    let queue = mem_queue();
    let slot = queue.allocator().allocate().unwrap();
    assert_eq!(queue.free_notes(), 31);

    queue.release_note(slot);
    assert_eq!(queue.free_notes(), 32);
}
