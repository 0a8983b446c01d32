use std::sync::Arc;

use super::*;
use crate::MemTransport;
use crate::QueueConfig;

fn queue() -> Arc<WatchQueue> {
    WatchQueue::new(Arc::new(MemTransport::new(512)), &QueueConfig::default()).unwrap()
}

#[test]
fn register_lookup_deregister() {
    let registry = QueueRegistry::new();
    let q = queue();

    assert!(registry.register(3, q.clone()).is_none());
    assert_eq!(registry.len(), 1);

    let found = registry.lookup(3).unwrap();
    assert!(Arc::ptr_eq(&found, &q));
    assert!(registry.lookup(4).is_none());

    let removed = registry.deregister(3).unwrap();
    assert!(Arc::ptr_eq(&removed, &q));
    assert!(registry.is_empty());
    assert!(registry.deregister(3).is_none());
}

#[test]
fn reregistering_a_handle_returns_the_previous_queue() {
    let registry = QueueRegistry::new();
    let first = queue();
    let second = queue();

    registry.register(7, first.clone());
    let prior = registry.register(7, second.clone()).unwrap();
    assert!(Arc::ptr_eq(&prior, &first));
    assert!(Arc::ptr_eq(&registry.lookup(7).unwrap(), &second));
}

#[test]
fn queue_outlives_deregistration_while_referenced() {
    let registry = QueueRegistry::new();
    let q = queue();
    registry.register(1, q.clone());

    let held = registry.lookup(1).unwrap();
    registry.deregister(1);

    // The table let go; our reference still works.
    assert!(!held.is_cleared());
    drop(q);
    assert_eq!(held.note_capacity(), 32);
}
