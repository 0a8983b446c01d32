use super::*;
use crate::TransportError;

#[test]
fn reserve_within_capacity() {
    let t = MemTransport::new(64);
    assert!(t.reserve(64).is_ok());
    assert!(matches!(
        t.reserve(65),
        Err(TransportError::CapacityRefused { requested: 65 })
    ));
}

#[test]
fn write_then_publish_in_order() {
    let t = MemTransport::new(8);
    t.reserve(8).unwrap();

    t.write(3, b"three").unwrap();
    t.write(1, b"one").unwrap();
    t.publish(1).unwrap();
    t.publish(3).unwrap();

    let drained = t.drain();
    assert_eq!(drained, vec![(1, b"one".to_vec()), (3, b"three".to_vec())]);
    assert_eq!(t.published_count(), 0);
}

#[test]
fn write_outside_reservation_fails() {
    let t = MemTransport::new(8);
    t.reserve(4).unwrap();
    assert!(matches!(
        t.write(4, b"x"),
        Err(TransportError::SlotOutOfRange { slot: 4 })
    ));
}

#[test]
fn publish_of_unwritten_slot_fails() {
    let t = MemTransport::new(8);
    t.reserve(8).unwrap();
    assert!(matches!(t.publish(0), Err(TransportError::SlotOutOfRange { slot: 0 })));
}

#[test]
fn detach_rejects_everything() {
    let t = MemTransport::new(8);
    t.reserve(8).unwrap();
    t.write(0, b"x").unwrap();
    t.detach();

    assert!(!t.is_attached());
    assert!(matches!(t.publish(0), Err(TransportError::Detached)));
    assert!(matches!(t.write(1, b"y"), Err(TransportError::Detached)));
    assert!(matches!(t.reserve(2), Err(TransportError::Detached)));
}
