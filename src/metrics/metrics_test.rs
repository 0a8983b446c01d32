use super::*;

#[test]
fn counters_register_and_gather() {
    register_custom_metrics();

    NOTIFICATIONS_DELIVERED.inc();
    NOTIFICATIONS_DROPPED_OVERRUN.inc();

    let families = REGISTRY.gather();
    let names: Vec<_> = families.iter().map(|f| f.get_name().to_string()).collect();
    assert!(names.contains(&"watchq_notifications_delivered_total".to_string()));
    assert!(names.contains(&"watchq_notifications_dropped_overrun_total".to_string()));
}

#[test]
fn delivered_counter_is_monotonic() {
    let before = NOTIFICATIONS_DELIVERED.get();
    NOTIFICATIONS_DELIVERED.inc();
    assert!(NOTIFICATIONS_DELIVERED.get() > before);
}
