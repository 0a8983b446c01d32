use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::Opts;
use prometheus::Registry;

#[cfg(test)]
mod metrics_test;

lazy_static! {
    pub static ref NOTIFICATIONS_DELIVERED: IntCounter = IntCounter::with_opts(Opts::new(
        "watchq_notifications_delivered_total",
        "Records successfully published into a subscriber's transport"
    ))
    .expect("metric can not be created");

    pub static ref NOTIFICATIONS_FILTERED: IntCounter = IntCounter::with_opts(Opts::new(
        "watchq_notifications_filtered_total",
        "Candidate deliveries rejected by a subscriber's type filter"
    ))
    .expect("metric can not be created");

    pub static ref NOTIFICATIONS_DENIED: IntCounter = IntCounter::with_opts(Opts::new(
        "watchq_notifications_denied_total",
        "Candidate deliveries rejected by the credential gate"
    ))
    .expect("metric can not be created");

    pub static ref NOTIFICATIONS_DROPPED_OVERRUN: IntCounter = IntCounter::with_opts(Opts::new(
        "watchq_notifications_dropped_overrun_total",
        "Records dropped because the note pool was exhausted"
    ))
    .expect("metric can not be created");

    pub static ref NOTIFICATIONS_SKIPPED_DETACHED: IntCounter = IntCounter::with_opts(Opts::new(
        "watchq_notifications_skipped_detached_total",
        "Candidate deliveries skipped on a cleared queue or dead transport"
    ))
    .expect("metric can not be created");

    pub static ref REMOVAL_NOTIFICATIONS: IntCounter = IntCounter::with_opts(Opts::new(
        "watchq_removal_notifications_total",
        "Final meta records delivered for forcibly removed watches"
    ))
    .expect("metric can not be created");

    pub static ref OVERRUNS_MARKED: IntCounter = IntCounter::with_opts(Opts::new(
        "watchq_overruns_marked_total",
        "Times a queue hit pool exhaustion (including while already overrun)"
    ))
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

/// Register the engine's collectors with the crate [`REGISTRY`].
///
/// Embedders exposing their own registry can register the statics there
/// instead; counting works either way.
pub fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(NOTIFICATIONS_DELIVERED.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(NOTIFICATIONS_FILTERED.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(NOTIFICATIONS_DENIED.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(NOTIFICATIONS_DROPPED_OVERRUN.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(NOTIFICATIONS_SKIPPED_DETACHED.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(REMOVAL_NOTIFICATIONS.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(OVERRUNS_MARKED.clone()))
        .expect("collector can be registered");
}
