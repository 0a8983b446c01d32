//! Watch Queue Engine Error Hierarchy
//!
//! Defines error types for the watch/notification engine, categorized by
//! the boundary they surface at: configuration, subscription management,
//! record handling, and the transport sink.
//!
//! Nothing in the delivery (`post`) path ever returns one of these to the
//! producer; capacity exhaustion and cleared queues degrade to counters
//! and a sticky overrun flag instead.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings file / environment loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Note pool sizing rejections
    #[error(transparent)]
    Size(#[from] SizeError),

    /// Filter specification rejections
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Watch add/remove failures
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// Notification record construction/decoding failures
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Transport sink failures surfaced at configuration time
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, thiserror::Error)]
pub enum SizeError {
    /// Note pools are bitmap-addressed; capacity must be a power of two
    #[error("Note capacity {requested} is not a power of two")]
    NotPowerOfTwo { requested: u32 },

    #[error("Note capacity must be non-zero")]
    Zero,

    /// Hard cap keeps pinned transport memory bounded
    #[error("Note capacity {requested} exceeds the limit of {limit}")]
    ExceedsLimit { requested: u32, limit: u32 },

    /// Resizing is only legal before any watch is attached and while no
    /// note is outstanding
    #[error("Queue is in use: {watches} watch(es) attached, {outstanding} note(s) outstanding")]
    QueueInUse { watches: usize, outstanding: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Filter entry {index} has unknown notification type {raw_type}")]
    TypeOutOfRange { index: usize, raw_type: u32 },

    #[error("Filter specification has {count} entries, limit is {limit}")]
    TooManyEntries { count: usize, limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    /// A watch from the same queue already exists on this object
    #[error("Object is already watched by queue (watch id {existing_id})")]
    AlreadyWatching { existing_id: u64 },

    #[error("No watch with id {id} found for the given queue")]
    WatchNotFound { id: u64 },

    /// The target queue has been cleared; it can no longer accept watches
    #[error("Queue has been cleared and cannot accept watches")]
    QueueDetached,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Payload of {len} bytes exceeds the per-record maximum of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Unknown notification type tag {raw}")]
    UnknownType { raw: u32 },

    #[error("Record truncated: {len} bytes, need at least {need}")]
    Truncated { len: usize, need: usize },

    #[error("Record length field {encoded} disagrees with buffer of {available} bytes")]
    LengthMismatch { encoded: usize, available: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The consumer side has gone away
    #[error("Transport is detached")]
    Detached,

    /// The transport cannot back the requested number of note slots
    #[error("Transport refused capacity for {requested} slot(s)")]
    CapacityRefused { requested: u32 },

    #[error("Slot {slot} is out of range for this transport")]
    SlotOutOfRange { slot: u32 },
}
