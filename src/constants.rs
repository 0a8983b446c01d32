// -
// Note slot geometry

/// Size in bytes of one note slot. Every delivered record occupies
/// exactly one slot, header plus payload, padded to this boundary.
pub const NOTE_SLOT_SIZE: usize = 128;

/// Record header: one type/subtype word plus one info word.
pub const NOTE_HEADER_SIZE: usize = 8;

/// Maximum payload bytes a single record can carry.
pub const MAX_PAYLOAD_SIZE: usize = NOTE_SLOT_SIZE - NOTE_HEADER_SIZE;

/// Note slots backed by one page of transport buffer.
pub const NOTES_PER_PAGE: u32 = 4096 / NOTE_SLOT_SIZE as u32;

// -
// Hard caps

/// Upper bound on a queue's note pool, keeping pinned buffer memory bounded.
pub const MAX_QUEUE_NOTES: u32 = 512;

/// Upper bound on per-type entries in one filter specification.
pub const MAX_FILTER_ENTRIES: usize = 256;
