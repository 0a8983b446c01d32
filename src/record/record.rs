//! Fixed-layout notification records.
//!
//! Every notification delivered through the engine is one fixed-size
//! record: a type/subtype word, an info word, and up to
//! [`MAX_PAYLOAD_SIZE`](crate::MAX_PAYLOAD_SIZE) trailing payload bytes,
//! padded to the note slot boundary on the wire.
//!
//! Wire layout (little-endian words, one record per slot):
//! - word0: bits 0..=23 type tag, bits 24..=31 subtype
//! - word1 (info): bits 0..=7 stamped watch id, bits 8..=15 producer flag
//!   bits, bits 16..=31 payload length in bytes
//! - payload bytes, zero-padded to [`NOTE_SLOT_SIZE`](crate::NOTE_SLOT_SIZE)
//!
//! Producers construct records with the id bits zero. The delivery path
//! is the only writer of the id bits; everything else is immutable once
//! constructed.

use crate::constants::MAX_PAYLOAD_SIZE;
use crate::constants::NOTE_HEADER_SIZE;
use crate::constants::NOTE_SLOT_SIZE;
use crate::RecordError;

// -
// Info word bit fields

pub const INFO_ID_MASK: u32 = 0x0000_00ff;
pub const INFO_ID_SHIFT: u32 = 0;
pub const INFO_FLAGS_MASK: u32 = 0x0000_ff00;
pub const INFO_FLAGS_SHIFT: u32 = 8;
pub const INFO_LENGTH_MASK: u32 = 0xffff_0000;
pub const INFO_LENGTH_SHIFT: u32 = 16;

/// word0 bit fields
const TYPE_TAG_MASK: u32 = 0x00ff_ffff;
const SUBTYPE_SHIFT: u32 = 24;

// -
// Meta subtypes emitted by the engine itself

/// A watch was removed while its queue was still attached.
pub const META_REMOVAL_NOTIFICATION: u8 = 0;

/// Reserved: notifications were lost to an exhausted note pool.
pub const META_LOSS_NOTIFICATION: u8 = 1;

/// Kinds of watched objects the engine can carry events for.
///
/// `Meta` is reserved for the engine's own traffic (watch removal, loss
/// reporting); the remaining variants tag the emitting subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum NotificationType {
    Meta = 0,
    Mount = 1,
    Keyring = 2,
    Block = 3,
}

impl NotificationType {
    /// Number of defined types; filter bitmaps are sized by this.
    pub const COUNT: u32 = 4;

    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Meta),
            1 => Some(Self::Mount),
            2 => Some(Self::Keyring),
            3 => Some(Self::Block),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// One notification record as handed to `post` by a producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    ntype: NotificationType,
    subtype: u8,
    flags: u8,
    payload: Vec<u8>,
}

impl Notification {
    /// Build a record with zeroed id bits.
    ///
    /// Fails if the payload cannot fit a single note slot.
    pub fn new(
        ntype: NotificationType,
        subtype: u8,
        payload: &[u8],
    ) -> std::result::Result<Self, RecordError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(RecordError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self {
            ntype,
            subtype,
            flags: 0,
            payload: payload.to_vec(),
        })
    }

    /// Engine-internal meta record (removal/loss reporting); never
    /// carries a payload.
    pub(crate) fn meta(subtype: u8) -> Self {
        Self {
            ntype: NotificationType::Meta,
            subtype,
            flags: 0,
            payload: Vec::new(),
        }
    }

    /// Set the producer-owned flag bits (info word bits 8..=15).
    pub fn with_flags(
        mut self,
        flags: u8,
    ) -> Self {
        self.flags = flags;
        self
    }

    pub fn ntype(&self) -> NotificationType {
        self.ntype
    }

    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The info word as it would appear on the wire, with the given id
    /// stamp merged into the reserved low bits.
    pub(crate) fn info_with_stamp(
        &self,
        info_id: u32,
    ) -> u32 {
        ((self.payload.len() as u32) << INFO_LENGTH_SHIFT)
            | ((self.flags as u32) << INFO_FLAGS_SHIFT)
            | (info_id & INFO_ID_MASK)
    }

    /// Encode into one slot-sized buffer, stamping the watch id into the
    /// info word. The only mutation delivery is allowed to make.
    pub(crate) fn encode_stamped(
        &self,
        info_id: u32,
    ) -> [u8; NOTE_SLOT_SIZE] {
        let mut buf = [0u8; NOTE_SLOT_SIZE];
        let word0 = (self.ntype.as_raw() & TYPE_TAG_MASK) | ((self.subtype as u32) << SUBTYPE_SHIFT);
        buf[0..4].copy_from_slice(&word0.to_le_bytes());
        buf[4..8].copy_from_slice(&self.info_with_stamp(info_id).to_le_bytes());
        buf[NOTE_HEADER_SIZE..NOTE_HEADER_SIZE + self.payload.len()].copy_from_slice(&self.payload);
        buf
    }

    /// Encode with zeroed id bits.
    pub fn encode(&self) -> [u8; NOTE_SLOT_SIZE] {
        self.encode_stamped(0)
    }

    /// Decode one record from a slot buffer.
    pub fn decode(bytes: &[u8]) -> std::result::Result<DecodedNotification, RecordError> {
        if bytes.len() < NOTE_HEADER_SIZE {
            return Err(RecordError::Truncated {
                len: bytes.len(),
                need: NOTE_HEADER_SIZE,
            });
        }
        let word0 = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let info = u32::from_le_bytes(bytes[4..8].try_into().unwrap());

        let raw_type = word0 & TYPE_TAG_MASK;
        let ntype = NotificationType::from_raw(raw_type)
            .ok_or(RecordError::UnknownType { raw: raw_type })?;

        let len = ((info & INFO_LENGTH_MASK) >> INFO_LENGTH_SHIFT) as usize;
        if len > bytes.len().saturating_sub(NOTE_HEADER_SIZE) {
            return Err(RecordError::LengthMismatch {
                encoded: len,
                available: bytes.len() - NOTE_HEADER_SIZE,
            });
        }

        Ok(DecodedNotification {
            ntype,
            subtype: (word0 >> SUBTYPE_SHIFT) as u8,
            info,
            payload: bytes[NOTE_HEADER_SIZE..NOTE_HEADER_SIZE + len].to_vec(),
        })
    }
}

/// A record as read back off the wire, id stamp included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedNotification {
    pub ntype: NotificationType,
    pub subtype: u8,
    pub info: u32,
    pub payload: Vec<u8>,
}

impl DecodedNotification {
    /// The watch id the delivery path stamped into the info word.
    pub fn watch_id_stamp(&self) -> u8 {
        ((self.info & INFO_ID_MASK) >> INFO_ID_SHIFT) as u8
    }

    pub fn flags(&self) -> u8 {
        ((self.info & INFO_FLAGS_MASK) >> INFO_FLAGS_SHIFT) as u8
    }

    pub fn payload_len(&self) -> usize {
        ((self.info & INFO_LENGTH_MASK) >> INFO_LENGTH_SHIFT) as usize
    }
}
