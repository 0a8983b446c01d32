//! Per-subscriber notification filtering.
//!
//! A consumer installs a [`FilterSpec`] on its queue; the engine compiles
//! it into a [`TypeFilter`] that the delivery path evaluates once per
//! (watch, record) pair. Compiled filters are immutable: installation
//! publishes a whole new filter (copy-on-write swap on the queue), so a
//! concurrent `matches` call always sees either the old or the new filter
//! in full, never a partial edit.

use serde::Deserialize;
use serde::Serialize;

use crate::constants::MAX_FILTER_ENTRIES;
use crate::FilterError;
use crate::Notification;
use crate::NotificationType;

/// One per-type rule in a filter specification.
///
/// `subtype_filter` is a 256-bit bitmap over subtype values; `info_filter`
/// and `info_mask` select on the record's info word:
/// `(info & info_mask) == (info_filter & info_mask)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFilterSpec {
    /// Raw notification type tag; validated against the known types when
    /// the specification is compiled.
    pub ntype: u32,
    #[serde(default = "default_subtype_filter")]
    pub subtype_filter: [u64; 4],
    #[serde(default)]
    pub info_filter: u32,
    #[serde(default)]
    pub info_mask: u32,
}

/// Accept every subtype unless the spec narrows it.
fn default_subtype_filter() -> [u64; 4] {
    [u64::MAX; 4]
}

/// A complete filter specification, as supplied by a consumer.
///
/// An empty `filters` list means "no filter": installing it removes any
/// active filter and the queue accepts everything again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub filters: Vec<TypeFilterSpec>,
}

#[derive(Debug)]
struct CompiledEntry {
    ntype: u32,
    subtype_filter: [u64; 4],
    info_filter: u32,
    info_mask: u32,
}

/// Compiled, read-only form of a [`FilterSpec`].
#[derive(Debug)]
pub struct TypeFilter {
    /// Bit n set ⇔ some entry accepts type n.
    type_bitmap: u32,
    entries: Vec<CompiledEntry>,
}

impl TypeFilter {
    /// Validate and compile a specification.
    ///
    /// Every entry's type tag must name a known [`NotificationType`] and
    /// the entry count is capped; rejection leaves nothing half-built.
    pub fn compile(spec: &FilterSpec) -> std::result::Result<Self, FilterError> {
        if spec.filters.len() > MAX_FILTER_ENTRIES {
            return Err(FilterError::TooManyEntries {
                count: spec.filters.len(),
                limit: MAX_FILTER_ENTRIES,
            });
        }

        let mut type_bitmap = 0u32;
        let mut entries = Vec::with_capacity(spec.filters.len());
        for (index, f) in spec.filters.iter().enumerate() {
            if NotificationType::from_raw(f.ntype).is_none() {
                return Err(FilterError::TypeOutOfRange {
                    index,
                    raw_type: f.ntype,
                });
            }
            type_bitmap |= 1u32 << f.ntype;
            entries.push(CompiledEntry {
                ntype: f.ntype,
                subtype_filter: f.subtype_filter,
                info_filter: f.info_filter,
                info_mask: f.info_mask,
            });
        }

        Ok(Self { type_bitmap, entries })
    }

    /// Decide whether a record passes this filter.
    ///
    /// Pure and allocation-free; evaluated on the producer's thread for
    /// every candidate delivery.
    pub fn matches(
        &self,
        n: &Notification,
    ) -> bool {
        let raw = n.ntype().as_raw();
        if self.type_bitmap & (1u32 << raw) == 0 {
            return false;
        }

        let subtype = n.subtype() as usize;
        let info = n.info_with_stamp(0);
        self.entries.iter().any(|e| {
            e.ntype == raw
                && e.subtype_filter[subtype / 64] & (1u64 << (subtype % 64)) != 0
                && (info & e.info_mask) == (e.info_filter & e.info_mask)
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
